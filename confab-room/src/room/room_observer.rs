use crate::error::RoomError;
use crate::session::LinkState;
use async_trait::async_trait;
use confab_core::{PeerId, RemoteTrack};

/// UI-facing side of a room. Every method defaults to doing nothing.
#[async_trait]
pub trait RoomObserver: Send + Sync + 'static {
    async fn on_link_state(&self, _peer_id: PeerId, _state: LinkState) {}

    /// Media from `peer_id` should be attached.
    async fn on_remote_track(&self, _peer_id: PeerId, _track: RemoteTrack) {}

    /// Media from `peer_id` should be detached.
    async fn on_peer_detached(&self, _peer_id: PeerId) {}

    async fn on_local_media_released(&self) {}

    /// The link to `peer_id` failed and has been torn down.
    async fn on_link_failed(&self, _peer_id: PeerId, _error: &RoomError) {}

    async fn on_warning(&self, _error: &RoomError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RoomObserver for NoopObserver {}
