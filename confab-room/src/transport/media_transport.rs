use crate::transport::{MediaTrack, TransportEventSink};
use anyhow::Result;
use async_trait::async_trait;
use confab_core::{IceCandidate, IceServerConfig, SessionDescription};
use std::sync::Arc;

/// Point-to-point media transport toward one remote peer.
///
/// Descriptions and candidates are opaque to the caller. Locally gathered
/// candidates, remote tracks and connection state changes are reported through
/// the [`TransportEventSink`] handed to the factory.
#[async_trait]
pub trait MediaTransport: Send + Sync {
    async fn add_track(&self, track: Arc<dyn MediaTrack>) -> Result<()>;

    async fn create_offer(&self) -> Result<SessionDescription>;

    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    /// Detach every handler and release the underlying connection.
    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn create(
        &self,
        ice_servers: &[IceServerConfig],
        events: TransportEventSink,
    ) -> Result<Arc<dyn MediaTransport>>;
}
