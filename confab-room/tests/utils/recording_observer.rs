use async_trait::async_trait;
use confab_core::{PeerId, RemoteTrack};
use confab_room::{LinkState, RoomError, RoomObserver};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Observer callbacks, flattened for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservedEvent {
    LinkState(PeerId, LinkState),
    RemoteTrack(PeerId, RemoteTrack),
    PeerDetached(PeerId),
    LocalMediaReleased,
    LinkFailed(PeerId, String),
    Warning(String),
}

#[derive(Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<ObservedEvent>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().await.clone()
    }

    pub async fn detached(&self, peer_id: &PeerId) -> usize {
        self.events
            .lock()
            .await
            .iter()
            .filter(|e| matches!(e, ObservedEvent::PeerDetached(p) if p == peer_id))
            .count()
    }

    pub async fn failures(&self) -> Vec<(PeerId, String)> {
        self.events
            .lock()
            .await
            .iter()
            .filter_map(|e| match e {
                ObservedEvent::LinkFailed(p, msg) => Some((*p, msg.clone())),
                _ => None,
            })
            .collect()
    }

    pub async fn warnings(&self) -> Vec<String> {
        self.events
            .lock()
            .await
            .iter()
            .filter_map(|e| match e {
                ObservedEvent::Warning(msg) => Some(msg.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn media_released(&self) -> bool {
        self.events
            .lock()
            .await
            .contains(&ObservedEvent::LocalMediaReleased)
    }

    /// Wait until `check` holds for the recorded events.
    pub async fn wait_for<F>(&self, timeout_ms: u64, check: F) -> bool
    where
        F: Fn(&[ObservedEvent]) -> bool,
    {
        let start = std::time::Instant::now();
        let timeout = std::time::Duration::from_millis(timeout_ms);

        loop {
            if check(&self.events.lock().await) {
                return true;
            }
            if start.elapsed() > timeout {
                return false;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    async fn push(&self, event: ObservedEvent) {
        tracing::debug!("[RecordingObserver] {:?}", event);
        self.events.lock().await.push(event);
    }
}

#[async_trait]
impl RoomObserver for RecordingObserver {
    async fn on_link_state(&self, peer_id: PeerId, state: LinkState) {
        self.push(ObservedEvent::LinkState(peer_id, state)).await;
    }

    async fn on_remote_track(&self, peer_id: PeerId, track: RemoteTrack) {
        self.push(ObservedEvent::RemoteTrack(peer_id, track)).await;
    }

    async fn on_peer_detached(&self, peer_id: PeerId) {
        self.push(ObservedEvent::PeerDetached(peer_id)).await;
    }

    async fn on_local_media_released(&self) {
        self.push(ObservedEvent::LocalMediaReleased).await;
    }

    async fn on_link_failed(&self, peer_id: PeerId, error: &RoomError) {
        self.push(ObservedEvent::LinkFailed(peer_id, error.to_string()))
            .await;
    }

    async fn on_warning(&self, error: &RoomError) {
        self.push(ObservedEvent::Warning(error.to_string())).await;
    }
}
