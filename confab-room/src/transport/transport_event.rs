use confab_core::{IceCandidate, PeerId, RemoteTrack};
use std::fmt;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Things a media transport reports on its own initiative.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEventKind {
    /// A local candidate was gathered and has to reach the remote side.
    CandidateGenerated(IceCandidate),
    TrackAdded(RemoteTrack),
    StateChanged(TransportState),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportEvent {
    pub peer_id: PeerId,
    /// Generation of the link the transport was created for.
    pub generation: u64,
    pub kind: TransportEventKind,
}

/// Handle a transport uses to push [`TransportEvent`]s into the room loop.
#[derive(Debug, Clone)]
pub struct TransportEventSink {
    peer_id: PeerId,
    generation: u64,
    tx: mpsc::Sender<TransportEvent>,
}

impl TransportEventSink {
    pub fn new(peer_id: PeerId, generation: u64, tx: mpsc::Sender<TransportEvent>) -> Self {
        Self {
            peer_id,
            generation,
            tx,
        }
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub async fn candidate(&self, candidate: IceCandidate) {
        self.emit(TransportEventKind::CandidateGenerated(candidate))
            .await;
    }

    pub async fn track(&self, track: RemoteTrack) {
        self.emit(TransportEventKind::TrackAdded(track)).await;
    }

    pub async fn state(&self, state: TransportState) {
        self.emit(TransportEventKind::StateChanged(state)).await;
    }

    async fn emit(&self, kind: TransportEventKind) {
        // The room may already be gone; nobody is left to care.
        let _ = self
            .tx
            .send(TransportEvent {
                peer_id: self.peer_id,
                generation: self.generation,
                kind,
            })
            .await;
    }
}
