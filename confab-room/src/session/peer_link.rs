use crate::session::LinkState;
use crate::transport::MediaTransport;
use confab_core::{IceCandidate, LinkRole, PeerId, RemoteTrack, SessionDescription};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// Everything this participant knows about its connection to one remote peer.
pub struct PeerLink {
    pub(crate) peer_id: PeerId,
    pub(crate) role: LinkRole,
    pub(crate) state: LinkState,
    /// Distinguishes this link from earlier links to the same peer.
    pub(crate) generation: u64,
    pub(crate) local_description: Option<SessionDescription>,
    pub(crate) remote_description: Option<SessionDescription>,
    pub(crate) remote_applied: bool,
    /// Our description has been handed to the relay.
    pub(crate) description_sent: bool,
    pub(crate) pending_candidates: VecDeque<IceCandidate>,
    /// Local candidates gathered before our description went out.
    pub(crate) outbound_candidates: Vec<IceCandidate>,
    pub(crate) applied_candidates: usize,
    pub(crate) transport: Option<Arc<dyn MediaTransport>>,
    pub(crate) remote_tracks: Vec<RemoteTrack>,
}

impl PeerLink {
    pub(crate) fn new(peer_id: PeerId, role: LinkRole, generation: u64) -> Self {
        Self {
            peer_id,
            role,
            state: LinkState::Idle,
            generation,
            local_description: None,
            remote_description: None,
            remote_applied: false,
            description_sent: false,
            pending_candidates: VecDeque::new(),
            outbound_candidates: Vec::new(),
            applied_candidates: 0,
            transport: None,
            remote_tracks: Vec::new(),
        }
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    pub fn role(&self) -> LinkRole {
        self.role
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn remote_applied(&self) -> bool {
        self.remote_applied
    }

    pub fn pending_candidates(&self) -> usize {
        self.pending_candidates.len()
    }

    pub(crate) fn transition(&mut self, next: LinkState) -> LinkState {
        let prev = self.state;
        if prev != next {
            debug!(
                "Link {} ({}, gen {}): {} -> {}",
                self.peer_id, self.role, self.generation, prev, next
            );
            self.state = next;
        }
        prev
    }

    pub fn snapshot(&self) -> LinkSnapshot {
        LinkSnapshot {
            peer_id: self.peer_id,
            role: self.role,
            state: self.state,
            generation: self.generation,
            remote_applied: self.remote_applied,
            pending_candidates: self.pending_candidates.len(),
            applied_candidates: self.applied_candidates,
            has_transport: self.transport.is_some(),
            remote_tracks: self.remote_tracks.clone(),
        }
    }
}

/// Read-only view of a [`PeerLink`].
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSnapshot {
    pub peer_id: PeerId,
    pub role: LinkRole,
    pub state: LinkState,
    pub generation: u64,
    pub remote_applied: bool,
    pub pending_candidates: usize,
    pub applied_candidates: usize,
    pub has_transport: bool,
    pub remote_tracks: Vec<RemoteTrack>,
}
