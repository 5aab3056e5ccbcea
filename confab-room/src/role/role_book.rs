use confab_core::{LinkRole, PeerId};
use std::collections::HashMap;
use tracing::debug;

/// Link roles decided for each remote peer.
///
/// A decision is written once when the peer is first observed and stays
/// fixed until the peer leaves. A rejoin starts a new pairing.
#[derive(Debug, Default)]
pub struct RoleBook {
    roles: HashMap<PeerId, LinkRole>,
}

impl RoleBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `role` unless a decision already exists, and returns the
    /// decision in force.
    pub fn record(&mut self, peer_id: PeerId, role: LinkRole) -> LinkRole {
        let decided = *self.roles.entry(peer_id).or_insert(role);
        if decided != role {
            debug!(
                "Keeping {} for {} (ignoring later {})",
                decided, peer_id, role
            );
        }
        decided
    }

    pub fn get(&self, peer_id: &PeerId) -> Option<LinkRole> {
        self.roles.get(peer_id).copied()
    }

    pub fn forget(&mut self, peer_id: &PeerId) -> Option<LinkRole> {
        self.roles.remove(peer_id)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
