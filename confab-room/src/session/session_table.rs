use crate::session::{LinkSnapshot, PeerLink};
use confab_core::PeerId;
use std::collections::HashMap;
use tracing::warn;

/// At most one [`PeerLink`] per remote peer.
#[derive(Default)]
pub struct SessionTable {
    links: HashMap<PeerId, PeerLink>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses to replace an existing link and hands the new one back.
    pub(crate) fn insert(&mut self, link: PeerLink) -> Result<&mut PeerLink, PeerLink> {
        use std::collections::hash_map::Entry;

        match self.links.entry(link.peer_id) {
            Entry::Occupied(_) => {
                warn!("Link to {} already exists", link.peer_id);
                Err(link)
            }
            Entry::Vacant(slot) => Ok(slot.insert(link)),
        }
    }

    pub(crate) fn remove(&mut self, peer_id: &PeerId) -> Option<PeerLink> {
        self.links.remove(peer_id)
    }

    pub(crate) fn get_mut(&mut self, peer_id: &PeerId) -> Option<&mut PeerLink> {
        self.links.get_mut(peer_id)
    }

    pub fn get(&self, peer_id: &PeerId) -> Option<&PeerLink> {
        self.links.get(peer_id)
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.links.contains_key(peer_id)
    }

    pub fn peers(&self) -> Vec<PeerId> {
        let mut peers: Vec<_> = self.links.keys().copied().collect();
        peers.sort();
        peers
    }

    pub fn snapshot(&self) -> Vec<LinkSnapshot> {
        let mut links: Vec<_> = self.links.values().map(PeerLink::snapshot).collect();
        links.sort_by_key(|l| l.peer_id);
        links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
