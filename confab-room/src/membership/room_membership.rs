use confab_core::PeerId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub peer_id: PeerId,
    pub is_self: bool,
    pub join_seq: u64,
}

/// Current members of the room ordered by join time.
#[derive(Debug, Default, Clone)]
pub struct RoomMembership {
    members: Vec<Member>,
    next_seq: u64,
}

impl RoomMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the member set with the relay's initial list. `me` is appended
    /// if the relay left it out.
    pub fn reset(&mut self, me: PeerId, members: &[PeerId]) {
        self.members.clear();
        self.next_seq = 0;

        for peer_id in members {
            self.push(*peer_id, *peer_id == me);
        }
        if !self.contains(&me) {
            self.push(me, true);
        }
    }

    /// Returns false when the peer is already a member.
    pub fn insert(&mut self, peer_id: PeerId) -> bool {
        if self.contains(&peer_id) {
            return false;
        }
        self.push(peer_id, false);
        true
    }

    pub fn remove(&mut self, peer_id: &PeerId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| &m.peer_id != peer_id);
        self.members.len() != before
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.members.iter().any(|m| &m.peer_id == peer_id)
    }

    pub fn get(&self, peer_id: &PeerId) -> Option<&Member> {
        self.members.iter().find(|m| &m.peer_id == peer_id)
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn me(&self) -> Option<PeerId> {
        self.members.iter().find(|m| m.is_self).map(|m| m.peer_id)
    }

    /// Remote members, earliest joiner first.
    pub fn peers(&self) -> impl Iterator<Item = PeerId> + '_ {
        self.members.iter().filter(|m| !m.is_self).map(|m| m.peer_id)
    }

    pub fn earliest(&self) -> Option<&Member> {
        self.members.first()
    }

    /// `None` when either peer is not a member.
    pub fn joined_before(&self, a: &PeerId, b: &PeerId) -> Option<bool> {
        let a = self.get(a)?;
        let b = self.get(b)?;
        Some(a.join_seq < b.join_seq)
    }

    fn push(&mut self, peer_id: PeerId, is_self: bool) {
        self.members.push(Member {
            peer_id,
            is_self,
            join_seq: self.next_seq,
        });
        self.next_seq += 1;
    }
}
