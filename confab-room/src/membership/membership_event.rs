use confab_core::PeerId;

/// Membership changes derived from relay presence events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipEvent {
    /// Our own subscription was confirmed.
    SelfJoined {
        me: PeerId,
        is_first: bool,
        count: usize,
    },
    PeerJoined(PeerId),
    PeerLeft(PeerId),
}
