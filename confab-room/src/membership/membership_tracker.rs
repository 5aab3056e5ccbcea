use crate::membership::{MembershipEvent, RoomMembership};
use crate::signaling::RelayEvent;
use confab_core::PeerId;
use tracing::{debug, info, warn};

/// Turns relay presence notifications into [`MembershipEvent`]s.
///
/// Only keeps the member list; tearing down links is left to whoever consumes
/// the emitted events.
#[derive(Debug, Default)]
pub struct MembershipTracker {
    membership: RoomMembership,
    me: Option<PeerId>,
}

impl MembershipTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn me(&self) -> Option<PeerId> {
        self.me
    }

    pub fn membership(&self) -> &RoomMembership {
        &self.membership
    }

    pub fn observe(&mut self, event: &RelayEvent) -> Option<MembershipEvent> {
        match event {
            RelayEvent::SubscriptionSucceeded { me, members } => {
                if let Some(current) = self.me {
                    warn!(
                        "Ignoring repeated subscription confirmation (we are {}, relay says {})",
                        current, me
                    );
                    return None;
                }

                self.me = Some(*me);
                self.membership.reset(*me, members);
                let count = self.membership.len();
                info!("Subscribed as {} ({} member(s) present)", me, count);

                Some(MembershipEvent::SelfJoined {
                    me: *me,
                    is_first: count == 1,
                    count,
                })
            }

            RelayEvent::MemberJoined(peer_id) => {
                let me = self.subscribed_as()?;
                if *peer_id == me || !self.membership.insert(*peer_id) {
                    debug!("Duplicate join notification for {}", peer_id);
                    return None;
                }
                info!("Member {} joined", peer_id);
                Some(MembershipEvent::PeerJoined(*peer_id))
            }

            RelayEvent::MemberRemoved(peer_id) => {
                let me = self.subscribed_as()?;
                if *peer_id == me {
                    return None;
                }
                if self.membership.remove(peer_id) {
                    info!("Member {} left", peer_id);
                }
                // Repeated leave notifications still go out; reaping is idempotent.
                Some(MembershipEvent::PeerLeft(*peer_id))
            }

            RelayEvent::Message { .. } => None,
        }
    }

    fn subscribed_as(&self) -> Option<PeerId> {
        if self.me.is_none() {
            debug!("Presence event before subscription confirmation");
        }
        self.me
    }
}
