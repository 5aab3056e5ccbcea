use crate::signaling::{Relay, RelayChannel, RelayEvent, Subscription};
use anyhow::bail;
use async_trait::async_trait;
use confab_core::{PeerId, RoomName};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

struct MemberEntry {
    peer_id: PeerId,
    user_name: String,
    tx: mpsc::UnboundedSender<RelayEvent>,
}

#[derive(Default)]
struct ChannelState {
    /// Ordered by join time.
    members: Vec<MemberEntry>,
}

impl ChannelState {
    fn send_to_others(&self, sender: &PeerId, event: RelayEvent) {
        for member in self.members.iter().filter(|m| &m.peer_id != sender) {
            if member.tx.send(event.clone()).is_err() {
                debug!("Subscriber {} no longer listening", member.peer_id);
            }
        }
    }
}

struct RelayInner {
    channels: DashMap<String, ChannelState>,
}

/// In-process presence relay.
///
/// Mirrors a hosted presence channel: members are listed in join order,
/// presence changes reach every other member, and client events are delivered
/// to everyone except the sender.
#[derive(Clone)]
pub struct MemoryRelay {
    inner: Arc<RelayInner>,
}

impl MemoryRelay {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RelayInner {
                channels: DashMap::new(),
            }),
        }
    }

    /// Current members of a room, in join order.
    pub fn members(&self, room: &RoomName) -> Vec<PeerId> {
        self.inner
            .channels
            .get(&room.channel_name())
            .map(|ch| ch.members.iter().map(|m| m.peer_id).collect())
            .unwrap_or_default()
    }

    pub fn user_name(&self, room: &RoomName, peer_id: &PeerId) -> Option<String> {
        let channel = self.inner.channels.get(&room.channel_name())?;
        channel
            .members
            .iter()
            .find(|m| &m.peer_id == peer_id)
            .map(|m| m.user_name.clone())
    }

    /// Drop a member as if its connection to the relay died.
    pub fn disconnect(&self, room: &RoomName, peer_id: &PeerId) -> bool {
        self.remove_member(&room.channel_name(), peer_id)
    }

    fn remove_member(&self, channel_name: &str, peer_id: &PeerId) -> bool {
        {
            let Some(mut channel) = self.inner.channels.get_mut(channel_name) else {
                return false;
            };
            let Some(pos) = channel.members.iter().position(|m| &m.peer_id == peer_id) else {
                return false;
            };
            channel.members.remove(pos);
            channel.send_to_others(peer_id, RelayEvent::MemberRemoved(*peer_id));
        }
        info!("{} left channel {}", peer_id, channel_name);

        if self
            .inner
            .channels
            .remove_if(channel_name, |_, ch| ch.members.is_empty())
            .is_some()
        {
            debug!("Channel {} is empty, dropping it", channel_name);
        }
        true
    }

    /// Number of channels with at least one member.
    pub fn channel_count(&self) -> usize {
        self.inner.channels.len()
    }

    fn publish(&self, channel_name: &str, sender: &PeerId, event: &str, payload: String) -> bool {
        let Some(channel) = self.inner.channels.get(channel_name) else {
            return false;
        };
        if !channel.members.iter().any(|m| &m.peer_id == sender) {
            return false;
        }
        channel.send_to_others(
            sender,
            RelayEvent::Message {
                event: event.to_string(),
                payload,
            },
        );
        true
    }
}

impl Default for MemoryRelay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Relay for MemoryRelay {
    async fn subscribe(&self, room: &RoomName, user_name: &str) -> anyhow::Result<Subscription> {
        let channel_name = room.channel_name();
        let peer_id = PeerId::new();
        let (tx, rx) = mpsc::unbounded_channel();

        {
            let mut channel = self.inner.channels.entry(channel_name.clone()).or_default();

            channel.send_to_others(&peer_id, RelayEvent::MemberJoined(peer_id));
            channel.members.push(MemberEntry {
                peer_id,
                user_name: user_name.to_string(),
                tx: tx.clone(),
            });

            let members = channel.members.iter().map(|m| m.peer_id).collect();
            if tx
                .send(RelayEvent::SubscriptionSucceeded {
                    me: peer_id,
                    members,
                })
                .is_err()
            {
                warn!("Subscriber {} dropped before confirmation", peer_id);
            }
        }

        info!("{} ({}) subscribed to {}", peer_id, user_name, channel_name);

        Ok(Subscription {
            channel: Arc::new(MemoryChannel {
                relay: self.clone(),
                channel_name,
                me: peer_id,
            }),
            events: rx,
        })
    }
}

struct MemoryChannel {
    relay: MemoryRelay,
    channel_name: String,
    me: PeerId,
}

#[async_trait]
impl RelayChannel for MemoryChannel {
    async fn trigger(&self, event: &str, payload: String) -> anyhow::Result<()> {
        if !self.relay.publish(&self.channel_name, &self.me, event, payload) {
            bail!("{} is not subscribed to {}", self.me, self.channel_name);
        }
        Ok(())
    }

    async fn unsubscribe(&self) {
        self.relay.remove_member(&self.channel_name, &self.me);
    }
}
