use crate::error::RoomError;
use crate::signaling::RelayChannel;
use confab_core::{Address, PeerId, SignalKind, SignalMessage, SignalPayload};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Why an inbound relay event was dropped without touching any link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    UnknownEvent,
    Malformed,
    KindMismatch,
    SelfEcho,
    NotAddressed,
    BroadcastNotPermitted,
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DiscardReason::UnknownEvent => "unknown event",
            DiscardReason::Malformed => "malformed payload",
            DiscardReason::KindMismatch => "payload does not match event name",
            DiscardReason::SelfEcho => "sent by ourselves",
            DiscardReason::NotAddressed => "addressed to another peer",
            DiscardReason::BroadcastNotPermitted => "broadcast not actionable for our role",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Deliver(SignalMessage),
    Discard(DiscardReason),
}

/// Addresses outbound signaling and filters inbound signaling for one participant.
#[derive(Clone)]
pub struct Dispatcher {
    me: PeerId,
    channel: Arc<dyn RelayChannel>,
}

impl Dispatcher {
    pub fn new(me: PeerId, channel: Arc<dyn RelayChannel>) -> Self {
        Self { me, channel }
    }

    pub fn me(&self) -> PeerId {
        self.me
    }

    pub fn channel(&self) -> &Arc<dyn RelayChannel> {
        &self.channel
    }

    /// Serialize and publish. Failures are returned, never retried.
    pub async fn send(&self, msg: &SignalMessage) -> Result<(), RoomError> {
        let kind = msg.kind();
        let payload = serde_json::to_string(msg)?;

        debug!("Dispatching {} from {} to {}", kind, msg.from, msg.to);

        self.channel
            .trigger(kind.event_name(), payload)
            .await
            .map_err(|source| RoomError::RelayDelivery { kind, source })
    }

    pub async fn unicast(&self, to: PeerId, payload: SignalPayload) -> Result<(), RoomError> {
        self.send(&SignalMessage::new(self.me, Address::Peer(to), payload))
            .await
    }

    pub async fn broadcast(&self, payload: SignalPayload) -> Result<(), RoomError> {
        self.send(&SignalMessage::new(self.me, Address::Broadcast, payload))
            .await
    }

    /// Decode a relay event and decide whether it concerns us.
    ///
    /// Direct messages are always delivered. Broadcasts are delivered only when
    /// `broadcast_permitted` says our role can act on them.
    pub fn route<F>(&self, event: &str, payload: &str, broadcast_permitted: F) -> Inbound
    where
        F: FnOnce(&SignalMessage) -> bool,
    {
        let Some(kind) = SignalKind::from_event_name(event) else {
            debug!("Ignoring relay event '{}'", event);
            return Inbound::Discard(DiscardReason::UnknownEvent);
        };

        let msg: SignalMessage = match serde_json::from_str(payload) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Invalid {} payload: {}", kind, e);
                return Inbound::Discard(DiscardReason::Malformed);
            }
        };

        if msg.kind() != kind {
            warn!("Event '{}' carried a {} payload", event, msg.kind());
            return Inbound::Discard(DiscardReason::KindMismatch);
        }

        if msg.from == self.me {
            return Inbound::Discard(DiscardReason::SelfEcho);
        }

        if msg.is_for(&self.me) {
            return Inbound::Deliver(msg);
        }
        if !msg.is_broadcast() {
            return Inbound::Discard(DiscardReason::NotAddressed);
        }
        if broadcast_permitted(&msg) {
            Inbound::Deliver(msg)
        } else {
            debug!("Dropping {} broadcast from {}", kind, msg.from);
            Inbound::Discard(DiscardReason::BroadcastNotPermitted)
        }
    }
}
