use async_trait::async_trait;
use confab_core::{PeerId, RoomName};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Events delivered by the relay for one subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// The subscription is live. `members` is ordered by join time and includes `me`.
    SubscriptionSucceeded { me: PeerId, members: Vec<PeerId> },
    MemberJoined(PeerId),
    MemberRemoved(PeerId),
    /// Opaque application event triggered by another subscriber.
    Message { event: String, payload: String },
}

/// Publishing half of a relay subscription.
#[async_trait]
pub trait RelayChannel: Send + Sync {
    /// Publish an application event to every other subscriber of the channel.
    async fn trigger(&self, event: &str, payload: String) -> anyhow::Result<()>;

    /// Leave the channel. Calling it twice is harmless.
    async fn unsubscribe(&self);
}

pub struct Subscription {
    pub channel: Arc<dyn RelayChannel>,
    pub events: mpsc::UnboundedReceiver<RelayEvent>,
}

/// Hosted publish/subscribe service with presence, used only for signaling.
#[async_trait]
pub trait Relay: Send + Sync {
    async fn subscribe(&self, room: &RoomName, user_name: &str) -> anyhow::Result<Subscription>;
}
