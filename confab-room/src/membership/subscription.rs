use crate::error::RoomError;
use crate::signaling::RelayEvent;
use confab_core::{PeerId, RoomName};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Relay confirmation of our subscription.
#[derive(Debug, Clone)]
pub struct SubscriptionAck {
    pub me: PeerId,
    pub members: Vec<PeerId>,
    /// Events that arrived ahead of the confirmation, in arrival order.
    pub backlog: Vec<RelayEvent>,
}

impl SubscriptionAck {
    pub fn event(&self) -> RelayEvent {
        RelayEvent::SubscriptionSucceeded {
            me: self.me,
            members: self.members.clone(),
        }
    }
}

/// Wait for `subscription-succeeded`. Expiry is fatal for the join; retrying is
/// up to the caller.
pub async fn await_subscription(
    events: &mut mpsc::UnboundedReceiver<RelayEvent>,
    room: &RoomName,
    limit: Duration,
) -> Result<SubscriptionAck, RoomError> {
    let wait = async {
        let mut backlog = Vec::new();
        while let Some(event) = events.recv().await {
            match event {
                RelayEvent::SubscriptionSucceeded { me, members } => {
                    return Ok(SubscriptionAck {
                        me,
                        members,
                        backlog,
                    });
                }
                other => backlog.push(other),
            }
        }
        Err(RoomError::SubscriptionClosed { room: room.clone() })
    };

    timeout(limit, wait)
        .await
        .map_err(|_| RoomError::SubscriptionTimeout {
            room: room.clone(),
            timeout: limit,
        })?
}
