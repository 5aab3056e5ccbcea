use confab_core::{PeerId, RoomName, SignalKind};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Point of the offer/answer exchange at which a link failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationStage {
    CreateTransport,
    AttachTracks,
    CreateOffer,
    CreateAnswer,
    SetLocalDescription,
    SetRemoteDescription,
    AddIceCandidate,
    Transport,
}

impl fmt::Display for NegotiationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NegotiationStage::CreateTransport => "create transport",
            NegotiationStage::AttachTracks => "attach local tracks",
            NegotiationStage::CreateOffer => "create offer",
            NegotiationStage::CreateAnswer => "create answer",
            NegotiationStage::SetLocalDescription => "set local description",
            NegotiationStage::SetRemoteDescription => "set remote description",
            NegotiationStage::AddIceCandidate => "add ICE candidate",
            NegotiationStage::Transport => "media transport",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("invalid room configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to acquire local media")]
    Acquisition(#[source] anyhow::Error),

    #[error("relay refused subscription")]
    Subscription(#[source] anyhow::Error),

    #[error("relay did not confirm subscription to '{room}' within {timeout:?}")]
    SubscriptionTimeout { room: RoomName, timeout: Duration },

    #[error("relay closed the subscription to '{room}' before confirming it")]
    SubscriptionClosed { room: RoomName },

    #[error("room '{room}' is full ({count} members, capacity {capacity})")]
    RoomFull {
        room: RoomName,
        capacity: usize,
        count: usize,
    },

    #[error("negotiation with {peer} failed at {stage}")]
    Negotiation {
        peer: PeerId,
        stage: NegotiationStage,
        #[source]
        source: anyhow::Error,
    },

    #[error("relay failed to deliver {kind}")]
    RelayDelivery {
        kind: SignalKind,
        #[source]
        source: anyhow::Error,
    },

    #[error("malformed signaling payload")]
    Codec(#[from] serde_json::Error),

    #[error("room has already been left")]
    RoomClosed,
}

impl RoomError {
    pub(crate) fn negotiation(peer: PeerId, stage: NegotiationStage, source: anyhow::Error) -> Self {
        Self::Negotiation {
            peer,
            stage,
            source,
        }
    }

    /// Errors that abort the local participant's join. Everything else is
    /// confined to a single link or is only a warning.
    pub fn is_room_fatal(&self) -> bool {
        matches!(
            self,
            RoomError::InvalidConfig(_)
                | RoomError::Acquisition(_)
                | RoomError::Subscription(_)
                | RoomError::SubscriptionTimeout { .. }
                | RoomError::SubscriptionClosed { .. }
                | RoomError::RoomFull { .. }
        )
    }

    /// Peer whose link the error belongs to, if any.
    pub fn peer(&self) -> Option<PeerId> {
        match self {
            RoomError::Negotiation { peer, .. } => Some(*peer),
            _ => None,
        }
    }
}
