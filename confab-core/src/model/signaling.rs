use crate::model::peer::PeerId;
use crate::model::room::RoomName;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

/// Opaque session description. The orchestrator relays it, never parses it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

/// Network candidate as proposed by the remote side (trickle ICE).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_m_line_index: None,
            username_fragment: None,
        }
    }
}

/// Recipient of a signaling message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Address {
    Peer(PeerId),
    Broadcast,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Peer(id) => write!(f, "{}", id),
            Address::Broadcast => f.write_str("*"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "d")]
pub enum SignalPayload {
    /// Readiness announcement: the sender has joined and holds local media.
    Join { room: RoomName },
    Offer { sdp: String },
    Answer { sdp: String },
    IceCandidate(IceCandidate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Join,
    Offer,
    Answer,
    IceCandidate,
}

impl SignalKind {
    pub const ALL: [SignalKind; 4] = [
        SignalKind::Join,
        SignalKind::Offer,
        SignalKind::Answer,
        SignalKind::IceCandidate,
    ];

    /// Relay event name carrying this kind of message.
    pub fn event_name(self) -> &'static str {
        match self {
            SignalKind::Join => "client-ready",
            SignalKind::Offer => "client-offer",
            SignalKind::Answer => "client-answer",
            SignalKind::IceCandidate => "client-ice-candidate",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.event_name() == name)
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignalMessage {
    pub from: PeerId,
    pub to: Address,
    pub payload: SignalPayload,
}

impl SignalMessage {
    pub fn new(from: PeerId, to: Address, payload: SignalPayload) -> Self {
        Self { from, to, payload }
    }

    pub fn kind(&self) -> SignalKind {
        match self.payload {
            SignalPayload::Join { .. } => SignalKind::Join,
            SignalPayload::Offer { .. } => SignalKind::Offer,
            SignalPayload::Answer { .. } => SignalKind::Answer,
            SignalPayload::IceCandidate(_) => SignalKind::IceCandidate,
        }
    }

    /// True when `me` is the direct recipient, false for broadcasts and foreign peers.
    pub fn is_for(&self, me: &PeerId) -> bool {
        self.to == Address::Peer(*me)
    }

    pub fn is_broadcast(&self) -> bool {
        self.to == Address::Broadcast
    }
}
