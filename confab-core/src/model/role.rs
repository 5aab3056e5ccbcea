use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape of the connection graph inside a room.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    /// Every participant links to every other participant.
    Mesh,
    /// The first participant hosts; everybody else links only to the host.
    #[default]
    HubSpoke,
}

/// Role of the local participant for the whole session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionRole {
    Host,
    Student,
    Peer,
}

/// Who sends the offer on one directed link.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LinkRole {
    Initiator,
    Responder,
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topology::Mesh => f.write_str("mesh"),
            Topology::HubSpoke => f.write_str("hub-spoke"),
        }
    }
}

impl fmt::Display for SessionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for LinkRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
