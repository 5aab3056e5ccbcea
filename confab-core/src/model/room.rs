use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a room as typed by the user. The relay channel carrying it is
/// derived with [`RoomName::channel_name`].
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, Default)]
#[serde(transparent)]
pub struct RoomName(String);

impl RoomName {
    pub const CHANNEL_PREFIX: &'static str = "presence-";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Presence channel the room lives on.
    pub fn channel_name(&self) -> String {
        format!("{}{}", Self::CHANNEL_PREFIX, self.0)
    }
}

impl From<&str> for RoomName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RoomName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
