use crate::error::RoomError;
use confab_core::{IceServerConfig, MediaConstraints, RoomName, Topology};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SUBSCRIBE_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_EVENT_BUFFER: usize = 256;

pub fn default_ice_servers() -> Vec<IceServerConfig> {
    vec![
        IceServerConfig::stun("stun:openrelay.metered.ca:80"),
        IceServerConfig::stun("stun:stun.l.google.com:19302"),
        IceServerConfig::stun("stun:stun2.l.google.com:19302"),
    ]
}

/// Everything a participant needs to join one room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    pub room: RoomName,
    pub user_name: String,
    pub topology: Topology,
    pub ice_servers: Vec<IceServerConfig>,
    pub subscribe_timeout_ms: u64,
    pub media: MediaConstraints,
    /// Joining fails when the room already holds more members than this.
    pub capacity: Option<usize>,
    /// Capacity of the internal step/transport event queues.
    pub event_buffer: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            room: RoomName::default(),
            user_name: String::new(),
            topology: Topology::default(),
            ice_servers: default_ice_servers(),
            subscribe_timeout_ms: DEFAULT_SUBSCRIBE_TIMEOUT_MS,
            media: MediaConstraints::default(),
            capacity: None,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl RoomConfig {
    pub fn new(room: impl Into<RoomName>, user_name: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            user_name: user_name.into(),
            ..Default::default()
        }
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_media(mut self, media: MediaConstraints) -> Self {
        self.media = media;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_subscribe_timeout(mut self, timeout: Duration) -> Self {
        self.subscribe_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn subscribe_timeout(&self) -> Duration {
        Duration::from_millis(self.subscribe_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), RoomError> {
        if self.room.is_empty() {
            return Err(RoomError::InvalidConfig("room name is empty".into()));
        }
        if self.user_name.trim().is_empty() {
            return Err(RoomError::InvalidConfig("user name is empty".into()));
        }
        if self.capacity == Some(0) {
            return Err(RoomError::InvalidConfig("capacity must be at least 1".into()));
        }
        if self.event_buffer == 0 {
            return Err(RoomError::InvalidConfig("event buffer must be non-zero".into()));
        }
        Ok(())
    }
}
