//! Integration tests for confab-room.
//!
//! Tests are organized by functionality:
//! - `hub_spoke_tests` - host/student rooms
//! - `mesh_tests` - symmetric rooms
//! - `signaling_tests` - addressing, buffering and relay failures
//! - `lifecycle_tests` - reaping, leaving and per-link failures
//! - `join_tests` - joins that must fail

pub mod hub_spoke_tests;

use confab_core::Topology;
use confab_room::{
    LinkSnapshot, LinkState, MemoryRelay, RoomConfig, RoomHandle, RoomObserver, join_room,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

use crate::utils::{MockMediaSource, MockTransportFactory, ROOM};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn config(user: &str, topology: Topology) -> RoomConfig {
    RoomConfig::new(ROOM, user).with_topology(topology)
}

/// Join through a real room task over `relay`.
pub async fn join(
    relay: &MemoryRelay,
    config: RoomConfig,
    factory: &MockTransportFactory,
    observer: Arc<dyn RoomObserver>,
) -> RoomHandle {
    join_room(
        config,
        relay,
        &MockMediaSource::new(),
        Arc::new(factory.clone()),
        observer,
    )
    .await
    .expect("join failed")
}

/// Poll the room until its links satisfy `check`.
pub async fn wait_for_links<F>(handle: &RoomHandle, timeout_ms: u64, check: F) -> Vec<LinkSnapshot>
where
    F: Fn(&[LinkSnapshot]) -> bool,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);

    loop {
        let links = handle.links().await.expect("room closed");
        if check(&links) || start.elapsed() > timeout {
            return links;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub fn all_connected(links: &[LinkSnapshot], expected: usize) -> bool {
    links.len() == expected && links.iter().all(|l| l.state == LinkState::Connected)
}
