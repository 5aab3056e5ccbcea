use crate::room::RoomObserver;
use crate::session::{LinkState, SessionTable};
use crate::transport::LocalStream;
use confab_core::PeerId;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tears links down. Reaping an absent peer is a no-op.
pub struct Reaper {
    observer: Arc<dyn RoomObserver>,
}

impl Reaper {
    pub fn new(observer: Arc<dyn RoomObserver>) -> Self {
        Self { observer }
    }

    /// Returns whether a link to `peer` existed.
    pub async fn reap(&self, table: &mut SessionTable, peer: &PeerId) -> bool {
        let Some(mut link) = table.remove(peer) else {
            debug!("Nothing to reap for {}", peer);
            return false;
        };

        let prev = link.transition(LinkState::Closed);
        let dropped = link.pending_candidates.len();
        link.pending_candidates.clear();
        link.outbound_candidates.clear();
        info!(
            "Reaped link to {} (was {}, {} pending candidate(s) dropped)",
            peer, prev, dropped
        );

        if let Some(transport) = link.transport.take() {
            if let Err(e) = transport.close().await {
                warn!("Closing transport for {} failed: {:#}", peer, e);
            }
        }

        self.observer.on_link_state(*peer, LinkState::Closed).await;
        self.observer.on_peer_detached(*peer).await;
        true
    }

    /// Reap every link, then release local media. Returns how many links went.
    pub async fn reap_all(&self, table: &mut SessionTable, stream: &LocalStream) -> usize {
        let mut reaped = 0;
        for peer in table.peers() {
            if self.reap(table, &peer).await {
                reaped += 1;
            }
        }

        stream.stop();
        self.observer.on_local_media_released().await;
        info!("Released local media after reaping {} link(s)", reaped);
        reaped
    }
}
