use async_trait::async_trait;
use confab_core::{RoomName, Topology};
use confab_room::{
    NoopObserver, Relay, RelayChannel, RelayEvent, RoomError, Subscription, join_room,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

use crate::integration::{config, init_tracing};
use crate::utils::{MockMediaSource, MockTransportFactory};

/// Accepts the subscription but never confirms it.
#[derive(Default)]
struct SilentRelay {
    unsubscribed: Arc<AtomicBool>,
    senders: Mutex<Vec<mpsc::UnboundedSender<RelayEvent>>>,
}

struct SilentChannel {
    unsubscribed: Arc<AtomicBool>,
}

#[async_trait]
impl RelayChannel for SilentChannel {
    async fn trigger(&self, _event: &str, _payload: String) -> anyhow::Result<()> {
        Ok(())
    }

    async fn unsubscribe(&self) {
        self.unsubscribed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Relay for SilentRelay {
    async fn subscribe(&self, _room: &RoomName, _user_name: &str) -> anyhow::Result<Subscription> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.lock().await.push(tx);
        Ok(Subscription {
            channel: Arc::new(SilentChannel {
                unsubscribed: self.unsubscribed.clone(),
            }),
            events: rx,
        })
    }
}

#[tokio::test(start_paused = true)]
async fn test_unconfirmed_subscription_times_out() {
    init_tracing();

    let relay = SilentRelay::default();
    let result = join_room(
        config("ada", Topology::HubSpoke).with_subscribe_timeout(Duration::from_secs(3)),
        &relay,
        &MockMediaSource::new(),
        Arc::new(MockTransportFactory::new()),
        Arc::new(NoopObserver),
    )
    .await;

    match result {
        Err(RoomError::SubscriptionTimeout { timeout, .. }) => {
            assert_eq!(timeout, Duration::from_secs(3));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("join succeeded without confirmation"),
    }
    assert!(relay.unsubscribed.load(Ordering::SeqCst));
}
