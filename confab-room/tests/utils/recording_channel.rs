use anyhow::bail;
use async_trait::async_trait;
use confab_core::{SignalKind, SignalMessage};
use confab_room::RelayChannel;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// Relay channel that keeps whatever is triggered on it.
#[derive(Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<(String, String)>>,
    cursor: Mutex<usize>,
    failing: AtomicBool,
    unsubscribed: AtomicBool,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later trigger fail.
    pub fn fail_triggers(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn is_unsubscribed(&self) -> bool {
        self.unsubscribed.load(Ordering::SeqCst)
    }

    /// Raw `(event, payload)` pairs.
    pub async fn raw(&self) -> Vec<(String, String)> {
        self.sent.lock().await.clone()
    }

    pub async fn messages(&self) -> Vec<SignalMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .map(|(_, payload)| serde_json::from_str(payload).unwrap())
            .collect()
    }

    pub async fn messages_of(&self, kind: SignalKind) -> Vec<SignalMessage> {
        self.messages()
            .await
            .into_iter()
            .filter(|m| m.kind() == kind)
            .collect()
    }

    /// Messages sent since the previous call.
    pub async fn take_new(&self) -> Vec<SignalMessage> {
        let sent = self.sent.lock().await;
        let mut cursor = self.cursor.lock().await;
        let fresh = sent[*cursor..]
            .iter()
            .map(|(_, payload)| serde_json::from_str(payload).unwrap())
            .collect();
        *cursor = sent.len();
        fresh
    }
}

#[async_trait]
impl RelayChannel for RecordingChannel {
    async fn trigger(&self, event: &str, payload: String) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("relay unreachable");
        }
        tracing::debug!("[RecordingChannel] {}", event);
        self.sent.lock().await.push((event.to_string(), payload));
        Ok(())
    }

    async fn unsubscribe(&self) {
        self.unsubscribed.store(true, Ordering::SeqCst);
    }
}
