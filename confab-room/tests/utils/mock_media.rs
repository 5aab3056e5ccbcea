use anyhow::{Result, bail};
use async_trait::async_trait;
use confab_core::{MediaConstraints, TrackKind};
use confab_room::{LocalStream, MediaSource, MediaTrack, TrackFlags};
use std::any::Any;
use std::sync::Arc;

pub struct MockTrack {
    id: String,
    kind: TrackKind,
    flags: TrackFlags,
}

impl MockTrack {
    pub fn new(id: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: id.into(),
            kind,
            flags: TrackFlags::new(),
        }
    }
}

impl MediaTrack for MockTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn is_enabled(&self) -> bool {
        self.flags.is_enabled()
    }

    fn set_enabled(&self, enabled: bool) {
        self.flags.set_enabled(enabled);
    }

    fn stop(&self) {
        self.flags.stop();
    }

    fn is_stopped(&self) -> bool {
        self.flags.is_stopped()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Media source that either hands out mock tracks or refuses outright.
#[derive(Debug, Clone, Default)]
pub struct MockMediaSource {
    deny: bool,
}

impl MockMediaSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Behaves like a user refusing camera/microphone access.
    pub fn denied() -> Self {
        Self { deny: true }
    }

    pub fn stream(constraints: MediaConstraints) -> LocalStream {
        let mut tracks: Vec<Arc<dyn MediaTrack>> = Vec::new();
        if constraints.audio {
            tracks.push(Arc::new(MockTrack::new("mic", TrackKind::Audio)));
        }
        if constraints.video.is_some() {
            tracks.push(Arc::new(MockTrack::new("cam", TrackKind::Video)));
        }
        LocalStream::new("mock-stream", tracks)
    }
}

#[async_trait]
impl MediaSource for MockMediaSource {
    async fn acquire(&self, constraints: MediaConstraints) -> Result<LocalStream> {
        if self.deny {
            bail!("permission denied");
        }
        Ok(Self::stream(constraints))
    }
}
