use anyhow::Result;
use async_trait::async_trait;
use confab_core::{MediaConstraints, TrackKind};
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A locally captured track.
pub trait MediaTrack: Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> TrackKind;

    fn is_enabled(&self) -> bool;

    fn set_enabled(&self, enabled: bool);

    /// Stop capturing. A stopped track stays stopped.
    fn stop(&self);

    fn is_stopped(&self) -> bool;

    /// Lets a transport recover its own concrete track type.
    fn as_any(&self) -> &dyn Any;
}

/// Enabled/stopped flags shared by track implementations.
#[derive(Debug)]
pub struct TrackFlags {
    enabled: AtomicBool,
    stopped: AtomicBool,
}

impl TrackFlags {
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Live and enabled.
    pub fn is_live(&self) -> bool {
        self.is_enabled() && !self.is_stopped()
    }
}

impl Default for TrackFlags {
    fn default() -> Self {
        Self::new()
    }
}

/// Local stream shared read-only by every outgoing link.
#[derive(Clone)]
pub struct LocalStream {
    id: String,
    tracks: Vec<Arc<dyn MediaTrack>>,
}

impl LocalStream {
    pub fn new(id: impl Into<String>, tracks: Vec<Arc<dyn MediaTrack>>) -> Self {
        Self {
            id: id.into(),
            tracks,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tracks(&self) -> &[Arc<dyn MediaTrack>] {
        &self.tracks
    }

    pub fn tracks_of(&self, kind: TrackKind) -> impl Iterator<Item = &Arc<dyn MediaTrack>> {
        self.tracks.iter().filter(move |t| t.kind() == kind)
    }

    /// `None` when the stream has no track of that kind.
    pub fn is_enabled(&self, kind: TrackKind) -> Option<bool> {
        let mut tracks = self.tracks_of(kind).peekable();
        tracks.peek()?;
        Some(tracks.any(|t| t.is_enabled()))
    }

    pub fn set_enabled(&self, kind: TrackKind, enabled: bool) -> Option<bool> {
        let mut found = false;
        for track in self.tracks_of(kind) {
            track.set_enabled(enabled);
            found = true;
        }
        found.then_some(enabled)
    }

    /// Flip every track of `kind` and return the new state.
    pub fn toggle(&self, kind: TrackKind) -> Option<bool> {
        let enabled = self.is_enabled(kind)?;
        self.set_enabled(kind, !enabled)
    }

    pub fn stop(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }
}

/// Source of local media (camera/microphone or anything standing in for them).
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn acquire(&self, constraints: MediaConstraints) -> Result<LocalStream>;
}
