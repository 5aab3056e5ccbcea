use crate::transport::{LocalStream, MediaSource, MediaTrack, TrackFlags};
use anyhow::{Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use confab_core::{MediaConstraints, TrackKind};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Local track fed with already encoded samples.
pub struct WebrtcTrack {
    kind: TrackKind,
    track: Arc<TrackLocalStaticSample>,
    flags: TrackFlags,
}

impl WebrtcTrack {
    pub fn new(kind: TrackKind, stream_id: &str) -> Self {
        let codec = match kind {
            TrackKind::Audio => RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48_000,
                channels: 2,
                ..Default::default()
            },
            TrackKind::Video => RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                clock_rate: 90_000,
                ..Default::default()
            },
        };
        let track = TrackLocalStaticSample::new(codec, kind.to_string(), stream_id.to_owned());
        Self {
            kind,
            track: Arc::new(track),
            flags: TrackFlags::new(),
        }
    }

    pub(crate) fn inner(&self) -> Arc<dyn TrackLocal + Send + Sync> {
        self.track.clone()
    }

    /// Write one encoded frame. Disabled or stopped tracks drop it.
    pub async fn write_sample(&self, data: Bytes, duration: Duration) -> Result<bool> {
        if !self.flags.is_live() {
            return Ok(false);
        }
        self.track
            .write_sample(&Sample {
                data,
                duration,
                ..Default::default()
            })
            .await?;
        Ok(true)
    }
}

impl MediaTrack for WebrtcTrack {
    fn id(&self) -> &str {
        self.track.id()
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

/// Hands out [`WebrtcTrack`]s for whatever the constraints ask for. Frames are
/// pushed by the caller through [`WebrtcTrack::write_sample`].
#[derive(Debug, Default, Clone)]
pub struct StaticTrackSource;

impl StaticTrackSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MediaSource for StaticTrackSource {
    async fn acquire(&self, constraints: MediaConstraints) -> Result<LocalStream> {
        if !constraints.audio && constraints.video.is_none() {
            bail!("no audio or video requested");
        }
        let stream_id = format!("confab-{}", Uuid::new_v4());
        let mut tracks: Vec<Arc<dyn MediaTrack>> = Vec::new();
        if constraints.audio {
            tracks.push(Arc::new(WebrtcTrack::new(TrackKind::Audio, &stream_id)));
        }
        if constraints.video.is_some() {
            tracks.push(Arc::new(WebrtcTrack::new(TrackKind::Video, &stream_id)));
        }
        Ok(LocalStream::new(stream_id, tracks))
    }
}
