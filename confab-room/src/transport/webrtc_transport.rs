use crate::transport::{
    MediaTrack, MediaTransport, TransportEventSink, TransportFactory, TransportState, WebrtcTrack,
};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use confab_core::{
    IceCandidate, IceServerConfig, RemoteTrack, SdpKind, SessionDescription, TrackKind,
};
use std::sync::Arc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::track::track_remote::TrackRemote;

/// [`MediaTransport`] backed by a `webrtc` peer connection.
pub struct WebrtcTransport {
    peer_connection: Arc<RTCPeerConnection>,
    events: TransportEventSink,
}

impl WebrtcTransport {
    pub async fn new(ice_servers: &[IceServerConfig], events: TransportEventSink) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers
                .iter()
                .map(|s| RTCIceServer {
                    urls: s.urls.clone(),
                    username: s.username.clone().unwrap_or_default(),
                    credential: s.credential.clone().unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_sink = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let sink = state_sink.clone();
                Box::pin(async move {
                    info!(
                        "Peer connection state changed for {}: {:?}",
                        sink.peer_id(),
                        s
                    );
                    if let Some(state) = map_state(s) {
                        sink.state(state).await;
                    }
                })
            },
        ));

        let ice_sink = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let sink = ice_sink.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                sink.candidate(IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                    username_fragment: init.username_fragment,
                })
                .await;
            })
        }));

        let track_sink = events.clone();
        peer_connection.on_track(Box::new(move |track: Arc<TrackRemote>, _, _| {
            let sink = track_sink.clone();
            Box::pin(async move {
                let kind = match track.kind() {
                    RTPCodecType::Audio => TrackKind::Audio,
                    RTPCodecType::Video => TrackKind::Video,
                    other => {
                        debug!("Ignoring remote track of kind {:?} from {}", other, sink.peer_id());
                        return;
                    }
                };
                info!("Remote {kind} track from {}", sink.peer_id());
                sink.track(RemoteTrack {
                    id: track.id(),
                    stream_id: track.stream_id(),
                    kind,
                })
                .await;
            })
        }));

        Ok(Self {
            peer_connection,
            events,
        })
    }

    fn to_rtc(desc: SessionDescription) -> Result<RTCSessionDescription> {
        let rtc = match desc.kind {
            SdpKind::Offer => RTCSessionDescription::offer(desc.sdp)?,
            SdpKind::Answer => RTCSessionDescription::answer(desc.sdp)?,
        };
        Ok(rtc)
    }
}

fn map_state(s: RTCPeerConnectionState) -> Option<TransportState> {
    match s {
        RTCPeerConnectionState::New => Some(TransportState::New),
        RTCPeerConnectionState::Connecting => Some(TransportState::Connecting),
        RTCPeerConnectionState::Connected => Some(TransportState::Connected),
        RTCPeerConnectionState::Disconnected => Some(TransportState::Disconnected),
        RTCPeerConnectionState::Failed => Some(TransportState::Failed),
        RTCPeerConnectionState::Closed => Some(TransportState::Closed),
        _ => None,
    }
}

#[async_trait]
impl MediaTransport for WebrtcTransport {
    async fn add_track(&self, track: Arc<dyn MediaTrack>) -> Result<()> {
        let local = track
            .as_any()
            .downcast_ref::<WebrtcTrack>()
            .ok_or_else(|| anyhow!("track {} is not backed by webrtc", track.id()))?;

        let rtp_sender = self
            .peer_connection
            .add_track(local.inner())
            .await
            .context("Failed to add local track")?;

        // RTCP has to be read for interceptors to work.
        tokio::spawn(async move {
            let mut rtcp_buf = vec![0u8; 1500];
            while rtp_sender.read(&mut rtcp_buf).await.is_ok() {}
        });
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription> {
        let offer = self.peer_connection.create_offer(None).await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        let answer = self.peer_connection.create_answer(None).await?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()> {
        self.peer_connection
            .set_local_description(Self::to_rtc(desc)?)
            .await?;
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()> {
        self.peer_connection
            .set_remote_description(Self::to_rtc(desc)?)
            .await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        self.peer_connection
            .add_ice_candidate(RTCIceCandidateInit {
                candidate: candidate.candidate,
                sdp_mid: candidate.sdp_mid,
                sdp_mline_index: candidate.sdp_m_line_index,
                username_fragment: candidate.username_fragment,
            })
            .await
            .context("Failed to add ICE candidate")?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        // Late callbacks must not reach a link that no longer exists.
        self.peer_connection
            .on_ice_candidate(Box::new(|_| Box::pin(async {})));
        self.peer_connection
            .on_track(Box::new(|_, _, _| Box::pin(async {})));
        self.peer_connection
            .on_peer_connection_state_change(Box::new(|_| Box::pin(async {})));

        self.peer_connection.close().await?;
        debug!("Closed transport for {}", self.events.peer_id());
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct WebrtcTransportFactory;

impl WebrtcTransportFactory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransportFactory for WebrtcTransportFactory {
    async fn create(
        &self,
        ice_servers: &[IceServerConfig],
        events: TransportEventSink,
    ) -> Result<Arc<dyn MediaTransport>> {
        let transport = WebrtcTransport::new(ice_servers, events).await?;
        Ok(Arc::new(transport))
    }
}
