use crate::error::NegotiationStage;
use crate::transport::{MediaTrack, MediaTransport, TransportEventSink, TransportFactory};
use confab_core::{IceServerConfig, PeerId, SessionDescription};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Slow part of a transition, run off the room loop.
#[derive(Debug, Clone)]
pub enum NegotiationStep {
    /// Create a transport, attach tracks, generate an offer and set it locally.
    Offer,
    /// Same, but apply `offer` as the remote description and answer it.
    Answer { offer: SessionDescription },
}

pub struct StepReady {
    pub transport: Arc<dyn MediaTransport>,
    pub local: SessionDescription,
}

pub struct StepError {
    pub stage: NegotiationStage,
    pub source: anyhow::Error,
}

impl fmt::Debug for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:#}", self.stage, self.source)
    }
}

/// Result of a [`NegotiationStep`], tagged with the link it was started for.
pub struct StepOutcome {
    pub peer: PeerId,
    pub generation: u64,
    pub result: Result<StepReady, StepError>,
}

impl StepOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

impl fmt::Debug for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepOutcome")
            .field("peer", &self.peer)
            .field("generation", &self.generation)
            .field("ok", &self.result.is_ok())
            .finish()
    }
}

fn at(stage: NegotiationStage) -> impl FnOnce(anyhow::Error) -> StepError {
    move |source| StepError { stage, source }
}

pub(crate) async fn run_step(
    factory: Arc<dyn TransportFactory>,
    ice_servers: Arc<[IceServerConfig]>,
    tracks: Vec<Arc<dyn MediaTrack>>,
    events: TransportEventSink,
    step: NegotiationStep,
) -> Result<StepReady, StepError> {
    let peer = events.peer_id();
    let transport = factory
        .create(&ice_servers, events)
        .await
        .map_err(at(NegotiationStage::CreateTransport))?;

    match drive(transport.as_ref(), tracks, step).await {
        Ok(local) => Ok(StepReady { transport, local }),
        Err(e) => {
            debug!("Step for {} failed at {}, closing transport", peer, e.stage);
            if let Err(close_err) = transport.close().await {
                warn!("Failed to close transport for {}: {:#}", peer, close_err);
            }
            Err(e)
        }
    }
}

async fn drive(
    transport: &dyn MediaTransport,
    tracks: Vec<Arc<dyn MediaTrack>>,
    step: NegotiationStep,
) -> Result<SessionDescription, StepError> {
    for track in tracks {
        transport
            .add_track(track)
            .await
            .map_err(at(NegotiationStage::AttachTracks))?;
    }

    let local = match step {
        NegotiationStep::Offer => transport
            .create_offer()
            .await
            .map_err(at(NegotiationStage::CreateOffer))?,
        NegotiationStep::Answer { offer } => {
            transport
                .set_remote_description(offer)
                .await
                .map_err(at(NegotiationStage::SetRemoteDescription))?;
            transport
                .create_answer()
                .await
                .map_err(at(NegotiationStage::CreateAnswer))?
        }
    };

    transport
        .set_local_description(local.clone())
        .await
        .map_err(at(NegotiationStage::SetLocalDescription))?;
    Ok(local)
}
