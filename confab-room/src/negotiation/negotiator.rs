use super::negotiation_step::run_step;
use crate::error::{NegotiationStage, RoomError};
use crate::negotiation::{NegotiationStep, StepOutcome};
use crate::room::RoomObserver;
use crate::session::{LinkState, PeerLink, SessionTable};
use crate::signaling::Dispatcher;
use crate::transport::{
    LocalStream, TransportEvent, TransportEventKind, TransportEventSink, TransportFactory,
    TransportState,
};
use anyhow::anyhow;
use confab_core::{
    IceCandidate, IceServerConfig, LinkRole, PeerId, SessionDescription, SignalPayload,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// What happened to an inbound candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOutcome {
    Applied,
    /// Held until the remote description is set.
    Buffered,
    /// No live link.
    Discarded,
}

/// Drives every [`PeerLink`] through its offer/answer exchange.
///
/// The negotiator owns no links. It creates, transitions and fills them in a
/// [`SessionTable`] owned by the room; removal belongs to the reaper.
pub struct Negotiator {
    factory: Arc<dyn TransportFactory>,
    ice_servers: Arc<[IceServerConfig]>,
    stream: LocalStream,
    steps_tx: mpsc::Sender<StepOutcome>,
    transport_tx: mpsc::Sender<TransportEvent>,
    observer: Arc<dyn RoomObserver>,
    next_generation: u64,
}

impl Negotiator {
    pub fn new(
        factory: Arc<dyn TransportFactory>,
        ice_servers: Vec<IceServerConfig>,
        stream: LocalStream,
        steps_tx: mpsc::Sender<StepOutcome>,
        transport_tx: mpsc::Sender<TransportEvent>,
        observer: Arc<dyn RoomObserver>,
    ) -> Self {
        Self {
            factory,
            ice_servers: ice_servers.into(),
            stream,
            steps_tx,
            transport_tx,
            observer,
            next_generation: 1,
        }
    }

    /// `Idle -> Offering`. Returns false when a link to `peer` already exists.
    pub async fn start_offer(&mut self, table: &mut SessionTable, peer: PeerId) -> bool {
        let generation = self.bump_generation();
        let Ok(link) = table.insert(PeerLink::new(peer, LinkRole::Initiator, generation)) else {
            return false;
        };

        info!("Offering to {} (gen {})", peer, generation);
        self.set_state(link, LinkState::Offering).await;
        self.spawn_step(peer, generation, NegotiationStep::Offer);
        true
    }

    /// `Idle -> AnswerPending` on an offer from `peer`. A second offer for an
    /// existing link is dropped.
    pub async fn accept_offer(
        &mut self,
        table: &mut SessionTable,
        peer: PeerId,
        offer: SessionDescription,
    ) -> bool {
        let generation = self.bump_generation();
        let Ok(link) = table.insert(PeerLink::new(peer, LinkRole::Responder, generation)) else {
            debug!("Dropping repeated offer from {}", peer);
            return false;
        };

        info!("Answering offer from {} (gen {})", peer, generation);
        link.remote_description = Some(offer.clone());
        self.set_state(link, LinkState::AnswerPending).await;
        self.spawn_step(peer, generation, NegotiationStep::Answer { offer });
        true
    }

    /// Apply a finished step if its link is still the one it was started for.
    ///
    /// A failed step comes back as [`RoomError::Negotiation`]; the link stays in
    /// the table for the caller to reap.
    pub async fn complete_step(
        &mut self,
        table: &mut SessionTable,
        dispatcher: &Dispatcher,
        outcome: StepOutcome,
    ) -> Result<(), RoomError> {
        let StepOutcome {
            peer,
            generation,
            result,
        } = outcome;

        let link = match table.get_mut(&peer) {
            Some(link)
                if link.generation == generation
                    && link.transport.is_none()
                    && matches!(link.state, LinkState::Offering | LinkState::AnswerPending) =>
            {
                link
            }
            _ => {
                debug!("Discarding stale step result for {} (gen {})", peer, generation);
                if let Ok(ready) = result {
                    if let Err(e) = ready.transport.close().await {
                        warn!("Failed to close orphaned transport for {}: {:#}", peer, e);
                    }
                }
                return Ok(());
            }
        };

        let ready = match result {
            Ok(ready) => ready,
            Err(e) => return Err(RoomError::negotiation(peer, e.stage, e.source)),
        };

        link.transport = Some(ready.transport);
        link.local_description = Some(ready.local.clone());

        let payload = match link.role {
            LinkRole::Initiator => SignalPayload::Offer { sdp: ready.local.sdp },
            LinkRole::Responder => {
                link.remote_applied = true;
                self.flush_pending(link).await?;
                self.set_state(link, LinkState::Connected).await;
                SignalPayload::Answer { sdp: ready.local.sdp }
            }
        };

        // Later local candidates go straight out, whether or not this dispatch lands.
        link.description_sent = true;
        if let Err(e) = dispatcher.unicast(peer, payload).await {
            let dropped = std::mem::take(&mut link.outbound_candidates);
            debug!("Dropping {} held candidate(s) for {}", dropped.len(), peer);
            return Err(e);
        }
        self.flush_outbound(link, dispatcher).await
    }

    /// `Offering -> Connected` on the answer from `peer`. Anything else is stale.
    pub async fn apply_answer(
        &mut self,
        table: &mut SessionTable,
        peer: PeerId,
        answer: SessionDescription,
    ) -> Result<bool, RoomError> {
        let Some(link) = table.get_mut(&peer) else {
            debug!("Answer from {} has no link", peer);
            return Ok(false);
        };
        if link.role != LinkRole::Initiator || link.state != LinkState::Offering {
            debug!("Answer from {} while {} as {}", peer, link.state, link.role);
            return Ok(false);
        }
        let Some(transport) = link.transport.clone() else {
            debug!("Answer from {} before our offer went out", peer);
            return Ok(false);
        };

        transport
            .set_remote_description(answer.clone())
            .await
            .map_err(|e| RoomError::negotiation(peer, NegotiationStage::SetRemoteDescription, e))?;

        link.remote_description = Some(answer);
        link.remote_applied = true;
        self.set_state(link, LinkState::Connected).await;
        self.flush_pending(link).await?;
        Ok(true)
    }

    /// A candidate the transport refuses fails the link with
    /// [`RoomError::Negotiation`] for the caller to reap.
    pub async fn apply_candidate(
        &mut self,
        table: &mut SessionTable,
        peer: PeerId,
        candidate: IceCandidate,
    ) -> Result<CandidateOutcome, RoomError> {
        let Some(link) = table.get_mut(&peer) else {
            debug!("Candidate from {} has no link", peer);
            return Ok(CandidateOutcome::Discarded);
        };
        if !link.state.accepts_candidates() {
            return Ok(CandidateOutcome::Discarded);
        }

        match link.transport.clone() {
            Some(transport) if link.remote_applied => {
                transport
                    .add_ice_candidate(candidate)
                    .await
                    .map_err(|e| {
                        RoomError::negotiation(peer, NegotiationStage::AddIceCandidate, e)
                    })?;
                link.applied_candidates += 1;
                Ok(CandidateOutcome::Applied)
            }
            _ => {
                link.pending_candidates.push_back(candidate);
                debug!(
                    "Buffered candidate from {} ({} pending)",
                    peer,
                    link.pending_candidates.len()
                );
                Ok(CandidateOutcome::Buffered)
            }
        }
    }

    /// Handle something a transport reported.
    ///
    /// A `Failed` transport comes back as [`RoomError::Negotiation`] for the
    /// caller to reap.
    pub async fn on_transport_event(
        &mut self,
        table: &mut SessionTable,
        dispatcher: &Dispatcher,
        event: TransportEvent,
    ) -> Result<(), RoomError> {
        let peer = event.peer_id;
        let Some(link) = table
            .get_mut(&peer)
            .filter(|l| l.generation == event.generation)
        else {
            debug!("Dropping transport event for gone link {} (gen {})", peer, event.generation);
            return Ok(());
        };

        match event.kind {
            TransportEventKind::CandidateGenerated(candidate) => {
                if link.description_sent {
                    dispatcher
                        .unicast(peer, SignalPayload::IceCandidate(candidate))
                        .await?;
                } else {
                    link.outbound_candidates.push(candidate);
                }
                Ok(())
            }
            TransportEventKind::TrackAdded(track) => {
                info!("Remote {} track {} from {}", track.kind, track.id, peer);
                link.remote_tracks.push(track.clone());
                self.observer.on_remote_track(peer, track).await;
                Ok(())
            }
            TransportEventKind::StateChanged(TransportState::Failed) => Err(RoomError::negotiation(
                peer,
                NegotiationStage::Transport,
                anyhow!("media transport failed"),
            )),
            TransportEventKind::StateChanged(state) => {
                debug!("Transport for {} is {}", peer, state);
                Ok(())
            }
        }
    }

    fn bump_generation(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        generation
    }

    fn spawn_step(&self, peer: PeerId, generation: u64, step: NegotiationStep) {
        let factory = self.factory.clone();
        let ice_servers = self.ice_servers.clone();
        let tracks = self.stream.tracks().to_vec();
        let events = TransportEventSink::new(peer, generation, self.transport_tx.clone());
        let steps_tx = self.steps_tx.clone();

        tokio::spawn(async move {
            let result = run_step(factory, ice_servers, tracks, events, step).await;
            let outcome = StepOutcome {
                peer,
                generation,
                result,
            };
            if let Err(mpsc::error::SendError(outcome)) = steps_tx.send(outcome).await {
                // Room is gone; do not leak the transport.
                if let Ok(ready) = outcome.result {
                    let _ = ready.transport.close().await;
                }
            }
        });
    }

    async fn set_state(&self, link: &mut PeerLink, next: LinkState) {
        if link.transition(next) != next {
            self.observer.on_link_state(link.peer_id, next).await;
        }
    }

    /// Apply buffered remote candidates in arrival order. Stops at the first
    /// candidate the transport refuses.
    async fn flush_pending(&self, link: &mut PeerLink) -> Result<(), RoomError> {
        let Some(transport) = link.transport.clone() else {
            return Ok(());
        };
        if !link.pending_candidates.is_empty() {
            debug!(
                "Applying {} buffered candidate(s) for {}",
                link.pending_candidates.len(),
                link.peer_id
            );
        }
        while let Some(candidate) = link.pending_candidates.pop_front() {
            transport.add_ice_candidate(candidate).await.map_err(|e| {
                RoomError::negotiation(link.peer_id, NegotiationStage::AddIceCandidate, e)
            })?;
            link.applied_candidates += 1;
        }
        Ok(())
    }

    /// Send local candidates gathered before our description went out.
    async fn flush_outbound(
        &self,
        link: &mut PeerLink,
        dispatcher: &Dispatcher,
    ) -> Result<(), RoomError> {
        let peer = link.peer_id;
        for candidate in std::mem::take(&mut link.outbound_candidates) {
            dispatcher
                .unicast(peer, SignalPayload::IceCandidate(candidate))
                .await?;
        }
        Ok(())
    }
}
