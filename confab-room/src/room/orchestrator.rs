use crate::config::RoomConfig;
use crate::error::RoomError;
use crate::lifecycle::Reaper;
use crate::membership::{MembershipEvent, MembershipTracker, SubscriptionAck};
use crate::negotiation::{CandidateOutcome, Negotiator, StepOutcome};
use crate::role::{RoleBook, RolePolicy};
use crate::room::{RoomCommand, RoomObserver};
use crate::session::{LinkSnapshot, SessionTable};
use crate::signaling::{Dispatcher, Inbound, RelayChannel, RelayEvent};
use crate::transport::{LocalStream, TransportEvent, TransportFactory};
use confab_core::{LinkRole, PeerId, RoomName, SessionDescription, SessionRole, SignalPayload};
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Everything the room loop reacts to.
#[derive(Debug)]
pub enum RoomInput {
    Relay(RelayEvent),
    Step(StepOutcome),
    Transport(TransportEvent),
    Command(RoomCommand),
}

/// Receiving ends of the queues the orchestrator feeds itself through.
pub struct RoomReceivers {
    pub steps: mpsc::Receiver<StepOutcome>,
    pub transport: mpsc::Receiver<TransportEvent>,
}

/// Per-participant state and the single entry point that mutates it.
///
/// Inputs are handled one at a time, so tests can replay an exact sequence
/// of relay events and step completions.
pub struct Orchestrator {
    room: RoomName,
    me: PeerId,
    policy: RolePolicy,
    role: SessionRole,
    tracker: MembershipTracker,
    roles: RoleBook,
    table: SessionTable,
    dispatcher: Dispatcher,
    negotiator: Negotiator,
    reaper: Reaper,
    stream: LocalStream,
    observer: Arc<dyn RoomObserver>,
    left: bool,
}

impl Orchestrator {
    pub fn new(
        config: &RoomConfig,
        ack: &SubscriptionAck,
        channel: Arc<dyn RelayChannel>,
        stream: LocalStream,
        transports: Arc<dyn TransportFactory>,
        observer: Arc<dyn RoomObserver>,
    ) -> (Self, RoomReceivers) {
        let buffer = config.event_buffer.max(1);
        let (steps_tx, steps) = mpsc::channel(buffer);
        let (transport_tx, transport) = mpsc::channel(buffer);

        let mut tracker = MembershipTracker::new();
        let is_first = match tracker.observe(&ack.event()) {
            Some(MembershipEvent::SelfJoined { is_first, .. }) => is_first,
            _ => tracker.membership().len() <= 1,
        };

        let policy = RolePolicy::new(config.topology);
        let role = policy.decide_role(is_first);
        info!(
            "Joined '{}' as {} ({} topology, {} member(s))",
            config.room,
            role,
            config.topology,
            tracker.membership().len()
        );

        let mut roles = RoleBook::new();
        let membership = tracker.membership();
        for peer in membership.peers() {
            let after = membership.joined_before(&ack.me, &peer).unwrap_or(false);
            roles.record(peer, policy.link_role(role, after));
        }

        let negotiator = Negotiator::new(
            transports,
            config.ice_servers.clone(),
            stream.clone(),
            steps_tx,
            transport_tx,
            observer.clone(),
        );

        let orchestrator = Self {
            room: config.room.clone(),
            me: ack.me,
            policy,
            role,
            tracker,
            roles,
            table: SessionTable::new(),
            dispatcher: Dispatcher::new(ack.me, channel),
            negotiator,
            reaper: Reaper::new(observer.clone()),
            stream,
            observer,
            left: false,
        };

        (orchestrator, RoomReceivers { steps, transport })
    }

    pub fn me(&self) -> PeerId {
        self.me
    }

    pub fn role(&self) -> SessionRole {
        self.role
    }

    pub fn room(&self) -> &RoomName {
        &self.room
    }

    pub fn table(&self) -> &SessionTable {
        &self.table
    }

    pub fn roles(&self) -> &RoleBook {
        &self.roles
    }

    pub fn tracker(&self) -> &MembershipTracker {
        &self.tracker
    }

    pub fn stream(&self) -> &LocalStream {
        &self.stream
    }

    pub fn links(&self) -> Vec<LinkSnapshot> {
        self.table.snapshot()
    }

    /// Broadcast readiness if our role does that.
    pub async fn announce(&mut self) {
        if !self.policy.announces_readiness(self.role) {
            debug!("{} waits for readiness announcements", self.role);
            return;
        }
        info!("Announcing readiness in '{}'", self.room);
        let result = self
            .dispatcher
            .broadcast(SignalPayload::Join {
                room: self.room.clone(),
            })
            .await;
        self.settle(result).await;
    }

    pub async fn handle(&mut self, input: RoomInput) -> ControlFlow<()> {
        if self.left {
            debug!("Ignoring input after leaving: {:?}", input);
            return ControlFlow::Break(());
        }

        match input {
            RoomInput::Relay(event) => self.on_relay(event).await,
            RoomInput::Step(outcome) => {
                let result = self
                    .negotiator
                    .complete_step(&mut self.table, &self.dispatcher, outcome)
                    .await;
                self.settle(result).await;
            }
            RoomInput::Transport(event) => {
                let result = self
                    .negotiator
                    .on_transport_event(&mut self.table, &self.dispatcher, event)
                    .await;
                self.settle(result).await;
            }
            RoomInput::Command(cmd) => return self.on_command(cmd).await,
        }
        ControlFlow::Continue(())
    }

    /// Reap everything, release local media and leave the relay channel.
    pub async fn leave(&mut self) {
        if self.left {
            return;
        }
        self.left = true;

        self.reaper.reap_all(&mut self.table, &self.stream).await;
        self.dispatcher.channel().unsubscribe().await;
        info!("Left room '{}'", self.room);
    }

    async fn on_command(&mut self, cmd: RoomCommand) -> ControlFlow<()> {
        match cmd {
            RoomCommand::Leave { done } => {
                self.leave().await;
                let _ = done.send(());
                return ControlFlow::Break(());
            }
            RoomCommand::ToggleTrack { kind, reply } => {
                let state = self.stream.toggle(kind);
                info!("Toggled local {}: {:?}", kind, state);
                let _ = reply.send(state);
            }
            RoomCommand::SetTrackEnabled {
                kind,
                enabled,
                reply,
            } => {
                let _ = reply.send(self.stream.set_enabled(kind, enabled));
            }
            RoomCommand::Links { reply } => {
                let _ = reply.send(self.table.snapshot());
            }
        }
        ControlFlow::Continue(())
    }

    async fn on_relay(&mut self, event: RelayEvent) {
        if let RelayEvent::Message { event, payload } = &event {
            self.on_message(event, payload).await;
            return;
        }

        match self.tracker.observe(&event) {
            Some(MembershipEvent::PeerJoined(peer)) => {
                let after = self
                    .tracker
                    .membership()
                    .joined_before(&self.me, &peer)
                    .unwrap_or(true);
                let link_role = self.roles.record(peer, self.policy.link_role(self.role, after));
                debug!("{} toward {}", link_role, peer);
            }
            Some(MembershipEvent::PeerLeft(peer)) => {
                self.roles.forget(&peer);
                self.reaper.reap(&mut self.table, &peer).await;
            }
            Some(MembershipEvent::SelfJoined { .. }) | None => {}
        }
    }

    async fn on_message(&mut self, event: &str, payload: &str) {
        let roles = &self.roles;
        let table = &self.table;
        let inbound = self.dispatcher.route(event, payload, |msg| match &msg.payload {
            SignalPayload::Join { .. } => roles.get(&msg.from) == Some(LinkRole::Initiator),
            SignalPayload::Offer { .. } => roles.get(&msg.from) == Some(LinkRole::Responder),
            SignalPayload::Answer { .. } | SignalPayload::IceCandidate(_) => {
                table.contains(&msg.from)
            }
        });

        let msg = match inbound {
            Inbound::Deliver(msg) => msg,
            Inbound::Discard(reason) => {
                debug!("Discarded '{}': {}", event, reason);
                return;
            }
        };

        let from = msg.from;
        match msg.payload {
            SignalPayload::Join { room } => self.on_ready(from, room).await,
            SignalPayload::Offer { sdp } => self.on_offer(from, SessionDescription::offer(sdp)).await,
            SignalPayload::Answer { sdp } => {
                let result = self
                    .negotiator
                    .apply_answer(&mut self.table, from, SessionDescription::answer(sdp))
                    .await;
                if let Ok(false) = result {
                    debug!("Stale answer from {} discarded", from);
                }
                self.settle(result.map(|_| ())).await;
            }
            SignalPayload::IceCandidate(candidate) => {
                let result = self
                    .negotiator
                    .apply_candidate(&mut self.table, from, candidate)
                    .await;
                if let Ok(CandidateOutcome::Discarded) = result {
                    debug!("Candidate from {} discarded", from);
                }
                self.settle(result.map(|_| ())).await;
            }
        }
    }

    async fn on_ready(&mut self, from: PeerId, room: RoomName) {
        if room != self.room {
            debug!("Readiness from {} for other room '{}'", from, room);
            return;
        }
        if self.roles.get(&from) != Some(LinkRole::Initiator) {
            debug!("Not initiating toward {}", from);
            return;
        }
        if !self.negotiator.start_offer(&mut self.table, from).await {
            debug!("Already linked with {}", from);
        }
    }

    async fn on_offer(&mut self, from: PeerId, offer: SessionDescription) {
        match self.roles.get(&from) {
            Some(LinkRole::Responder) => {
                self.negotiator
                    .accept_offer(&mut self.table, from, offer)
                    .await;
            }
            Some(LinkRole::Initiator) => {
                warn!("Ignoring offer from {}: we initiate toward them", from);
            }
            None => debug!("Offer from unknown peer {}", from),
        }
    }

    /// Route a failure: a broken link is reaped, anything else is a warning.
    async fn settle(&mut self, result: Result<(), RoomError>) {
        let Err(err) = result else {
            return;
        };

        match err.peer() {
            Some(peer) => {
                error!("Link to {} failed: {:?}", peer, err);
                self.observer.on_link_failed(peer, &err).await;
                self.reaper.reap(&mut self.table, &peer).await;
            }
            None => {
                warn!("{:?}", err);
                self.observer.on_warning(&err).await;
            }
        }
    }
}
