use crate::utils::{MockMediaSource, MockTransportFactory, RecordingChannel, RecordingObserver};
use confab_core::{Address, PeerId, RoomName, SignalMessage, SignalPayload, Topology};
use confab_room::{
    LinkSnapshot, Orchestrator, RelayEvent, RoomConfig, RoomInput, RoomReceivers, StepOutcome,
    SubscriptionAck,
};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

pub const ROOM: &str = "lesson";

/// Encode a signaling message the way the relay would deliver it.
pub fn relay_message(msg: &SignalMessage) -> RelayEvent {
    RelayEvent::Message {
        event: msg.kind().event_name().to_string(),
        payload: serde_json::to_string(msg).unwrap(),
    }
}

pub fn ready_from(from: PeerId) -> SignalMessage {
    SignalMessage::new(
        from,
        Address::Broadcast,
        SignalPayload::Join {
            room: RoomName::from(ROOM),
        },
    )
}

/// One participant driven input by input, without a room task.
pub struct Harness {
    pub me: PeerId,
    pub orchestrator: Orchestrator,
    pub channel: Arc<RecordingChannel>,
    pub factory: MockTransportFactory,
    pub observer: RecordingObserver,
    receivers: RoomReceivers,
}

impl Harness {
    pub fn new(topology: Topology, me: PeerId, members: &[PeerId]) -> Self {
        Self::with_factory(topology, me, members, MockTransportFactory::new())
    }

    pub fn with_factory(
        topology: Topology,
        me: PeerId,
        members: &[PeerId],
        factory: MockTransportFactory,
    ) -> Self {
        let config = RoomConfig::new(ROOM, me.to_string()).with_topology(topology);
        let ack = SubscriptionAck {
            me,
            members: members.to_vec(),
            backlog: Vec::new(),
        };
        let channel = Arc::new(RecordingChannel::new());
        let observer = RecordingObserver::new();

        let (orchestrator, receivers) = Orchestrator::new(
            &config,
            &ack,
            channel.clone(),
            MockMediaSource::stream(config.media),
            Arc::new(factory.clone()),
            Arc::new(observer.clone()),
        );

        Self {
            me,
            orchestrator,
            channel,
            factory,
            observer,
            receivers,
        }
    }

    pub async fn relay(&mut self, event: RelayEvent) -> ControlFlow<()> {
        self.orchestrator.handle(RoomInput::Relay(event)).await
    }

    pub async fn deliver(&mut self, msg: &SignalMessage) -> ControlFlow<()> {
        self.relay(relay_message(msg)).await
    }

    /// Wait for the next finished negotiation step without applying it.
    pub async fn next_step(&mut self) -> StepOutcome {
        tokio::time::timeout(Duration::from_secs(2), self.receivers.steps.recv())
            .await
            .expect("no negotiation step finished")
            .expect("step channel closed")
    }

    pub async fn feed_step(&mut self, outcome: StepOutcome) {
        let _ = self.orchestrator.handle(RoomInput::Step(outcome)).await;
    }

    pub async fn complete_next_step(&mut self) {
        let outcome = self.next_step().await;
        self.feed_step(outcome).await;
    }

    /// Apply whatever is queued right now. Returns whether anything was.
    pub async fn pump(&mut self) -> bool {
        let mut progressed = false;
        while let Ok(outcome) = self.receivers.steps.try_recv() {
            self.feed_step(outcome).await;
            progressed = true;
        }
        while let Ok(event) = self.receivers.transport.try_recv() {
            let _ = self.orchestrator.handle(RoomInput::Transport(event)).await;
            progressed = true;
        }
        progressed
    }

    pub fn link(&self, peer: &PeerId) -> Option<LinkSnapshot> {
        self.orchestrator.table().get(peer).map(|l| l.snapshot())
    }
}

/// Several harnesses wired together through an idealised relay.
pub struct Cluster {
    topology: Topology,
    factory: MockTransportFactory,
    pub members: Vec<Harness>,
}

impl Cluster {
    pub fn new(topology: Topology) -> Self {
        Self::with_factory(topology, MockTransportFactory::new())
    }

    pub fn with_factory(topology: Topology, factory: MockTransportFactory) -> Self {
        Self {
            topology,
            factory,
            members: Vec::new(),
        }
    }

    pub fn ids(&self) -> Vec<PeerId> {
        self.members.iter().map(|h| h.me).collect()
    }

    pub fn get(&self, peer: &PeerId) -> &Harness {
        self.members.iter().find(|h| &h.me == peer).unwrap()
    }

    /// Subscribe a new participant and let it announce itself.
    pub async fn join(&mut self) -> PeerId {
        let me = PeerId::new();
        for harness in &mut self.members {
            let _ = harness.relay(RelayEvent::MemberJoined(me)).await;
        }

        let mut list = self.ids();
        list.push(me);
        let mut harness =
            Harness::with_factory(self.topology, me, &list, self.factory.clone());
        harness.orchestrator.announce().await;
        self.members.push(harness);
        me
    }

    pub async fn leave(&mut self, peer: &PeerId) -> Harness {
        let pos = self.members.iter().position(|h| &h.me == peer).unwrap();
        let mut gone = self.members.remove(pos);
        gone.orchestrator.leave().await;
        for harness in &mut self.members {
            let _ = harness.relay(RelayEvent::MemberRemoved(*peer)).await;
        }
        gone
    }

    /// Shuttle messages and completions until nothing moves for a while.
    pub async fn run_until_idle(&mut self) {
        let mut idle_rounds = 0;
        while idle_rounds < 20 {
            let mut progressed = false;

            for i in 0..self.members.len() {
                let outgoing = self.members[i].channel.take_new().await;
                for msg in &outgoing {
                    for (j, harness) in self.members.iter_mut().enumerate() {
                        if j != i {
                            let _ = harness.deliver(msg).await;
                        }
                    }
                }
                progressed |= !outgoing.is_empty();
            }

            for harness in &mut self.members {
                progressed |= harness.pump().await;
            }

            if progressed {
                idle_rounds = 0;
            } else {
                idle_rounds += 1;
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        }
    }
}
