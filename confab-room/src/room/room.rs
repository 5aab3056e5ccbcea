use crate::negotiation::StepOutcome;
use crate::room::{Orchestrator, RoomCommand, RoomInput, RoomReceivers};
use crate::signaling::RelayEvent;
use crate::transport::TransportEvent;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Actor owning one participant's [`Orchestrator`].
pub struct Room {
    orchestrator: Orchestrator,
    command_rx: mpsc::Receiver<RoomCommand>,
    relay_rx: mpsc::UnboundedReceiver<RelayEvent>,
    step_rx: mpsc::Receiver<StepOutcome>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    backlog: Vec<RelayEvent>,
}

impl Room {
    pub fn new(
        orchestrator: Orchestrator,
        receivers: RoomReceivers,
        command_rx: mpsc::Receiver<RoomCommand>,
        relay_rx: mpsc::UnboundedReceiver<RelayEvent>,
        backlog: Vec<RelayEvent>,
    ) -> Self {
        Self {
            orchestrator,
            command_rx,
            relay_rx,
            step_rx: receivers.steps,
            transport_rx: receivers.transport,
            backlog,
        }
    }

    pub async fn run(mut self) {
        info!("Room event loop started");

        for event in std::mem::take(&mut self.backlog) {
            let _ = self.orchestrator.handle(RoomInput::Relay(event)).await;
        }
        self.orchestrator.announce().await;

        loop {
            let input = tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(c) => RoomInput::Command(c),
                    None => {
                        info!("All room handles dropped. Leaving room.");
                        self.orchestrator.leave().await;
                        break;
                    }
                },

                evt = self.relay_rx.recv() => match evt {
                    Some(e) => RoomInput::Relay(e),
                    None => {
                        warn!("Relay subscription closed. Leaving room.");
                        self.orchestrator.leave().await;
                        break;
                    }
                },

                Some(outcome) = self.step_rx.recv() => RoomInput::Step(outcome),

                Some(evt) = self.transport_rx.recv() => RoomInput::Transport(evt),
            };

            if self.orchestrator.handle(input).await.is_break() {
                break;
            }
        }

        info!("Room event loop finished");
    }
}
