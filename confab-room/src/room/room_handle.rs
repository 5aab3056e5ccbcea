use crate::config::RoomConfig;
use crate::error::RoomError;
use crate::membership::await_subscription;
use crate::room::{Orchestrator, Room, RoomCommand, RoomObserver};
use crate::session::LinkSnapshot;
use crate::signaling::{Relay, Subscription};
use crate::transport::{MediaSource, TransportFactory};
use confab_core::{PeerId, RoomName, SessionRole, TrackKind};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

/// Join `config.room` and start its event loop.
///
/// Subscription, capacity and media acquisition failures abort the join and
/// leave the relay channel again.
pub async fn join_room(
    config: RoomConfig,
    relay: &dyn Relay,
    media: &dyn MediaSource,
    transports: Arc<dyn TransportFactory>,
    observer: Arc<dyn RoomObserver>,
) -> Result<RoomHandle, RoomError> {
    config.validate()?;

    let Subscription {
        channel,
        mut events,
    } = relay
        .subscribe(&config.room, &config.user_name)
        .await
        .map_err(RoomError::Subscription)?;

    let ack = match await_subscription(&mut events, &config.room, config.subscribe_timeout()).await
    {
        Ok(ack) => ack,
        Err(e) => {
            channel.unsubscribe().await;
            return Err(e);
        }
    };

    if let Some(capacity) = config.capacity {
        let count = ack.members.iter().filter(|p| **p != ack.me).count() + 1;
        if count > capacity {
            warn!("Room '{}' is full ({}/{})", config.room, count, capacity);
            channel.unsubscribe().await;
            return Err(RoomError::RoomFull {
                room: config.room.clone(),
                capacity,
                count,
            });
        }
    }

    let stream = match media.acquire(config.media).await {
        Ok(stream) => stream,
        Err(e) => {
            channel.unsubscribe().await;
            return Err(RoomError::Acquisition(e));
        }
    };

    let (orchestrator, receivers) =
        Orchestrator::new(&config, &ack, channel, stream, transports, observer);
    let (me, role) = (orchestrator.me(), orchestrator.role());

    let (command_tx, command_rx) = mpsc::channel(config.event_buffer.max(1));
    let room = Room::new(orchestrator, receivers, command_rx, events, ack.backlog);
    tokio::spawn(room.run());

    info!("{} joined '{}' as {}", config.user_name, config.room, role);
    Ok(RoomHandle {
        me,
        role,
        room: config.room,
        command_tx,
    })
}

/// Cloneable control surface of a joined room. Dropping every handle leaves
/// the room.
#[derive(Clone)]
pub struct RoomHandle {
    me: PeerId,
    role: SessionRole,
    room: RoomName,
    command_tx: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn me(&self) -> PeerId {
        self.me
    }

    pub fn role(&self) -> SessionRole {
        self.role
    }

    pub fn room(&self) -> &RoomName {
        &self.room
    }

    /// Leave the room and wait for teardown. Leaving twice is fine.
    pub async fn leave(&self) -> Result<(), RoomError> {
        let (done, rx) = oneshot::channel();
        if self.command_tx.send(RoomCommand::Leave { done }).await.is_err() {
            return Ok(());
        }
        let _ = rx.await;
        Ok(())
    }

    pub async fn toggle_mic(&self) -> Result<Option<bool>, RoomError> {
        self.toggle(TrackKind::Audio).await
    }

    pub async fn toggle_camera(&self) -> Result<Option<bool>, RoomError> {
        self.toggle(TrackKind::Video).await
    }

    pub async fn toggle(&self, kind: TrackKind) -> Result<Option<bool>, RoomError> {
        self.request(|reply| RoomCommand::ToggleTrack { kind, reply })
            .await
    }

    pub async fn set_track_enabled(
        &self,
        kind: TrackKind,
        enabled: bool,
    ) -> Result<Option<bool>, RoomError> {
        self.request(|reply| RoomCommand::SetTrackEnabled {
            kind,
            enabled,
            reply,
        })
        .await
    }

    pub async fn links(&self) -> Result<Vec<LinkSnapshot>, RoomError> {
        self.request(|reply| RoomCommand::Links { reply }).await
    }

    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    /// Resolves once the room loop has stopped.
    pub async fn closed(&self) {
        self.command_tx.closed().await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(make(reply))
            .await
            .map_err(|_| RoomError::RoomClosed)?;
        rx.await.map_err(|_| RoomError::RoomClosed)
    }
}
