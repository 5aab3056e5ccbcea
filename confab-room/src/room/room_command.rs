use crate::session::LinkSnapshot;
use confab_core::TrackKind;
use tokio::sync::oneshot;

/// Requests from a [`RoomHandle`](crate::room::RoomHandle) to the room loop.
#[derive(Debug)]
pub enum RoomCommand {
    /// Tear everything down and stop the loop.
    Leave { done: oneshot::Sender<()> },

    ToggleTrack {
        kind: TrackKind,
        reply: oneshot::Sender<Option<bool>>,
    },

    SetTrackEnabled {
        kind: TrackKind,
        enabled: bool,
        reply: oneshot::Sender<Option<bool>>,
    },

    Links {
        reply: oneshot::Sender<Vec<LinkSnapshot>>,
    },
}
