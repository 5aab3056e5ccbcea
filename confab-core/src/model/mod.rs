mod media;
mod peer;
mod role;
mod room;
mod signaling;

pub use media::{MediaConstraints, RemoteTrack, TrackKind, VideoConstraints};
pub use peer::PeerId;
pub use role::{LinkRole, SessionRole, Topology};
pub use room::RoomName;
pub use signaling::{
    Address, IceCandidate, IceServerConfig, SdpKind, SessionDescription, SignalKind,
    SignalMessage, SignalPayload,
};
