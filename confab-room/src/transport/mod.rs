mod media_source;
mod media_transport;
mod transport_event;
mod webrtc_media;
mod webrtc_transport;

pub use media_source::*;
pub use media_transport::*;
pub use transport_event::*;
pub use webrtc_media::*;
pub use webrtc_transport::*;
