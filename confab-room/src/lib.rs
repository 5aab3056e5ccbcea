mod config;
mod error;
pub mod lifecycle;
pub mod membership;
pub mod negotiation;
pub mod role;
pub mod room;
pub mod session;
pub mod signaling;
pub mod transport;

pub use config::*;
pub use error::*;
pub use lifecycle::*;
pub use membership::*;
pub use negotiation::*;
pub use role::*;
pub use room::*;
pub use session::*;
pub use signaling::*;
pub use transport::*;
