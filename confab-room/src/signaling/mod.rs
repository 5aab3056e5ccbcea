mod dispatcher;
mod memory_relay;
mod relay;

pub use dispatcher::*;
pub use memory_relay::*;
pub use relay::*;
