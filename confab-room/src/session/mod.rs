mod link_state;
mod peer_link;
mod session_table;

pub use link_state::*;
pub use peer_link::*;
pub use session_table::*;
