mod membership_event;
mod membership_tracker;
mod room_membership;
mod subscription;

pub use membership_event::*;
pub use membership_tracker::*;
pub use room_membership::*;
pub use subscription::*;
