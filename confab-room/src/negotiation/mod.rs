mod negotiation_step;
mod negotiator;

pub use negotiation_step::*;
pub use negotiator::*;
