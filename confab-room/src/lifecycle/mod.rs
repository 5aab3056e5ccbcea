mod reaper;

pub use reaper::*;
