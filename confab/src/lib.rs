pub use confab_core::model::PeerId;

pub mod model {
    pub use confab_core::model::*;
}

#[cfg(feature = "room")]
pub mod room {
    pub use confab_room::*;
}
