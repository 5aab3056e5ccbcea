mod role_book;
mod role_policy;

pub use role_book::*;
pub use role_policy::*;
