pub mod admin;
pub mod common;
pub mod entry;
pub mod pagination;

pub use admin::*;
pub use common::*;
pub use entry::*;
pub use pagination::*;
