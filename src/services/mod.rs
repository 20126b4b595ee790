pub mod admin_auth_service;
pub mod entry_service;

pub use admin_auth_service::*;
pub use entry_service::*;
