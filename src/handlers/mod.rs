pub mod admin;
pub mod entry;

pub use admin::admin_config;
pub use entry::{admin_entry_config, entry_config};
