pub mod allowlist;
pub mod email;
pub mod jwt;
pub mod time;

pub use allowlist::AdminAllowlist;
pub use email::validate_email;
pub use jwt::*;
pub use time::{parse_timestamp, start_of_day, start_of_today};
