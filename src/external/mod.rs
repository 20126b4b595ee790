pub mod supabase_auth;

pub use supabase_auth::*;
