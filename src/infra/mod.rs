pub mod backend;
pub mod config;
pub mod logging;
pub mod supabase;
