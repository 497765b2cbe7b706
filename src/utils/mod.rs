//! Environment variable helpers used by the configuration loader.

pub mod env;

pub use env::get_env_with_prefix;
