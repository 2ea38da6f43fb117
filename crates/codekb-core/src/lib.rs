//! Application configuration for codekb.

pub mod config;
pub mod secret;

pub use config::Config;
pub use secret::Secret;
