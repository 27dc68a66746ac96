//! Application configuration module.
//!
//! Manages the TOML config file holding TMDB request settings
//! (language, region, timeout, API base URL).

#[allow(clippy::module_inception)]
mod config;

#[allow(clippy::module_name_repetitions)]
pub use config::{AppConfig, TmdbConfig};
