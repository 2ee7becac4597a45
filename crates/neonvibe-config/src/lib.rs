//! NeonVibe configuration system.
//!
//! TOML-based settings for the AI provider, logging and session storage.
//! Every section uses serde defaults so partial configs work out of the
//! box, and a commented template is written on first run.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use neonvibe_config::{load_config, config_to_json};
//!
//! let config = load_config().expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

pub mod schema;
pub mod toml_loader;
pub mod toml_writer;
pub mod validation;

pub use schema::{
    AiConfig, EndpointsConfig, HttpConfig, LogLevel, LoggingConfig, NeonvibeConfig,
    StorageConfig, CONFIG_SCHEMA_VERSION,
};
pub use toml_writer::{save_config, save_config_to_path};

use std::path::Path;

use neonvibe_common::ConfigError;

/// Load config from the platform default path, creating it if missing.
pub fn load_config() -> Result<NeonvibeConfig, ConfigError> {
    toml_loader::load_default()
}

/// Load config from `path` when given, otherwise from the default path.
///
/// An explicit path that does not exist is an error; only the default
/// location is created on demand.
pub fn load_config_from(path: Option<&Path>) -> Result<NeonvibeConfig, ConfigError> {
    match path {
        Some(path) => toml_loader::load_from_path(path),
        None => load_config(),
    }
}

/// Serialize a config to a pretty-printed JSON string, with the API key
/// masked.
pub fn config_to_json(config: &NeonvibeConfig) -> String {
    let mut shown = config.clone();
    if !shown.ai.api_key.is_empty() {
        shown.ai.api_key = "[REDACTED]".into();
    }
    serde_json::to_string_pretty(&shown)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
