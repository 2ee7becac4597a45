//! Configuration schema.
//!
//! Every struct is `#[serde(default)]`, so a config file only needs the
//! keys it wants to change.

mod ai;
mod system;

pub use ai::{AiConfig, EndpointsConfig, HttpConfig};
pub use system::{LogLevel, LoggingConfig, StorageConfig};

use serde::{Deserialize, Serialize};

/// Bumped whenever a config key changes meaning.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NeonvibeConfig {
    pub ai: AiConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
}
