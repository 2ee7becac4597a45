//! System configuration types: logging and session storage.

use std::path::PathBuf;

use neonvibe_common::ConfigError;
use serde::{Deserialize, Serialize};

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// `tracing_subscriber` filter directive for the workspace crates.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "neonvibe=debug",
            LogLevel::Info => "neonvibe=info",
            LogLevel::Warning => "neonvibe=warn",
            LogLevel::Error => "neonvibe=error",
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}

/// Session history storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Empty means `<data_dir>/neonvibe/history.json`.
    pub history_file: String,
    /// Oldest records beyond this count are dropped. Valid range: 1-10000.
    pub max_sessions: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_file: String::new(),
            max_sessions: 100,
        }
    }
}

impl StorageConfig {
    pub fn history_path(&self) -> Result<PathBuf, ConfigError> {
        if !self.history_file.trim().is_empty() {
            return Ok(PathBuf::from(self.history_file.trim()));
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| ConfigError::ParseError("could not determine data directory".into()))?;
        Ok(data_dir.join("neonvibe").join("history.json"))
    }
}
