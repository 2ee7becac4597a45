//! Session history on disk.
//!
//! One JSON array of [`SessionRecord`]s, newest first. Writes go through a
//! `.tmp` file and a rename so an interrupted save keeps the old history.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use neonvibe_ai::SessionRecord;
use neonvibe_common::{SessionId, StorageError};
use neonvibe_config::StorageConfig;
use tracing::{debug, warn};

pub struct SessionStore {
    path: PathBuf,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>, max_sessions: usize) -> Self {
        Self {
            path: path.into(),
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self, neonvibe_common::ConfigError> {
        Ok(Self::new(config.history_path()?, config.max_sessions as usize))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records, newest first. A missing history file is an empty history.
    pub fn list(&self) -> Result<Vec<SessionRecord>, StorageError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&text).map_err(|e| {
            StorageError::Serialize(format!("failed to parse {}: {e}", self.path.display()))
        })
    }

    pub fn get(&self, id: &SessionId) -> Result<SessionRecord, StorageError> {
        self.list()?
            .into_iter()
            .find(|r| &r.id == id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    /// Replace the record with the same id in place, or insert it first.
    pub fn upsert(&self, record: SessionRecord) -> Result<(), StorageError> {
        let mut records = self.list()?;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => records.insert(0, record),
        }
        if records.len() > self.max_sessions {
            warn!(
                dropped = records.len() - self.max_sessions,
                "Session history full, dropping oldest records"
            );
            records.truncate(self.max_sessions);
        }
        self.write(&records)
    }

    pub fn delete(&self, id: &SessionId) -> Result<(), StorageError> {
        let mut records = self.list()?;
        let before = records.len();
        records.retain(|r| &r.id != id);
        if records.len() == before {
            return Err(StorageError::NotFound(id.to_string()));
        }
        self.write(&records)
    }

    fn write(&self, records: &[SessionRecord]) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| StorageError::Serialize(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err(parent))?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json).map_err(io_err(&tmp_path))?;
        if let Err(e) = std::fs::rename(&tmp_path, &self.path) {
            warn!("atomic rename failed ({}), falling back to direct write", e);
            std::fs::write(&self.path, &json).map_err(io_err(&self.path))?;
        }

        debug!(path = %self.path.display(), sessions = records.len(), "Session history saved");
        Ok(())
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError {
    let path = path.to_path_buf();
    move |source| StorageError::Io { path, source }
}
