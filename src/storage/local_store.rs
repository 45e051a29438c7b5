//! Persisted key/value store
//!
//! This module contains the client-local store that keeps the signed-in
//! identity and the seen-example flag between runs. The store is a flat JSON
//! object on disk; an in-memory variant backs tests and throwaway sessions.

use crate::simulation::{StageError, StageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Key holding the serialized signed-in user
pub const USER_KEY: &str = "soapbox-user";

/// Key holding the seen-example flag
pub const SEEN_EXAMPLE_KEY: &str = "soapbox-seen-example";

/// Client-local key/value store
#[derive(Debug, Clone, Default)]
pub struct LocalStore {
    /// Backing file, if persisted
    path: Option<PathBuf>,
    /// Current entries
    entries: BTreeMap<String, String>,
}

impl LocalStore {
    /// Create a store that lives in memory only
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a store backed by a JSON file, creating it lazily on first write
    pub fn open<P: AsRef<Path>>(path: P) -> StageResult<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    StageError::storage_error(format!(
                        "local store {} is not a JSON object: {}",
                        path.display(),
                        e
                    ))
                })?
            }
        } else {
            debug!("Local store {} does not exist yet", path.display());
            BTreeMap::new()
        };

        info!("Opened local store {} with {} entries", path.display(), entries.len());
        Ok(Self { path: Some(path), entries })
    }

    /// Whether writes reach the disk
    pub fn is_persistent(&self) -> bool {
        self.path.is_some()
    }

    /// Read a raw value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Write a raw value and persist
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> StageResult<()> {
        self.entries.insert(key.to_string(), value.into());
        self.flush()
    }

    /// Remove a value and persist, returning the previous value
    pub fn remove(&mut self, key: &str) -> StageResult<Option<String>> {
        let previous = self.entries.remove(key);
        if previous.is_some() {
            self.flush()?;
        }
        Ok(previous)
    }

    /// Read a JSON-encoded value
    ///
    /// A value that no longer decodes is dropped from the store and reported as absent.
    pub fn get_json<T: DeserializeOwned>(&mut self, key: &str) -> StageResult<Option<T>> {
        let Some(raw) = self.entries.get(key) else {
            return Ok(None);
        };

        match serde_json::from_str(raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Discarding unreadable local store entry {}: {}", key, e);
                self.remove(key)?;
                Ok(None)
            }
        }
    }

    /// Write a JSON-encoded value
    pub fn set_json<T: Serialize>(&mut self, key: &str, value: &T) -> StageResult<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, raw)
    }

    /// Whether this client has already watched the example rant
    pub fn has_seen_example(&self) -> bool {
        self.get(SEEN_EXAMPLE_KEY).is_some()
    }

    /// Remember that this client has watched the example rant
    pub fn mark_example_seen(&mut self) -> StageResult<()> {
        self.set(SEEN_EXAMPLE_KEY, "true")
    }

    /// Write the entries to the backing file, if any
    fn flush(&self) -> StageResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(path, content)?;
        debug!("Flushed {} entries to {}", self.entries.len(), path.display());
        Ok(())
    }
}
