//! Persistent key-value configuration store
//!
//! Settings live in a flat, human-readable JSON document loaded at
//! construction and rewritten on every [`ConfigStore::set`]. The store is an
//! explicit handle that callers construct and inject; there is no
//! process-wide singleton.
//!
//! ## Recognized keys
//!
//! | Key               | Default     | Meaning                               |
//! |-------------------|-------------|---------------------------------------|
//! | `backup_root`     | `"backups"` | Directory artifacts are created under |
//! | `default_version` | `""`        | Version token used when none given    |
//! | `compress`        | `false`     | Archive mode unless overridden        |

use crate::error::{Result, SnapdirError};
use crate::utils;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Key for the backup root setting
pub const KEY_BACKUP_ROOT: &str = "backup_root";
/// Key for the persisted version token
pub const KEY_DEFAULT_VERSION: &str = "default_version";
/// Key for the compression flag
pub const KEY_COMPRESS: &str = "compress";

/// Default backup root when nothing is configured
pub const DEFAULT_BACKUP_ROOT: &str = "backups";

fn default_document() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(
        KEY_BACKUP_ROOT.to_string(),
        Value::String(DEFAULT_BACKUP_ROOT.to_string()),
    );
    map.insert(KEY_DEFAULT_VERSION.to_string(), Value::String(String::new()));
    map.insert(KEY_COMPRESS.to_string(), Value::Bool(false));
    map
}

/// Durable store for a small set of named settings
///
/// First use against a missing backing file writes the defaults before
/// loading, so reads never depend on a prior explicit write.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    data: Map<String, Value>,
}

impl ConfigStore {
    /// Open the store at `path`, creating it with defaults if absent
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            debug!(path = %path.display(), "Config file absent, writing defaults");
            let defaults = default_document();
            write_document(&path, &defaults)?;
            return Ok(Self {
                path,
                data: defaults,
            });
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| SnapdirError::config_access(&path, e.to_string()))?;
        let data: Map<String, Value> = serde_json::from_str(&content)
            .map_err(|e| SnapdirError::config_access(&path, e.to_string()))?;

        Ok(Self { path, data })
    }

    /// Get a string value, or `fallback` if absent or not a string
    pub fn get_str(&self, key: &str, fallback: &str) -> String {
        self.data
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(fallback)
            .to_string()
    }

    /// Get a boolean value, or `fallback` if absent or not a boolean
    pub fn get_bool(&self, key: &str, fallback: bool) -> bool {
        self.data.get(key).and_then(Value::as_bool).unwrap_or(fallback)
    }

    /// Set a value and persist the whole document before returning
    ///
    /// The write is atomic (temp file + rename); a failed write surfaces as
    /// [`SnapdirError::ConfigAccess`] and leaves the in-memory state as it
    /// was before the call.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let mut updated = self.data.clone();
        updated.insert(key.to_string(), value);
        write_document(&self.path, &updated)?;
        self.data = updated;
        Ok(())
    }
}

fn write_document(path: &Path, data: &Map<String, Value>) -> Result<()> {
    let json = serde_json::to_string_pretty(&Value::Object(data.clone()))?;
    utils::atomic_write(path, json.as_bytes())
        .map_err(|e| SnapdirError::config_access(path, e.to_string()))
}
