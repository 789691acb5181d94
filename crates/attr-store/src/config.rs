// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Table configuration and where it is kept.
//!
//! [`TableConfig`] is stored as JSON under a logical key (usually the graph
//! label). Missing fields take their defaults, and a missing key yields
//! [`TableConfig::default`].

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Settings applied when an [`crate::AttributeTable`] is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Initial vertex capacity.
    pub vertex_capacity: usize,
    /// Initial edge capacity.
    pub edge_capacity: usize,
    /// Mirror every slot write into the undo log.
    pub record_undo: bool,
    /// Maximum number of committed transactions retained for undo.
    pub undo_depth: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            vertex_capacity: 0,
            edge_capacity: 0,
            record_undo: true,
            undo_depth: 256,
        }
    }
}

/// Failure while reading or writing a stored table config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The key cannot name a stored config.
    #[error("invalid config key `{0}`")]
    InvalidKey(String),
    /// Reading or writing the backing file failed.
    #[error("config `{key}` i/o failed: {source}")]
    Io {
        /// Key being accessed.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The stored bytes are not a valid table config.
    #[error("config `{key}` is malformed: {source}")]
    Json {
        /// Key being accessed.
        key: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// Another thread panicked while holding the store.
    #[error("config store lock poisoned")]
    Poisoned,
}

/// Raw byte storage for configs, keyed by logical name.
pub trait ConfigStore {
    /// Reads the bytes stored under `key`, or `None` if nothing is stored.
    ///
    /// # Errors
    /// Returns an error if the backing storage fails.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, ConfigError>;

    /// Replaces the bytes stored under `key`.
    ///
    /// # Errors
    /// Returns an error if the backing storage fails.
    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), ConfigError>;
}

/// In-process config store.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    blobs: Mutex<FxHashMap<String, Vec<u8>>>,
}

impl MemoryConfigStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, ConfigError> {
        let blobs = self.blobs.lock().map_err(|_| ConfigError::Poisoned)?;
        Ok(blobs.get(key).cloned())
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), ConfigError> {
        let mut blobs = self.blobs.lock().map_err(|_| ConfigError::Poisoned)?;
        blobs.insert(key.to_owned(), bytes.to_vec());
        Ok(())
    }
}

/// Stores each config as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct DirConfigStore {
    dir: PathBuf,
}

impl DirConfigStore {
    /// Uses `dir` as the config directory, creating it if needed.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| ConfigError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Directory holding the config files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ConfigError> {
        let plain = key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if key.is_empty() || key.starts_with('.') || !plain {
            return Err(ConfigError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl ConfigStore for DirConfigStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, ConfigError> {
        match fs::read(self.path_for(key)?) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::Io {
                key: key.to_owned(),
                source,
            }),
        }
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), ConfigError> {
        fs::write(self.path_for(key)?, bytes).map_err(|source| ConfigError::Io {
            key: key.to_owned(),
            source,
        })
    }
}

/// Loads and saves [`TableConfig`] values through a [`ConfigStore`].
#[derive(Debug)]
pub struct ConfigService<S> {
    store: S,
}

impl<S: ConfigStore> ConfigService<S> {
    /// Wraps `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Backing store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the backing store.
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Loads the table config stored under `key`.
    ///
    /// A missing key or an empty blob yields the defaults.
    ///
    /// # Errors
    /// Returns an error if the store fails or the stored JSON is malformed.
    pub fn load(&self, key: &str) -> Result<TableConfig, ConfigError> {
        let Some(bytes) = self.store.read(key)?.filter(|bytes| !bytes.is_empty()) else {
            debug!(key, "no stored table config; using defaults");
            return Ok(TableConfig::default());
        };
        serde_json::from_slice(&bytes).map_err(|source| ConfigError::Json {
            key: key.to_owned(),
            source,
        })
    }

    /// Stores `config` under `key` as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    pub fn save(&self, key: &str, config: &TableConfig) -> Result<(), ConfigError> {
        let bytes = serde_json::to_vec_pretty(config).map_err(|source| ConfigError::Json {
            key: key.to_owned(),
            source,
        })?;
        self.store.write(key, &bytes)
    }
}
