//! Durable key-value persistence for cart & checkout state.
//!
//! The storefront client persisted its state in browser `localStorage`; this
//! module is that storage surface as an explicit port. State lives under
//! named keys as JSON, survives restarts, and is scoped to one profile
//! directory. Reads never fail: absent or malformed data is indistinguishable
//! from "nothing persisted yet" and yields `None`.
//!
//! Two implementations are provided:
//!
//! - [`JsonFileStore`] - one JSON file per key under a profile directory
//! - [`MemoryStore`] - `HashMap`-backed, for tests and ephemeral sessions

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Logical storage keys used by the cart & checkout core.
pub mod keys {
    /// Key for the cart line items (JSON array).
    pub const CART_ITEMS: &str = "cartItems";

    /// Key for the active buy-now item.
    pub const DIRECT_BUY_ITEM: &str = "directBuyItem";

    /// Key for a buy-now intent stashed across a login redirect.
    pub const PENDING_DIRECT_BUY_ITEM: &str = "pendingDirectBuyItem";
}

/// Errors that can occur when writing persisted state.
///
/// Reads are infallible by design; only writes surface errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Writing the value to disk failed.
    #[error("failed to write key {key:?}: {source}")]
    Write {
        /// The logical key being written.
        key: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Serializing the value to JSON failed.
    #[error("failed to serialize key {key:?}: {source}")]
    Serialize {
        /// The logical key being written.
        key: String,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

/// Durable per-profile storage of JSON values under named keys.
///
/// The typed [`get`](Self::get) and [`set`](Self::set) helpers are the
/// intended API; `get_raw`/`set_raw` exist so implementations only deal in
/// strings.
pub trait KeyValueStore {
    /// Read the raw JSON stored under `key`, if any.
    fn get_raw(&self, key: &str) -> Option<String>;

    /// Write raw JSON under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the value cannot be stored.
    fn set_raw(&mut self, key: &str, value: String) -> Result<(), StorageError>;

    /// Delete the value stored under `key`. Deleting an absent key is a no-op.
    fn remove(&mut self, key: &str);

    /// Read and deserialize the value stored under `key`.
    ///
    /// Absent and malformed values both yield `None`; a corrupt record is
    /// treated exactly like nothing was ever persisted.
    fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T>
    where
        Self: Sized,
    {
        let raw = self.get_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding malformed persisted value");
                None
            }
        }
    }

    /// Serialize and write `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if serialization or the write fails.
    fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StorageError>
    where
        Self: Sized,
    {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
            key: key.to_owned(),
            source,
        })?;
        self.set_raw(key, raw)
    }
}

/// File-backed store: one `<key>.json` file per key under a profile directory.
///
/// The directory is created lazily on first write, so constructing the store
/// never touches the filesystem.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_raw(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Some(raw),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read persisted value");
                None
            }
        }
    }

    fn set_raw(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Write {
            key: key.to_owned(),
            source,
        })?;
        fs::write(self.path_for(key), value).map_err(|source| StorageError::Write {
            key: key.to_owned(),
            source,
        })
    }

    fn remove(&mut self, key: &str) {
        if let Err(e) = fs::remove_file(self.path_for(key))
            && e.kind() != ErrorKind::NotFound
        {
            tracing::warn!(key, error = %e, "failed to delete persisted value");
        }
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any value is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set_raw(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}
