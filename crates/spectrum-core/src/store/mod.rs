//! Flat key-value persistence for user-scoped client state.
//!
//! Credentials, the active provider set, query history and the synthesis
//! flag are all stored under fixed string keys. State is loaded once at
//! session start and written through on every mutation.
//!
//! Backends:
//! - [`SqliteStore`]: single `kv` table in a SQLite file (feature `db`)
//! - [`MemoryStore`]: process-local map, used by tests and dry runs

#[cfg(feature = "db")]
mod sqlite;

#[cfg(feature = "db")]
pub use sqlite::SqliteStore;

use crate::error::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Fixed storage keys.
pub mod keys {
    pub const ACTIVE_PROVIDERS: &str = "active-models";
    pub const QUERY_HISTORY: &str = "query-history";
    pub const ENABLE_SUMMARY: &str = "enable-summary";

    pub const CREDENTIAL_SUFFIX: &str = "-key";
    pub const SUB_MODEL_SUFFIX: &str = "-model";

    pub fn credential(provider: &str) -> String {
        format!("{provider}{CREDENTIAL_SUFFIX}")
    }

    pub fn sub_model(provider: &str) -> String {
        format!("{provider}{SUB_MODEL_SUFFIX}")
    }
}

/// Storage backend for string values under string keys.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or replace a value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<()>;

    /// All stored keys, sorted.
    fn keys(&self) -> Result<Vec<String>>;
}

/// Read and decode a JSON value.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode and write a JSON value.
pub fn save_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// In-memory store.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| Error::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| Error::LockPoisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| Error::LockPoisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = self.entries.lock().map_err(|_| Error::LockPoisoned)?;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
