//! Persisted key-value collaborator
//!
//! The history is stored as one serialized document under a fixed key. The
//! storage medium is injected through [`KeyValueStore`] so the engine can run
//! against JSON files on disk or an in-memory map in tests.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors raised by a key-value store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid key '{0}'")]
    InvalidKey(String),
}

/// Synchronous string key-value storage
pub trait KeyValueStore: Send + Sync {
    /// Reads the raw document stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replaces the document stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Loads and decodes the document under `key`
///
/// A missing, unreadable or malformed document yields `default` instead of an
/// error; there is no schema migration.
pub fn load_or_default<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str, default: T) -> T {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return default,
        Err(e) => {
            tracing::warn!("Failed to read '{}' from store: {}", key, e);
            return default;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Stored '{}' is not in the expected shape, using default: {}", key, e);
            default
        }
    }
}

/// Encodes `value` as JSON and stores it under `key`
pub fn save<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_yields_default() {
        let store = MemoryStore::new();
        let value: Vec<u32> = load_or_default(&store, "numbers", vec![7]);
        assert_eq!(value, vec![7]);
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        save(&store, "numbers", &vec![1, 2, 3]).unwrap();
        let value: Vec<u32> = load_or_default(&store, "numbers", Vec::new());
        assert_eq!(value, vec![1, 2, 3]);
    }

    #[test]
    fn test_malformed_document_yields_default() {
        let store = MemoryStore::new();
        store.set("numbers", "{\"not\": \"a list\"}").unwrap();
        let value: Vec<u32> = load_or_default(&store, "numbers", Vec::new());
        assert!(value.is_empty());

        store.set("numbers", "definitely not json").unwrap();
        let value: Vec<u32> = load_or_default(&store, "numbers", vec![0]);
        assert_eq!(value, vec![0]);
    }
}
