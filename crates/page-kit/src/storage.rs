//! Storage Utilities
//!
//! JSON values in a synchronous string key-value store (`localStorage` in
//! the browser). Failures are logged and turned into `false` or the caller's
//! default; they never reach the caller as errors.

#[cfg(any(test, feature = "testing"))]
use std::cell::RefCell;
#[cfg(any(test, feature = "testing"))]
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,
    #[error("storage quota exceeded")]
    QuotaExceeded,
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("failed to serialize value: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to parse stored value: {0}")]
    Deserialize(#[source] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Raw string store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// `window.localStorage`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStore;

impl BrowserStore {
    fn storage(&self) -> StorageResult<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StorageError::Unavailable)
    }
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.storage()?
            .get_item(key)
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))
    }
}

/// In-memory store with an optional size quota (sum of key and value bytes)
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    quota: Option<usize>,
}

#[cfg(any(test, feature = "testing"))]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: RefCell::default(),
            quota: Some(quota),
        }
    }

    fn used_without(&self, key: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

#[cfg(any(test, feature = "testing"))]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(quota) = self.quota {
            if self.used_without(key) + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// JSON-encoding wrapper over a `KeyValueStore`
#[derive(Debug, Default)]
pub struct JsonStorage<S> {
    store: S,
}

impl<S: KeyValueStore> JsonStorage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Store `value` as JSON. Returns false if it could not be saved.
    pub fn set_item<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let saved = serde_json::to_string(value)
            .map_err(StorageError::Serialize)
            .and_then(|json| self.store.set(key, &json));
        match saved {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Error saving to localStorage: {}", e);
                false
            }
        }
    }

    /// Read and decode `key`, or `default` when missing or unreadable
    pub fn get_item<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let loaded = self.store.get(key).and_then(|raw| match raw {
            Some(raw) if !raw.is_empty() => serde_json::from_str(&raw)
                .map(Some)
                .map_err(StorageError::Deserialize),
            _ => Ok(None),
        });
        match loaded {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                tracing::error!("Error reading from localStorage: {}", e);
                default
            }
        }
    }

    pub fn remove_item(&self, key: &str) -> bool {
        match self.store.remove(key) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Error removing from localStorage: {}", e);
                false
            }
        }
    }
}

impl JsonStorage<BrowserStore> {
    pub fn local() -> Self {
        Self::new(BrowserStore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::{json, Value};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Prefs {
        theme: String,
        visits: u32,
    }

    #[test]
    fn test_set_then_get() {
        let storage = JsonStorage::new(MemoryStore::new());

        assert!(storage.set_item("k", &json!({ "a": 1 })));
        assert_eq!(storage.get_item("k", Value::Null), json!({ "a": 1 }));
        assert_eq!(storage.store().get("k").unwrap().as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_get_missing_returns_default() {
        let storage = JsonStorage::new(MemoryStore::new());
        assert_eq!(storage.get_item("missing", "fallback".to_string()), "fallback");
    }

    #[test]
    fn test_typed_round_trip_and_remove() {
        let storage = JsonStorage::new(MemoryStore::new());
        let prefs = Prefs {
            theme: "dark".to_string(),
            visits: 3,
        };

        assert!(storage.set_item("prefs", &prefs));
        assert_eq!(storage.get_item::<Option<Prefs>>("prefs", None), Some(prefs));
        assert!(storage.remove_item("prefs"));
        assert_eq!(storage.get_item::<Option<Prefs>>("prefs", None), None);
    }

    #[test]
    fn test_malformed_value_returns_default() {
        let storage = JsonStorage::new(MemoryStore::new());
        storage.store().set("broken", "{not json").unwrap();

        assert_eq!(storage.get_item("broken", 7u32), 7);
    }

    #[test]
    fn test_quota_exceeded_returns_false() {
        let storage = JsonStorage::new(MemoryStore::with_quota(16));

        assert!(storage.set_item("a", "short"));
        assert!(!storage.set_item("b", "this value is far too long"));
        assert_eq!(storage.get_item("b", String::new()), "");
    }
}
