//! Process-local document store.
//!
//! Used when no `Dragonfly` instance is configured or reachable, and in
//! tests. Contents live only as long as the process. The store can be
//! switched offline to exercise failure handling in callers.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use crate::backend::KvStore;
use crate::error::StoreError;

/// In-memory key-value store. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
    offline: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_owned()));
        }
        Ok(())
    }
}

impl KvStore for MemoryStore {
    async fn put(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.check_online()?;
        self.entries.write().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn fetch(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_online()?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check_online()?;
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_fetch_remove() {
        let store = MemoryStore::new();
        store.put("k", "v".to_owned()).await.unwrap();
        assert_eq!(store.fetch("k").await.unwrap().as_deref(), Some("v"));
        store.remove("k").await.unwrap();
        assert!(store.fetch("k").await.unwrap().is_none());
        store.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn clones_share_contents() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.put_json("n", &42_u32).await.unwrap();
        assert_eq!(other.get_json::<u32>("n").await.unwrap(), Some(42));
        assert_eq!(other.len().await, 1);
    }

    #[tokio::test]
    async fn offline_store_fails_without_losing_data() {
        let store = MemoryStore::new();
        store.put("k", "v".to_owned()).await.unwrap();
        store.set_offline(true);
        assert!(matches!(store.fetch("k").await, Err(StoreError::Unavailable(_))));
        assert!(store.put("k", "w".to_owned()).await.is_err());
        store.set_offline(false);
        assert_eq!(store.fetch("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn malformed_json_is_a_serialization_error() {
        let store = MemoryStore::new();
        store.put("bad", "{not json".to_owned()).await.unwrap();
        let result = store.get_json::<Vec<u32>>("bad").await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }
}
