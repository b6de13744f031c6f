//! The key-value document store abstraction.
//!
//! Cartograph persists a handful of JSON documents under fixed keys. Any
//! store that can put, fetch, and remove a string value by key will do; the
//! two shipped backends are [`DragonflyStore`](crate::DragonflyStore) and
//! [`MemoryStore`](crate::MemoryStore).

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::dragonfly::DragonflyStore;
use crate::error::StoreError;
use crate::memory::MemoryStore;

/// A string key-value store.
pub trait KvStore: Send + Sync {
    /// Store `value` at `key`, replacing anything already there.
    fn put(&self, key: &str, value: String) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Read the value at `key`, or `None` if the key does not exist.
    fn fetch(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Serialize `value` as JSON and store it at `key`.
    fn put_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        let json = serde_json::to_string(value);
        async move { self.put(key, json?).await }
    }

    /// Read the value at `key` and deserialize it from JSON.
    fn get_json<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<T>, StoreError>> + Send {
        async move {
            match self.fetch(key).await? {
                Some(json) => Ok(Some(serde_json::from_str(&json)?)),
                None => Ok(None),
            }
        }
    }
}

/// A store chosen at runtime.
#[derive(Clone)]
pub enum AnyStore {
    /// `Dragonfly` (Redis-compatible) server.
    Dragonfly(DragonflyStore),
    /// Process-local map.
    Memory(MemoryStore),
}

impl AnyStore {
    /// Short backend name for logs.
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Dragonfly(_) => "dragonfly",
            Self::Memory(_) => "memory",
        }
    }
}

impl KvStore for AnyStore {
    async fn put(&self, key: &str, value: String) -> Result<(), StoreError> {
        match self {
            Self::Dragonfly(store) => store.put(key, value).await,
            Self::Memory(store) => store.put(key, value).await,
        }
    }

    async fn fetch(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            Self::Dragonfly(store) => store.fetch(key).await,
            Self::Memory(store) => store.fetch(key).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match self {
            Self::Dragonfly(store) => store.remove(key).await,
            Self::Memory(store) => store.remove(key).await,
        }
    }
}
