//! `Dragonfly` (Redis-compatible) document store.
//!
//! # Key Patterns
//!
//! | Key | Type | Description |
//! |-----|------|-------------|
//! | `cartograph:cells` | JSON | Explored areas keyed by `"cx,cz"` |
//! | `cartograph:resources` | JSON | Resources keyed by `"x,y,z"` |
//! | `cartograph:danger` | JSON | Danger zones keyed by `"cx,cz"` |
//! | `cartograph:graph` | JSON | Waypoints by name, roads by id |

use fred::prelude::*;

use crate::backend::KvStore;
use crate::error::StoreError;

/// Connection handle to a `Dragonfly` (Redis-compatible) instance.
///
/// Wraps a [`fred::prelude::Client`]; cloning shares the connection.
#[derive(Clone)]
pub struct DragonflyStore {
    client: Client,
}

impl DragonflyStore {
    /// Connect to `Dragonfly` at the given URL.
    ///
    /// The URL should follow the Redis URL scheme:
    /// `redis://host:port` or `redis://host:port/db`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the URL cannot be parsed.
    /// Returns [`StoreError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let config = Config::from_url(url)
            .map_err(|e| StoreError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!("Connected to Dragonfly");
        Ok(Self { client })
    }

    /// Close the connection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Dragonfly`] if the server rejects `QUIT`.
    pub async fn disconnect(&self) -> Result<(), StoreError> {
        self.client.quit().await?;
        Ok(())
    }
}

impl KvStore for DragonflyStore {
    async fn put(&self, key: &str, value: String) -> Result<(), StoreError> {
        let _: () = self.client.set(key, value.as_str(), None, None, false).await?;
        Ok(())
    }

    async fn fetch(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value: Option<String> = self.client.get(key).await?;
        Ok(value)
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _: u32 = self.client.del(key).await?;
        Ok(())
    }
}
