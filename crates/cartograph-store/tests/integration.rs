//! Integration tests for the `cartograph-store` backends.
//!
//! The `Dragonfly` tests require a live instance. Run with:
//!
//! ```bash
//! docker run -d -p 6379:6379 docker.dragonflydb.io/dragonflydb/dragonfly
//! cargo test -p cartograph-store -- --ignored
//! ```
//!
//! Those tests are marked `#[ignore]` so they are skipped during normal
//! `cargo test` runs.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::BTreeMap;

use cartograph_store::{AnyStore, DragonflyStore, KvStore, MemoryStore, StoreError};
use serde::{Deserialize, Serialize};

/// Dragonfly connection URL for the local Docker instance.
const DRAGONFLY_URL: &str = "redis://localhost:6379";

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Document {
    cells: BTreeMap<String, u32>,
    note: String,
}

fn sample_document() -> Document {
    let mut cells = BTreeMap::new();
    cells.insert("0,0".to_owned(), 3);
    cells.insert("-1,4".to_owned(), 7);
    Document {
        cells,
        note: "integration".to_owned(),
    }
}

async fn exercise(store: &impl KvStore, key: &str) {
    let doc = sample_document();
    store.put_json(key, &doc).await.expect("put failed");
    let back: Option<Document> = store.get_json(key).await.expect("get failed");
    assert_eq!(back, Some(doc));

    store.remove(key).await.expect("remove failed");
    let gone: Option<Document> = store.get_json(key).await.expect("get failed");
    assert!(gone.is_none());
}

// =============================================================================
// Memory
// =============================================================================

#[tokio::test]
async fn memory_store_round_trip() {
    exercise(&MemoryStore::new(), "cartograph:test:memory").await;
}

#[tokio::test]
async fn any_store_dispatches_to_memory() {
    let store = AnyStore::Memory(MemoryStore::new());
    assert_eq!(store.backend_name(), "memory");
    exercise(&store, "cartograph:test:any").await;
}

// =============================================================================
// Dragonfly
// =============================================================================

#[tokio::test]
async fn dragonfly_rejects_bad_url() {
    let result = DragonflyStore::connect("not a url").await;
    assert!(matches!(result, Err(StoreError::Config(_))));
}

#[tokio::test]
#[ignore = "requires live Dragonfly instance (docker run dragonfly)"]
async fn dragonfly_round_trip() {
    let store = DragonflyStore::connect(DRAGONFLY_URL)
        .await
        .expect("Failed to connect to Dragonfly");
    exercise(&store, "cartograph:test:dragonfly").await;
    store.disconnect().await.expect("disconnect failed");
}

#[tokio::test]
#[ignore = "requires live Dragonfly instance (docker run dragonfly)"]
async fn dragonfly_missing_key_is_none() {
    let store = DragonflyStore::connect(DRAGONFLY_URL)
        .await
        .expect("Failed to connect to Dragonfly");
    let value = store
        .fetch("cartograph:test:never-written")
        .await
        .expect("fetch failed");
    assert!(value.is_none());
}
