//! Snapshot persistence over a [`KvStore`].
//!
//! State is saved as four JSON documents under fixed keys:
//!
//! | Key | Document |
//! |-----|----------|
//! | `cartograph:cells` | `"cx,cz"` -> explored area |
//! | `cartograph:resources` | `"x,y,z"` -> resource location |
//! | `cartograph:danger` | `"cx,cz"` -> danger zone |
//! | `cartograph:graph` | waypoints by name, roads by id |
//!
//! Loading never fails: a missing document is empty, an unreadable one is
//! logged and treated as empty. Saving reports failure with an error log
//! and a `false` return; the caller's in-memory state is untouched either
//! way.

use std::collections::BTreeMap;

use cartograph_explore::ExplorationSnapshot;
use cartograph_nav::GraphSnapshot;
use cartograph_store::{KvStore, StoreError};
use cartograph_types::{CellCoordinate, DangerZone, ExploredArea, ResourceLocation};
use serde::de::DeserializeOwned;

/// Key of the explored-cells document.
pub const CELLS_KEY: &str = "cartograph:cells";

/// Key of the resources document.
pub const RESOURCES_KEY: &str = "cartograph:resources";

/// Key of the danger-zones document.
pub const DANGER_KEY: &str = "cartograph:danger";

/// Key of the waypoint graph document.
pub const GRAPH_KEY: &str = "cartograph:graph";

/// Everything Cartograph persists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavedState {
    /// Explored cells, resources, and danger zones.
    pub exploration: ExplorationSnapshot,
    /// Waypoints and roads.
    pub graph: GraphSnapshot,
}

impl SavedState {
    /// Whether there is nothing to restore.
    pub fn is_empty(&self) -> bool {
        self.exploration.areas.is_empty()
            && self.exploration.resources.is_empty()
            && self.exploration.danger.is_empty()
            && self.graph.waypoints.is_empty()
            && self.graph.roads.is_empty()
    }
}

/// Reads and writes [`SavedState`] through a key-value store.
#[derive(Debug, Clone)]
pub struct StateStore<S> {
    store: S,
}

impl<S: KvStore> StateStore<S> {
    /// Wrap a store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Load every document. Unreadable documents come back empty.
    pub async fn load(&self) -> SavedState {
        let areas: BTreeMap<CellCoordinate, ExploredArea> = self.load_document(CELLS_KEY).await;
        let resources: BTreeMap<String, ResourceLocation> = self.load_document(RESOURCES_KEY).await;
        let danger: BTreeMap<CellCoordinate, DangerZone> = self.load_document(DANGER_KEY).await;
        let graph: GraphSnapshot = self.load_document(GRAPH_KEY).await;

        // Resources are keyed by their own position; the document key is
        // only a readable label.
        let resources = resources
            .into_values()
            .map(|resource| (resource.position, resource))
            .collect();

        let state = SavedState {
            exploration: ExplorationSnapshot {
                areas,
                resources,
                danger,
            },
            graph,
        };
        tracing::info!(
            cells = state.exploration.areas.len(),
            resources = state.exploration.resources.len(),
            danger_zones = state.exploration.danger.len(),
            waypoints = state.graph.waypoints.len(),
            roads = state.graph.roads.len(),
            "Loaded saved state"
        );
        state
    }

    async fn load_document<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.store.get_json::<T>(key).await {
            Ok(Some(document)) => document,
            Ok(None) => {
                tracing::debug!(key, "No saved document");
                T::default()
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to load saved document, starting empty");
                T::default()
            }
        }
    }

    /// Save every document. Returns `false` (after logging) if any write
    /// failed.
    pub async fn save(&self, state: &SavedState) -> bool {
        match self.try_save(state).await {
            Ok(()) => {
                tracing::debug!(
                    cells = state.exploration.areas.len(),
                    waypoints = state.graph.waypoints.len(),
                    "Saved state"
                );
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to save state");
                false
            }
        }
    }

    async fn try_save(&self, state: &SavedState) -> Result<(), StoreError> {
        let resources: BTreeMap<String, &ResourceLocation> = state
            .exploration
            .resources
            .values()
            .map(|resource| (resource.position.to_string(), resource))
            .collect();

        self.store.put_json(CELLS_KEY, &state.exploration.areas).await?;
        self.store.put_json(RESOURCES_KEY, &resources).await?;
        self.store.put_json(DANGER_KEY, &state.exploration.danger).await?;
        self.store.put_json(GRAPH_KEY, &state.graph).await?;
        Ok(())
    }
}
