//! Periodic state snapshots.

use std::sync::Arc;
use std::time::Duration;

use cartograph_core::{Atlas, StateStore};
use cartograph_explore::WorldSampler;
use cartograph_store::KvStore;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Save the atlas once. Returns whether the save succeeded.
pub async fn save_now<S: WorldSampler, K: KvStore>(atlas: &Atlas<S>, states: &StateStore<K>) -> bool {
    states.save(&atlas.saved_state()).await
}

/// Save every `every` until `shutdown` flips. The first save happens one
/// interval after start.
pub async fn run_snapshots<S: WorldSampler, K: KvStore>(
    atlas: Arc<Atlas<S>>,
    states: StateStore<K>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let every = every.max(Duration::from_secs(1));
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                let status = atlas.status();
                if save_now(&atlas, &states).await {
                    tracing::debug!(cells = status.scanned_cells, waypoints = status.waypoints, "Snapshot saved");
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cartograph_core::CartographConfig;
    use cartograph_explore::SeededTerrain;
    use cartograph_store::MemoryStore;
    use cartograph_types::BlockPos;

    use super::*;

    #[tokio::test]
    async fn save_now_writes_every_document() {
        let atlas = Atlas::from_config(
            &CartographConfig::default(),
            SeededTerrain::new(8).with_height_range(0, 4),
        );
        atlas.scan_area(BlockPos::new(0, 2, 0), 0).await.unwrap();

        let store = MemoryStore::new();
        let states = StateStore::new(store.clone());
        assert!(save_now(&atlas, &states).await);
        assert_eq!(store.len().await, 4);

        let restored = Atlas::from_config(
            &CartographConfig::default(),
            SeededTerrain::new(8).with_height_range(0, 4),
        );
        assert_eq!(restored.restore(states.load().await), 1);
    }

    #[tokio::test]
    async fn snapshot_loop_stops_on_shutdown() {
        let atlas = Arc::new(Atlas::from_config(
            &CartographConfig::default(),
            SeededTerrain::new(8).with_height_range(0, 4),
        ));
        let states = StateStore::new(MemoryStore::new());
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(run_snapshots(atlas, states, Duration::from_secs(60), rx));

        tx.send(true).unwrap();
        let stopped = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(matches!(stopped, Ok(Ok(()))));
    }
}
