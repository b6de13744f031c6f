//! Save and restore an atlas through the in-memory store.

#![allow(clippy::unwrap_used)]

use cartograph_core::{Atlas, CartographConfig, StateStore};
use cartograph_explore::SeededTerrain;
use cartograph_nav::NewRoad;
use cartograph_store::{KvStore, MemoryStore};
use cartograph_types::{BlockPos, RoadType, WaypointType};

fn atlas() -> Atlas<SeededTerrain> {
    Atlas::from_config(
        &CartographConfig::default(),
        SeededTerrain::new(99).with_height_range(0, 12),
    )
}

#[tokio::test]
async fn state_survives_a_restart() {
    let store = MemoryStore::new();
    let before = atlas();
    before.scan_area(BlockPos::new(0, 8, 0), 24).await.unwrap();
    before.create_waypoint("Home", BlockPos::new(0, 8, 0), WaypointType::Home).unwrap();
    before.create_waypoint("Mill", BlockPos::new(30, 8, 40), WaypointType::Farm).unwrap();
    before.create_road(NewRoad::new("lane", "Home", "Mill", RoadType::Trail)).unwrap();

    assert!(StateStore::new(store.clone()).save(&before.saved_state()).await);

    let after = atlas();
    let loaded = StateStore::new(store).load().await;
    after.restore(loaded);

    assert_eq!(after.status(), before.status());
    assert_eq!(after.waypoints(), before.waypoints());
    let road = after.roads().into_iter().next().unwrap();
    assert!((road.distance - 50.0).abs() < 1e-9);

    let path = after.find_path(BlockPos::new(0, 8, 0), BlockPos::new(30, 8, 40));
    assert_eq!(path.points().len(), 2);
}

#[tokio::test]
async fn failed_save_leaves_memory_untouched() {
    let store = MemoryStore::new();
    let states = StateStore::new(store.clone());
    let atlas = atlas();
    atlas.scan_area(BlockPos::new(0, 8, 0), 0).await.unwrap();

    store.set_offline(true);
    assert!(!states.save(&atlas.saved_state()).await);
    assert_eq!(atlas.status().scanned_cells, 1);

    store.set_offline(false);
    assert!(states.save(&atlas.saved_state()).await);
    assert!(store.fetch("cartograph:cells").await.unwrap().is_some());
}

#[tokio::test]
async fn invalid_graph_document_keeps_current_graph() {
    let store = MemoryStore::new();
    store
        .put(
            "cartograph:graph",
            r#"{"waypoints":{},"roads":{"r":{"id":"r","endpoint_a":"X","endpoint_b":"Y","road_type":"trail","condition":"good","control_points":[],"distance":1.0,"usage_count":0,"bidirectional":true,"created_at":"2026-01-01T00:00:00Z"}}}"#
                .to_owned(),
        )
        .await
        .unwrap();

    let atlas = atlas();
    atlas.create_waypoint("Keep", BlockPos::new(1, 1, 1), WaypointType::Custom).unwrap();
    atlas.restore(StateStore::new(store).load().await);
    assert_eq!(atlas.waypoints().len(), 1);
}
