//! The [`Atlas`]: one owner for all exploration and navigation state.
//!
//! The scheduler synchronises itself; the waypoint graph sits behind a
//! `RwLock` so queries from the observer can run alongside each other.
//! Graph accessors return owned copies so no guard escapes this module.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use cartograph_explore::{ExploreError, FrontierScheduler, WorldSampler};
use cartograph_nav::{GraphRoute, NavError, NewRoad, Router, WaypointGraph};
use cartograph_types::{
    AreaScanResult, BlockPos, CellCoordinate, DangerZone, ExplorationTask, ExploredArea,
    NavigationPath, Road, Waypoint, WaypointType,
};
use serde::Serialize;

use crate::config::CartographConfig;
use crate::persistence::SavedState;

/// Explored value at which a cell is suggested as a mine.
pub const MINE_CANDIDATE_VALUE: u64 = 200;

/// Danger level at which a cell is suggested as a hazard marker.
pub const HAZARD_CANDIDATE_LEVEL: u8 = 7;

/// Candidates closer than this to an existing waypoint are not suggested.
pub const CANDIDATE_SPACING: f64 = 32.0;

/// Counts for the status endpoint and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AtlasStatus {
    /// Cells with an explored area.
    pub scanned_cells: usize,
    /// Tasks waiting in the frontier queue.
    pub pending_tasks: usize,
    /// Known resource locations.
    pub resources: usize,
    /// Stored danger zones.
    pub danger_zones: usize,
    /// Waypoints in the graph.
    pub waypoints: usize,
    /// Roads in the graph.
    pub roads: usize,
}

/// A place worth turning into a waypoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateWaypoint {
    /// Cell the suggestion came from.
    pub cell: CellCoordinate,
    /// Suggested position.
    pub position: BlockPos,
    /// Suggested type.
    pub waypoint_type: WaypointType,
    /// Why it was suggested.
    pub reason: String,
}

/// All Cartograph state behind one handle.
#[derive(Debug)]
pub struct Atlas<S> {
    sampler: S,
    scheduler: FrontierScheduler,
    graph: RwLock<WaypointGraph>,
    router: Router,
}

impl<S: WorldSampler> Atlas<S> {
    /// Build an empty atlas from parts.
    pub const fn new(sampler: S, scheduler: FrontierScheduler, router: Router) -> Self {
        Self {
            sampler,
            scheduler,
            graph: RwLock::new(WaypointGraph::new()),
            router,
        }
    }

    /// Build an empty atlas from configuration.
    pub fn from_config(config: &CartographConfig, sampler: S) -> Self {
        let scheduler = FrontierScheduler::new(config.exploration.clone(), config.danger.clone());
        Self::new(sampler, scheduler, Router::new(config.navigation))
    }

    /// The world sampler used for scans.
    pub const fn sampler(&self) -> &S {
        &self.sampler
    }

    /// The frontier scheduler.
    pub const fn scheduler(&self) -> &FrontierScheduler {
        &self.scheduler
    }

    /// The router.
    pub const fn router(&self) -> &Router {
        &self.router
    }

    fn graph(&self) -> RwLockReadGuard<'_, WaypointGraph> {
        self.graph.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn graph_mut(&self) -> RwLockWriteGuard<'_, WaypointGraph> {
        self.graph.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current counts.
    pub fn status(&self) -> AtlasStatus {
        let registry = self.scheduler.registry();
        let graph = self.graph();
        AtlasStatus {
            scanned_cells: registry.scanned_count(),
            pending_tasks: self.scheduler.pending_count(),
            resources: registry.resource_count(),
            danger_zones: registry.danger_zones().len(),
            waypoints: graph.waypoint_count(),
            roads: graph.road_count(),
        }
    }

    // -------------------------------------------------------------------
    // Exploration
    // -------------------------------------------------------------------

    /// Scan the cells around `center`. See
    /// [`FrontierScheduler::request_area_scan`].
    pub async fn scan_area(&self, center: BlockPos, radius: u32) -> Result<AreaScanResult, ExploreError> {
        self.scheduler.request_area_scan(&self.sampler, center, radius).await
    }

    /// Queue unscanned cells around `center`. Returns how many were added.
    ///
    /// # Errors
    ///
    /// See [`FrontierScheduler::schedule_frontier`].
    pub fn schedule_frontier(&self, center: BlockPos, max_radius: u32) -> Result<usize, ExploreError> {
        self.scheduler.schedule_frontier(center, max_radius)
    }

    /// Pop the most urgent task.
    pub fn next_task(&self) -> Option<ExplorationTask> {
        self.scheduler.next_task()
    }

    /// Pop one task and scan its cell.
    pub async fn explore_next(&self) -> Result<Option<AreaScanResult>, ExploreError> {
        self.scheduler.explore_next(&self.sampler).await
    }

    /// The explored area for `cell`, if scanned.
    pub fn area(&self, cell: CellCoordinate) -> Option<ExploredArea> {
        self.scheduler.registry().area(cell)
    }

    /// Stored danger zones, most dangerous first.
    pub fn danger_zones(&self) -> Vec<DangerZone> {
        self.scheduler.registry().danger_zones()
    }

    /// Replace the danger zone of a scanned cell. Returns `false` if the
    /// cell has not been scanned.
    pub fn update_danger(&self, zone: DangerZone) -> bool {
        self.scheduler.registry().update_danger(zone)
    }

    /// Mark the resource at `position` as extracted. Returns `false` if no
    /// resource is known there.
    pub fn mark_extracted(&self, position: BlockPos) -> bool {
        self.scheduler.registry().mark_extracted(position)
    }

    /// Suggest waypoints from what has been explored.
    ///
    /// Structure hints become landmarks, rich cells become mines, and very
    /// dangerous cells become hazard markers. Anything within
    /// [`CANDIDATE_SPACING`] of an existing waypoint (or of an earlier
    /// candidate) is left out.
    pub fn candidate_waypoints(&self) -> Vec<CandidateWaypoint> {
        let snapshot = self.scheduler.registry().snapshot();
        let existing: Vec<BlockPos> = self.graph().waypoints().map(|w| w.position).collect();

        let mut raw = Vec::new();
        for (cell, area) in &snapshot.areas {
            for (hint, position) in &area.structure_hints {
                raw.push(CandidateWaypoint {
                    cell: *cell,
                    position: *position,
                    waypoint_type: WaypointType::Landmark,
                    reason: format!("structure hint {hint}"),
                });
            }
            let total = area.total_resource_value();
            if total < MINE_CANDIDATE_VALUE {
                continue;
            }
            if let Some(richest) = area.resources.iter().max_by_key(|r| r.value) {
                raw.push(CandidateWaypoint {
                    cell: *cell,
                    position: richest.position,
                    waypoint_type: WaypointType::Mine,
                    reason: format!("resources worth {total}"),
                });
            }
        }
        for zone in snapshot.danger.values() {
            if zone.level >= HAZARD_CANDIDATE_LEVEL {
                raw.push(CandidateWaypoint {
                    cell: zone.coordinate,
                    position: zone.coordinate.center(64),
                    waypoint_type: WaypointType::Hazard,
                    reason: format!("danger level {} ({})", zone.level, zone.primary_threat),
                });
            }
        }

        let mut taken = existing;
        let mut candidates = Vec::new();
        for candidate in raw {
            if taken
                .iter()
                .any(|p| p.distance_to(&candidate.position) < CANDIDATE_SPACING)
            {
                continue;
            }
            taken.push(candidate.position);
            candidates.push(candidate);
        }
        candidates
    }

    // -------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------

    /// Add a waypoint.
    pub fn create_waypoint(
        &self,
        name: &str,
        position: BlockPos,
        waypoint_type: WaypointType,
    ) -> Result<Waypoint, NavError> {
        self.graph_mut()
            .create_waypoint(name, position, waypoint_type)
            .cloned()
    }

    /// Add a road.
    pub fn create_road(&self, new_road: NewRoad) -> Result<Road, NavError> {
        self.graph_mut().create_road(new_road).cloned()
    }

    /// Wear a road down one step and return it.
    pub fn degrade_road(&self, id: &str) -> Result<Road, NavError> {
        let mut graph = self.graph_mut();
        graph.degrade_road(id)?;
        graph.road(id).cloned().ok_or_else(|| NavError::UnknownRoad(id.into()))
    }

    /// Mend a road one step and return it.
    pub fn repair_road(&self, id: &str) -> Result<Road, NavError> {
        let mut graph = self.graph_mut();
        graph.repair_road(id)?;
        graph.road(id).cloned().ok_or_else(|| NavError::UnknownRoad(id.into()))
    }

    /// All waypoints in insertion order.
    pub fn waypoints(&self) -> Vec<Waypoint> {
        self.graph().waypoints().cloned().collect()
    }

    /// All roads.
    pub fn roads(&self) -> Vec<Road> {
        self.graph().roads().cloned().collect()
    }

    /// Closest active waypoint, optionally of one type.
    pub fn nearest_waypoint(&self, position: BlockPos, filter: Option<WaypointType>) -> Option<Waypoint> {
        self.graph().nearest_waypoint(position, filter).cloned()
    }

    /// Active waypoints within `radius`, nearest first.
    pub fn waypoints_within_radius(&self, center: BlockPos, radius: f64) -> Vec<Waypoint> {
        self.graph()
            .waypoints_within_radius(center, radius)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Path from `start` to `goal`. Never fails.
    pub fn find_path(&self, start: BlockPos, goal: BlockPos) -> NavigationPath {
        self.router.find_path(&self.graph(), start, goal)
    }

    /// Graph-only route between two named waypoints.
    pub fn graph_route(&self, from: &str, to: &str) -> Option<GraphRoute> {
        self.router.graph_route(&self.graph(), from, to)
    }

    // -------------------------------------------------------------------
    // Persistence glue
    // -------------------------------------------------------------------

    /// Copy everything that is persisted.
    pub fn saved_state(&self) -> SavedState {
        SavedState {
            exploration: self.scheduler.registry().snapshot(),
            graph: self.graph().snapshot(),
        }
    }

    /// Merge saved state into this atlas.
    ///
    /// Explored cells are merged (cells already present win). The graph is
    /// replaced when the saved one is non-empty and valid; an invalid saved
    /// graph is logged and the current graph kept. Returns the number of cells
    /// restored.
    pub fn restore(&self, state: SavedState) -> usize {
        let restored = self.scheduler.registry().restore(state.exploration);
        if state.graph.waypoints.is_empty() && state.graph.roads.is_empty() {
            tracing::info!(cells = restored, "Restored saved state, no saved graph");
            return restored;
        }
        match WaypointGraph::from_snapshot(state.graph) {
            Ok(graph) => {
                tracing::info!(
                    cells = restored,
                    waypoints = graph.waypoint_count(),
                    roads = graph.road_count(),
                    "Restored saved state"
                );
                *self.graph_mut() = graph;
            }
            Err(e) => {
                tracing::warn!(cells = restored, error = %e, "Saved graph is invalid, keeping current graph");
            }
        }
        restored
    }
}
