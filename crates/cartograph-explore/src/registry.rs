//! The scanned-cell registry.
//!
//! [`ExplorationRegistry`] owns every exploration record: explored areas,
//! the resource index, and danger zones. All access goes through one mutex
//! so that the membership check and the insert for a cell happen as a single
//! step.
//!
//! Scanning a cell is a three-phase protocol:
//!
//! 1. [`ExplorationRegistry::try_claim`] atomically checks that the cell is
//!    neither scanned nor being scanned, and marks it in flight.
//! 2. The caller scans the cell without holding the lock.
//! 3. [`CellClaim::commit`] inserts the results and clears the in-flight mark
//!    in one step. Dropping an uncommitted claim releases the cell so a later
//!    request can retry it.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use cartograph_types::{BlockPos, CellCoordinate, DangerZone, ExploredArea, ResourceLocation};
use serde::{Deserialize, Serialize};

/// Everything guarded by the registry lock.
#[derive(Debug, Default)]
struct RegistryState {
    areas: BTreeMap<CellCoordinate, ExploredArea>,
    in_flight: BTreeSet<CellCoordinate>,
    resources: BTreeMap<BlockPos, ResourceLocation>,
    danger: BTreeMap<CellCoordinate, DangerZone>,
}

/// Result of trying to claim a cell for scanning.
#[derive(Debug)]
pub enum ClaimOutcome<'a> {
    /// The caller owns the cell until the claim is committed or dropped.
    Claimed(CellClaim<'a>),
    /// The cell already has an explored area.
    AlreadyScanned,
    /// Another request is scanning the cell right now.
    InFlight,
}

/// Exclusive right to scan one cell.
#[derive(Debug)]
pub struct CellClaim<'a> {
    registry: &'a ExplorationRegistry,
    cell: CellCoordinate,
    committed: bool,
}

impl CellClaim<'_> {
    /// The claimed cell.
    pub const fn cell(&self) -> CellCoordinate {
        self.cell
    }

    /// Record the scan results and release the claim in one step.
    ///
    /// The area's coordinate is forced to the claimed cell.
    pub fn commit(mut self, mut area: ExploredArea, danger: Option<DangerZone>) {
        area.coordinate = self.cell;
        let mut state = self.registry.lock();
        for resource in &area.resources {
            state.resources.insert(resource.position, resource.clone());
        }
        if let Some(zone) = danger {
            state.danger.insert(self.cell, zone);
        }
        state.areas.insert(self.cell, area);
        state.in_flight.remove(&self.cell);
        self.committed = true;
    }
}

impl Drop for CellClaim<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.registry.lock().in_flight.remove(&self.cell);
            tracing::debug!(cell = %self.cell, "Cell claim released without commit");
        }
    }
}

/// Serializable copy of the registry contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorationSnapshot {
    /// Explored areas by cell.
    pub areas: BTreeMap<CellCoordinate, ExploredArea>,
    /// Resources by position.
    pub resources: BTreeMap<BlockPos, ResourceLocation>,
    /// Danger zones by cell.
    pub danger: BTreeMap<CellCoordinate, DangerZone>,
}

/// Shared store of exploration results.
#[derive(Debug, Default)]
pub struct ExplorationRegistry {
    state: Mutex<RegistryState>,
}

impl ExplorationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the state. A poisoned lock is recovered: every mutation is a
    /// single insert or remove, so the maps are never left half-written.
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically check and claim a cell for scanning.
    pub fn try_claim(&self, cell: CellCoordinate) -> ClaimOutcome<'_> {
        let mut state = self.lock();
        if state.areas.contains_key(&cell) {
            return ClaimOutcome::AlreadyScanned;
        }
        if !state.in_flight.insert(cell) {
            return ClaimOutcome::InFlight;
        }
        drop(state);
        ClaimOutcome::Claimed(CellClaim {
            registry: self,
            cell,
            committed: false,
        })
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Whether the cell has been scanned.
    pub fn is_scanned(&self, cell: CellCoordinate) -> bool {
        self.lock().areas.contains_key(&cell)
    }

    /// Number of scanned cells.
    pub fn scanned_count(&self) -> usize {
        self.lock().areas.len()
    }

    /// A copy of the explored area for `cell`.
    pub fn area(&self, cell: CellCoordinate) -> Option<ExploredArea> {
        self.lock().areas.get(&cell).cloned()
    }

    /// Whether any scanned 8-connected neighbour of `cell` holds a resource.
    pub fn neighbor_has_resources(&self, cell: CellCoordinate) -> bool {
        let state = self.lock();
        cell.neighbors()
            .iter()
            .filter_map(|n| state.areas.get(n))
            .any(ExploredArea::has_resources)
    }

    /// Danger zone for `cell`, if one was stored.
    pub fn danger_zone(&self, cell: CellCoordinate) -> Option<DangerZone> {
        self.lock().danger.get(&cell).cloned()
    }

    /// All stored danger zones, highest level first.
    pub fn danger_zones(&self) -> Vec<DangerZone> {
        let mut zones: Vec<DangerZone> = self.lock().danger.values().cloned().collect();
        zones.sort_by(|a, b| b.level.cmp(&a.level).then(a.coordinate.cmp(&b.coordinate)));
        zones
    }

    /// Number of indexed resources.
    pub fn resource_count(&self) -> usize {
        self.lock().resources.len()
    }

    /// Unextracted resources within `radius` blocks of `center`, nearest first.
    pub fn resources_near(&self, center: BlockPos, radius: f64) -> Vec<ResourceLocation> {
        let state = self.lock();
        let mut found: Vec<(f64, ResourceLocation)> = state
            .resources
            .values()
            .filter(|r| !r.extracted)
            .map(|r| (r.position.distance_to(&center), r))
            .filter(|(d, _)| *d <= radius)
            .map(|(d, r)| (d, r.clone()))
            .collect();
        drop(state);
        found.sort_by(|a, b| a.0.total_cmp(&b.0));
        found.into_iter().map(|(_, r)| r).collect()
    }

    // -------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------

    /// Mark the resource at `position` as extracted, in both the index and
    /// the owning area. Returns `false` if no resource is there.
    pub fn mark_extracted(&self, position: BlockPos) -> bool {
        let mut state = self.lock();
        let Some(resource) = state.resources.get_mut(&position) else {
            return false;
        };
        resource.extracted = true;
        if let Some(area) = state.areas.get_mut(&position.cell()) {
            for r in area.resources.iter_mut().filter(|r| r.position == position) {
                r.extracted = true;
            }
        }
        true
    }

    /// Replace the danger zone of a scanned cell. The level is clamped into
    /// `1..=10`. Returns `false` if the cell has not been scanned.
    pub fn update_danger(&self, mut zone: DangerZone) -> bool {
        zone.level = zone.level.clamp(1, 10);
        let mut state = self.lock();
        if !state.areas.contains_key(&zone.coordinate) {
            return false;
        }
        state.danger.insert(zone.coordinate, zone);
        true
    }

    // -------------------------------------------------------------------
    // Snapshots
    // -------------------------------------------------------------------

    /// Copy the registry contents.
    pub fn snapshot(&self) -> ExplorationSnapshot {
        let state = self.lock();
        ExplorationSnapshot {
            areas: state.areas.clone(),
            resources: state.resources.clone(),
            danger: state.danger.clone(),
        }
    }

    /// Merge a snapshot into the registry.
    ///
    /// Cells already present are kept as they are; a cell is never scanned
    /// twice. Danger zones and resources are only taken for cells the
    /// snapshot itself contributes. Returns the number of cells added.
    pub fn restore(&self, snapshot: ExplorationSnapshot) -> usize {
        let mut state = self.lock();
        let mut added = BTreeSet::new();
        for (cell, mut area) in snapshot.areas {
            if state.areas.contains_key(&cell) || state.in_flight.contains(&cell) {
                continue;
            }
            area.coordinate = cell;
            state.areas.insert(cell, area);
            added.insert(cell);
        }
        for (position, resource) in snapshot.resources {
            if added.contains(&position.cell()) {
                state.resources.insert(position, resource);
            }
        }
        for (cell, zone) in snapshot.danger {
            if added.contains(&cell) {
                state.danger.insert(cell, zone);
            }
        }
        added.len()
    }
}
