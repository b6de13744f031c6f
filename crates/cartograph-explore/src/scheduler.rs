//! The frontier scheduler.
//!
//! [`FrontierScheduler`] ties the pieces together: it decomposes area-scan
//! requests into cells, claims each unscanned cell in the registry, runs the
//! [`CellScanner`] and [`DangerScorer`], and commits the results. It also
//! owns the frontier queue that feeds background exploration.
//!
//! Lock order is queue before registry. Neither lock is held across an
//! `.await`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use cartograph_types::{
    AreaScanResult, BlockPos, CellCoordinate, DangerZone, ExplorationTask, ExploredArea,
    ResourceLocation, ScanId,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::danger::{DangerRules, DangerScorer};
use crate::error::ExploreError;
use crate::frontier::FrontierQueue;
use crate::registry::{ClaimOutcome, ExplorationRegistry};
use crate::resource::ResourceTable;
use crate::sampler::WorldSampler;
use crate::scanner::CellScanner;

/// Tunables for scheduling and scanning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorationSettings {
    /// Seconds after which a pending task is stale.
    pub task_ttl_secs: u64,
    /// Priority of a cell centred exactly on the frontier origin.
    pub base_priority: i64,
    /// Bonus for cells next to a scanned cell that held resources.
    pub neighbor_bonus: i64,
    /// Largest radius accepted by an area-scan request.
    pub max_scan_radius: u32,
    /// Largest radius accepted when scheduling the frontier.
    pub max_frontier_radius: u32,
}

impl Default for ExplorationSettings {
    fn default() -> Self {
        Self {
            task_ttl_secs: 3600,
            base_priority: 1000,
            neighbor_bonus: 100,
            max_scan_radius: 256,
            max_frontier_radius: 1024,
        }
    }
}

impl ExplorationSettings {
    /// The task TTL as a duration.
    pub fn task_ttl(&self) -> Duration {
        i64::try_from(self.task_ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }
}

/// Schedules, deduplicates, and runs cell scans.
#[derive(Debug)]
pub struct FrontierScheduler {
    registry: ExplorationRegistry,
    queue: Mutex<FrontierQueue>,
    table: ResourceTable,
    rules: DangerRules,
    settings: ExplorationSettings,
}

impl Default for FrontierScheduler {
    fn default() -> Self {
        Self::new(ExplorationSettings::default(), DangerRules::default())
    }
}

impl FrontierScheduler {
    /// Create a scheduler using the standard resource table.
    pub fn new(settings: ExplorationSettings, rules: DangerRules) -> Self {
        Self::with_table(settings, rules, ResourceTable::standard().clone())
    }

    /// Create a scheduler with a custom resource table.
    pub fn with_table(settings: ExplorationSettings, rules: DangerRules, table: ResourceTable) -> Self {
        Self {
            registry: ExplorationRegistry::new(),
            queue: Mutex::new(FrontierQueue::new(settings.task_ttl())),
            table,
            rules,
            settings,
        }
    }

    /// The registry holding every scan result.
    pub const fn registry(&self) -> &ExplorationRegistry {
        &self.registry
    }

    /// Scheduling tunables.
    pub const fn settings(&self) -> &ExplorationSettings {
        &self.settings
    }

    /// Danger scoring rules.
    pub const fn rules(&self) -> &DangerRules {
        &self.rules
    }

    fn queue(&self) -> MutexGuard<'_, FrontierQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of queued tasks (stale ones included until popped).
    pub fn pending_count(&self) -> usize {
        self.queue().len()
    }

    /// Whether `cell` is queued.
    pub fn is_pending(&self, cell: CellCoordinate) -> bool {
        self.queue().contains(cell)
    }

    // -------------------------------------------------------------------
    // Area scans
    // -------------------------------------------------------------------

    /// Scan every cell covering the square of `radius` blocks around
    /// `center`.
    ///
    /// Cells already scanned, or being scanned by a concurrent request, are
    /// skipped and counted in `cells_skipped`.
    ///
    /// # Errors
    ///
    /// [`ExploreError::RadiusTooLarge`] if `radius` exceeds the configured
    /// maximum. [`ExploreError::CollaboratorFailure`] if the sampler fails;
    /// cells committed before the failure stay committed, the failing cell
    /// is released for a retry.
    pub async fn request_area_scan<S: WorldSampler>(
        &self,
        sampler: &S,
        center: BlockPos,
        radius: u32,
    ) -> Result<AreaScanResult, ExploreError> {
        if radius > self.settings.max_scan_radius {
            return Err(ExploreError::RadiusTooLarge {
                radius,
                max: self.settings.max_scan_radius,
            });
        }
        let cells = covering_cells(center, radius);
        self.scan_cells(sampler, center, radius, cells).await
    }

    async fn scan_cells<S: WorldSampler>(
        &self,
        sampler: &S,
        center: BlockPos,
        radius: u32,
        cells: Vec<CellCoordinate>,
    ) -> Result<AreaScanResult, ExploreError> {
        let scanner = CellScanner::new(&self.table);
        let scorer = DangerScorer::new(&self.rules, &self.table);

        let mut areas: Vec<ExploredArea> = Vec::new();
        let mut resources: Vec<ResourceLocation> = Vec::new();
        let mut danger_zones: Vec<DangerZone> = Vec::new();
        let mut cells_skipped: usize = 0;

        for cell in cells {
            let claim = match self.registry.try_claim(cell) {
                ClaimOutcome::Claimed(claim) => claim,
                ClaimOutcome::AlreadyScanned | ClaimOutcome::InFlight => {
                    cells_skipped = cells_skipped.saturating_add(1);
                    continue;
                }
            };

            let area = match scanner.scan(sampler, cell).await {
                Ok(area) => area,
                Err(source) => {
                    drop(claim);
                    tracing::warn!(%cell, error = %source, "Cell scan failed");
                    return Err(ExploreError::CollaboratorFailure {
                        cell,
                        committed: areas.len(),
                        source,
                    });
                }
            };

            let danger = scorer.assess(&area);
            claim.commit(area.clone(), danger.clone());

            resources.extend(area.resources.iter().cloned());
            danger_zones.extend(danger);
            areas.push(area);
        }

        tracing::info!(
            %center,
            radius,
            scanned = areas.len(),
            skipped = cells_skipped,
            resources = resources.len(),
            danger_zones = danger_zones.len(),
            "Area scan complete"
        );

        Ok(AreaScanResult {
            scan_id: ScanId::new(),
            center,
            radius,
            areas,
            resources,
            danger_zones,
            cells_skipped,
        })
    }

    // -------------------------------------------------------------------
    // Frontier
    // -------------------------------------------------------------------

    /// Queue every unscanned cell around `center`. Returns how many tasks
    /// were added.
    ///
    /// # Errors
    ///
    /// [`ExploreError::RadiusTooLarge`] if `max_radius` exceeds the
    /// configured frontier maximum. Nothing is queued.
    pub fn schedule_frontier(&self, center: BlockPos, max_radius: u32) -> Result<usize, ExploreError> {
        self.schedule_frontier_at(center, max_radius, Utc::now())
    }

    /// [`schedule_frontier`](Self::schedule_frontier) with an explicit clock.
    ///
    /// A cell qualifies when its centre column lies within `max_radius`
    /// blocks of `center` on both horizontal axes. Cells already scanned or
    /// already pending are left alone.
    ///
    /// # Errors
    ///
    /// [`ExploreError::RadiusTooLarge`] if `max_radius` exceeds the
    /// configured frontier maximum.
    pub fn schedule_frontier_at(
        &self,
        center: BlockPos,
        max_radius: u32,
        now: DateTime<Utc>,
    ) -> Result<usize, ExploreError> {
        if max_radius > self.settings.max_frontier_radius {
            return Err(ExploreError::RadiusTooLarge {
                radius: max_radius,
                max: self.settings.max_frontier_radius,
            });
        }
        let radius = i64::from(max_radius);
        let mut queue = self.queue();
        let mut pushed: usize = 0;

        for cell in covering_cells(center, max_radius) {
            let cell_center = cell.center(center.y);
            let dx = i64::from(cell_center.x).saturating_sub(i64::from(center.x)).abs();
            let dz = i64::from(cell_center.z).saturating_sub(i64::from(center.z)).abs();
            if dx > radius || dz > radius {
                continue;
            }
            if queue.contains(cell) || self.registry.is_scanned(cell) {
                continue;
            }

            let mut priority = self
                .settings
                .base_priority
                .saturating_sub(round_distance(center.horizontal_distance_to(&cell_center)));
            if self.registry.neighbor_has_resources(cell) {
                priority = priority.saturating_add(self.settings.neighbor_bonus);
            }

            if queue.push(ExplorationTask {
                coordinate: cell,
                priority,
                created_at: now,
            }) {
                pushed = pushed.saturating_add(1);
            }
        }
        drop(queue);

        tracing::debug!(%center, max_radius, pushed, "Frontier scheduled");
        Ok(pushed)
    }

    /// Pop the highest-priority live task.
    pub fn next_task(&self) -> Option<ExplorationTask> {
        self.next_task_at(Utc::now())
    }

    /// [`next_task`](Self::next_task) with an explicit clock.
    pub fn next_task_at(&self, now: DateTime<Utc>) -> Option<ExplorationTask> {
        self.queue().pop_at(now, |cell| self.registry.is_scanned(cell))
    }

    /// Pop one task and scan its cell.
    ///
    /// Returns `Ok(None)` when the queue holds no live task.
    ///
    /// # Errors
    ///
    /// Propagates a sampler failure. The task is not re-queued.
    pub async fn explore_next<S: WorldSampler>(
        &self,
        sampler: &S,
    ) -> Result<Option<AreaScanResult>, ExploreError> {
        let Some(task) = self.next_task() else {
            return Ok(None);
        };
        let center = task.coordinate.center(0);
        let result = self.scan_cells(sampler, center, 0, vec![task.coordinate]).await?;
        Ok(Some(result))
    }
}

/// Cells overlapping the square of `radius` blocks around `center`,
/// in row-major order.
pub fn covering_cells(center: BlockPos, radius: u32) -> Vec<CellCoordinate> {
    let r = i32::try_from(radius).unwrap_or(i32::MAX);
    let low = CellCoordinate::containing(center.x.saturating_sub(r), center.z.saturating_sub(r));
    let high = CellCoordinate::containing(center.x.saturating_add(r), center.z.saturating_add(r));
    (low.cx..=high.cx)
        .flat_map(|cx| (low.cz..=high.cz).map(move |cz| CellCoordinate::new(cx, cz)))
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn round_distance(distance: f64) -> i64 {
    // `as` saturates on out-of-range floats.
    distance.round() as i64
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn covering_cells_use_floor_division() {
        let cells = covering_cells(BlockPos::new(0, 64, 0), 1);
        assert_eq!(
            cells,
            vec![
                CellCoordinate::new(-1, -1),
                CellCoordinate::new(-1, 0),
                CellCoordinate::new(0, -1),
                CellCoordinate::new(0, 0),
            ]
        );
        assert_eq!(covering_cells(BlockPos::new(8, 0, 8), 0), vec![CellCoordinate::new(0, 0)]);
    }

    #[test]
    fn frontier_priority_falls_with_distance() {
        let scheduler = FrontierScheduler::default();
        let origin = BlockPos::new(8, 64, 8);
        scheduler.schedule_frontier(origin, 16).unwrap();
        let first = scheduler.next_task().unwrap();
        assert_eq!(first.coordinate, CellCoordinate::new(0, 0));
        assert_eq!(first.priority, 1000);
        let second = scheduler.next_task().unwrap();
        assert_eq!(second.priority, 984);
    }

    #[test]
    fn stale_frontier_tasks_are_discarded() {
        let scheduler = FrontierScheduler::default();
        let then = Utc::now() - Duration::hours(2);
        assert_eq!(scheduler.schedule_frontier_at(BlockPos::new(0, 64, 0), 32, then).unwrap(), 16);
        assert!(scheduler.next_task().is_none());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn oversized_frontier_is_rejected_before_queueing() {
        let scheduler = FrontierScheduler::default();
        let origin = BlockPos::new(0, 64, 0);
        let err = scheduler.schedule_frontier(origin, u32::MAX).unwrap_err();
        assert!(matches!(
            err,
            ExploreError::RadiusTooLarge { radius: u32::MAX, max: 1024 }
        ));
        assert_eq!(scheduler.pending_count(), 0);

        // The cap itself is accepted: (2 * 1024 / 16 + 1)^2 cells at most.
        let pushed = scheduler.schedule_frontier(origin, 1024).unwrap();
        assert!(pushed > 0 && pushed <= 129 * 129);
    }

    #[test]
    fn settings_convert_ttl() {
        let settings = ExplorationSettings::default();
        assert_eq!(settings.task_ttl(), Duration::hours(1));
        let huge = ExplorationSettings {
            task_ttl_secs: u64::MAX,
            ..ExplorationSettings::default()
        };
        assert_eq!(huge.task_ttl(), Duration::MAX);
    }
}
