//! Background frontier explorer.
//!
//! Drains the frontier queue in batches of concurrent scans. When a whole
//! batch comes back empty the frontier around the configured origin is
//! scheduled again; when that adds nothing the explorer idles. Shutdown
//! drops any in-flight batch, which releases its uncommitted cells.

use std::sync::Arc;
use std::time::Duration;

use cartograph_core::Atlas;
use cartograph_core::config::ExplorerConfig;
use cartograph_explore::WorldSampler;
use futures::future::join_all;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Totals from one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Cells newly scanned.
    pub scanned: usize,
    /// Scan slots that found the queue empty.
    pub empty: usize,
    /// Scan slots whose sampler failed.
    pub failed: usize,
}

/// What the loop should do after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// There may be more work; go again.
    Working,
    /// The frontier is exhausted; wait before trying again.
    Idle,
}

/// Drives [`Atlas::explore_next`] from a Tokio task.
#[derive(Debug)]
pub struct Explorer<S> {
    atlas: Arc<Atlas<S>>,
    config: ExplorerConfig,
}

impl<S: WorldSampler> Explorer<S> {
    /// Explore around `config.origin` using `atlas`.
    pub const fn new(atlas: Arc<Atlas<S>>, config: ExplorerConfig) -> Self {
        Self { atlas, config }
    }

    fn batch_size(&self) -> usize {
        self.config.batch_size.max(1)
    }

    /// Run one batch of concurrent scans.
    pub async fn run_batch(&self) -> BatchOutcome {
        let results = join_all((0..self.batch_size()).map(|_| self.atlas.explore_next())).await;

        let mut outcome = BatchOutcome::default();
        for result in results {
            match result {
                Ok(Some(scan)) => outcome.scanned = outcome.scanned.saturating_add(scan.areas.len()),
                Ok(None) => outcome.empty = outcome.empty.saturating_add(1),
                Err(e) => {
                    warn!(error = %e, "Frontier scan failed");
                    outcome.failed = outcome.failed.saturating_add(1);
                }
            }
        }
        outcome
    }

    /// One batch, rescheduling the frontier if the queue ran dry.
    pub async fn step(&self) -> Step {
        let outcome = self.run_batch().await;
        debug!(
            scanned = outcome.scanned,
            empty = outcome.empty,
            failed = outcome.failed,
            "Explorer batch finished"
        );
        if outcome.empty < self.batch_size() {
            return Step::Working;
        }

        match self
            .atlas
            .schedule_frontier(self.config.origin, self.config.frontier_radius)
        {
            Ok(0) => {
                debug!(origin = %self.config.origin, "Frontier exhausted");
                Step::Idle
            }
            Ok(scheduled) => {
                info!(scheduled, origin = %self.config.origin, "Frontier scheduled");
                Step::Working
            }
            Err(e) => {
                warn!(error = %e, origin = %self.config.origin, "Frontier could not be scheduled");
                Step::Idle
            }
        }
    }

    /// Loop until `shutdown` flips to `true` (or its sender is dropped).
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            origin = %self.config.origin,
            radius = self.config.frontier_radius,
            batch_size = self.batch_size(),
            "Explorer started"
        );
        let idle = Duration::from_secs(self.config.idle_secs.max(1));

        while !*shutdown.borrow() {
            let step = tokio::select! {
                _ = shutdown.changed() => break,
                step = self.step() => step,
            };
            if step == Step::Idle {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    () = tokio::time::sleep(idle) => {}
                }
            }
        }

        info!(status = ?self.atlas.status(), "Explorer stopped");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use cartograph_core::CartographConfig;
    use cartograph_explore::SeededTerrain;
    use cartograph_types::BlockPos;

    use super::*;

    fn explorer() -> Explorer<SeededTerrain> {
        let atlas = Atlas::from_config(
            &CartographConfig::default(),
            SeededTerrain::new(3).with_height_range(0, 6),
        );
        let config = ExplorerConfig {
            origin: BlockPos::new(0, 64, 0),
            frontier_radius: 16,
            batch_size: 3,
            ..ExplorerConfig::default()
        };
        Explorer::new(Arc::new(atlas), config)
    }

    #[tokio::test]
    async fn explorer_covers_the_frontier_then_idles() {
        let explorer = explorer();
        let mut steps = 0;
        while explorer.step().await == Step::Working {
            steps += 1;
            assert!(steps < 10, "explorer never went idle");
        }
        let status = explorer.atlas.status();
        assert_eq!(status.scanned_cells, 4);
        assert_eq!(status.pending_tasks, 0);
    }

    #[tokio::test]
    async fn oversized_frontier_radius_idles_without_queueing() {
        let mut explorer = explorer();
        explorer.config.frontier_radius = u32::MAX;
        assert_eq!(explorer.step().await, Step::Idle);
        assert_eq!(explorer.atlas.status().pending_tasks, 0);
    }

    #[tokio::test]
    async fn empty_queue_batch_reports_every_slot_empty() {
        let explorer = explorer();
        let outcome = explorer.run_batch().await;
        assert_eq!(outcome, BatchOutcome { scanned: 0, empty: 3, failed: 0 });
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let explorer = explorer();
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(explorer.run(rx));

        tx.send(true).unwrap();
        let stopped = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(matches!(stopped, Ok(Ok(()))));
    }
}
