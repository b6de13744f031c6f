//! Pending exploration tasks.
//!
//! A max-heap of [`ExplorationTask`]s plus the set of cells currently
//! pending. The set is what makes queueing idempotent: a cell can only be in
//! the heap once. Ordering is priority descending, then earliest
//! `created_at`, then insertion order.
//!
//! Stale tasks are not swept eagerly; they are dropped when they reach the
//! top of the heap.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap};

use cartograph_types::{CellCoordinate, ExplorationTask};
use chrono::{DateTime, Duration, Utc};

/// Heap entry with the insertion sequence used as the final tie-break.
#[derive(Debug, PartialEq, Eq)]
struct Queued {
    task: ExplorationTask,
    seq: u64,
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        self.task
            .priority
            .cmp(&other.task.priority)
            .then_with(|| other.task.created_at.cmp(&self.task.created_at))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue of cells waiting to be scanned.
#[derive(Debug)]
pub struct FrontierQueue {
    heap: BinaryHeap<Queued>,
    pending: BTreeSet<CellCoordinate>,
    next_seq: u64,
    ttl: Duration,
}

impl FrontierQueue {
    /// Create an empty queue whose tasks go stale after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            heap: BinaryHeap::new(),
            pending: BTreeSet::new(),
            next_seq: 0,
            ttl,
        }
    }

    /// Queue a task. Returns `false` if its cell is already pending.
    pub fn push(&mut self, task: ExplorationTask) -> bool {
        if !self.pending.insert(task.coordinate) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.heap.push(Queued { task, seq });
        true
    }

    /// Pop the best task that is neither stale at `now` nor already
    /// scanned according to `is_scanned`.
    ///
    /// Discarded tasks leave the pending set, so their cells can be queued
    /// again later.
    pub fn pop_at(
        &mut self,
        now: DateTime<Utc>,
        mut is_scanned: impl FnMut(CellCoordinate) -> bool,
    ) -> Option<ExplorationTask> {
        while let Some(Queued { task, .. }) = self.heap.pop() {
            self.pending.remove(&task.coordinate);
            if self.is_stale(&task, now) {
                tracing::debug!(cell = %task.coordinate, "Dropping stale exploration task");
                continue;
            }
            if is_scanned(task.coordinate) {
                tracing::debug!(cell = %task.coordinate, "Dropping task for scanned cell");
                continue;
            }
            return Some(task);
        }
        None
    }

    /// Whether `task` has outlived the TTL at `now`.
    pub fn is_stale(&self, task: &ExplorationTask, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(task.created_at) > self.ttl
    }

    /// Whether `cell` is pending.
    pub fn contains(&self, cell: CellCoordinate) -> bool {
        self.pending.contains(&cell)
    }

    /// Number of pending tasks, stale ones included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    fn task(cx: i32, priority: i64, created_at: DateTime<Utc>) -> ExplorationTask {
        ExplorationTask {
            coordinate: CellCoordinate::new(cx, 0),
            priority,
            created_at,
        }
    }

    fn hour_queue() -> FrontierQueue {
        FrontierQueue::new(Duration::hours(1))
    }

    #[test]
    fn pops_highest_priority_first() {
        let now = Utc::now();
        let mut queue = hour_queue();
        queue.push(task(1, 900, now));
        queue.push(task(2, 1000, now));
        queue.push(task(3, 950, now));
        let order: Vec<i32> = std::iter::from_fn(|| queue.pop_at(now, |_| false))
            .map(|t| t.coordinate.cx)
            .collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn ties_go_to_earliest_then_first_inserted() {
        let now = Utc::now();
        let earlier = now - Duration::seconds(5);
        let mut queue = hour_queue();
        queue.push(task(1, 500, now));
        queue.push(task(2, 500, earlier));
        queue.push(task(3, 500, now));
        let order: Vec<i32> = std::iter::from_fn(|| queue.pop_at(now, |_| false))
            .map(|t| t.coordinate.cx)
            .collect();
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn duplicate_cells_are_rejected() {
        let now = Utc::now();
        let mut queue = hour_queue();
        assert!(queue.push(task(1, 10, now)));
        assert!(!queue.push(task(1, 99, now)));
        assert_eq!(queue.len(), 1);
        let popped = queue.pop_at(now, |_| false).unwrap();
        assert_eq!(popped.priority, 10);
        assert!(!queue.contains(CellCoordinate::new(1, 0)));
        assert!(queue.push(task(1, 99, now)));
    }

    #[test]
    fn stale_tasks_are_skipped_on_pop() {
        let now = Utc::now();
        let mut queue = hour_queue();
        queue.push(task(1, 1000, now - Duration::minutes(61)));
        queue.push(task(2, 1, now - Duration::minutes(59)));
        let popped = queue.pop_at(now, |_| false).unwrap();
        assert_eq!(popped.coordinate.cx, 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn scanned_cells_are_skipped_on_pop() {
        let now = Utc::now();
        let mut queue = hour_queue();
        queue.push(task(1, 1000, now));
        queue.push(task(2, 1, now));
        let popped = queue.pop_at(now, |cell| cell.cx == 1).unwrap();
        assert_eq!(popped.coordinate.cx, 2);
        assert!(queue.pop_at(now, |_| false).is_none());
    }
}
