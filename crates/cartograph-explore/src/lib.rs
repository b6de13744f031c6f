//! Territory exploration for Cartograph.
//!
//! The world is partitioned into 16x16 columns ("cells"). This crate scans
//! cells through a [`WorldSampler`], classifies what it finds, scores each
//! cell's hazard level, and schedules background exploration so that no
//! cell is ever scanned twice.
//!
//! # Modules
//!
//! - [`sampler`] -- The [`WorldSampler`] collaborator trait and
//!   [`SeededTerrain`], a deterministic stand-in.
//! - [`resource`] -- Block id to resource class and value table.
//! - [`scanner`] -- Full-height scan of a single cell.
//! - [`danger`] -- Additive hazard scoring with configurable rules.
//! - [`registry`] -- Scanned-cell registry with atomic claims.
//! - [`frontier`] -- Priority queue of pending cells with lazy staleness.
//! - [`scheduler`] -- [`FrontierScheduler`], the entry point for area scans
//!   and frontier exploration.
//! - [`error`] -- Error types.

pub mod danger;
pub mod error;
pub mod frontier;
pub mod registry;
pub mod resource;
pub mod sampler;
pub mod scanner;
pub mod scheduler;

pub use danger::{DangerRules, DangerScorer};
pub use error::ExploreError;
pub use frontier::FrontierQueue;
pub use registry::{CellClaim, ClaimOutcome, ExplorationRegistry, ExplorationSnapshot};
pub use resource::{ResourceEntry, ResourceTable};
pub use sampler::{SampleError, SeededTerrain, WorldSampler};
pub use scanner::CellScanner;
pub use scheduler::{ExplorationSettings, FrontierScheduler, covering_cells};
