//! Configuration, shared state, and persistence for Cartograph.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `cartograph-config.yaml` into
//!   strongly-typed structs.
//! - [`atlas`] -- [`Atlas`]: the scheduler, waypoint graph, and router
//!   behind one handle.
//! - [`persistence`] -- [`StateStore`]: snapshot documents in a key-value
//!   store.

pub mod atlas;
pub mod config;
pub mod persistence;

pub use atlas::{Atlas, AtlasStatus, CandidateWaypoint};
pub use config::{CartographConfig, ConfigError};
pub use persistence::{SavedState, StateStore};
