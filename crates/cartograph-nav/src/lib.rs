//! Waypoint navigation for Cartograph.
//!
//! Named waypoints joined by roads form a weighted graph. The router finds
//! shortest paths between arbitrary world positions through that graph and
//! falls back to a straight line when the graph cannot help.
//!
//! # Modules
//!
//! - [`graph`] -- [`WaypointGraph`]: waypoints, roads, adjacency, snapshots.
//! - [`road`] -- Road creation requests, length measurement, condition
//!   chain.
//! - [`router`] -- [`Router`]: Dijkstra over passable roads, fallback paths.
//! - [`path`] -- Single-pass pruning and turn-by-turn directions.
//! - [`error`] -- Error types for graph operations.

pub mod error;
pub mod graph;
pub mod path;
pub mod road;
pub mod router;

pub use error::NavError;
pub use graph::{GraphSnapshot, WaypointGraph};
pub use path::{Stop, compass, prune, prune_points};
pub use road::NewRoad;
pub use router::{GraphRoute, Router, RouterSettings};
