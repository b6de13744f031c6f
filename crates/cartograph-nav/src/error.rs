//! Error types for the `cartograph-nav` crate.
//!
//! Every graph mutation validates before it touches any state, so an error
//! always leaves the graph exactly as it was.

use cartograph_types::{ErrorKind, RoadId, WaypointName};

/// Errors that can occur during waypoint-graph operations.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// A waypoint with this name already exists.
    #[error("waypoint already exists: {0}")]
    DuplicateWaypoint(WaypointName),

    /// A road with this id already exists.
    #[error("road already exists: {0}")]
    DuplicateRoad(RoadId),

    /// No waypoint with this name exists.
    #[error("waypoint not found: {0}")]
    UnknownWaypoint(WaypointName),

    /// No road with this id exists.
    #[error("road not found: {0}")]
    UnknownRoad(RoadId),
}

impl NavError {
    /// Coarse classification of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateWaypoint(_) | Self::DuplicateRoad(_) => ErrorKind::DuplicateIdentity,
            Self::UnknownWaypoint(_) | Self::UnknownRoad(_) => ErrorKind::UnknownReference,
        }
    }
}
