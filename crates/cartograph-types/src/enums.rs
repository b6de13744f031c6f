//! Enumeration types shared across the workspace.
//!
//! All enums serialize as `snake_case` strings so they can be used directly
//! in JSON documents and HTTP query strings.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Waypoints
// ---------------------------------------------------------------------------

/// The kind of point of interest a waypoint marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum WaypointType {
    /// A player's home or spawn point.
    Home,
    /// A fortified base or storage hub.
    Base,
    /// A mining site or ore deposit.
    Mine,
    /// A farm or food source.
    Farm,
    /// A village or trading post.
    Village,
    /// A notable natural or generated structure.
    Landmark,
    /// A dimension portal.
    Portal,
    /// A place to avoid (spawners, lava lakes).
    Hazard,
    /// Any other user-defined stop.
    Custom,
}

// ---------------------------------------------------------------------------
// Roads
// ---------------------------------------------------------------------------

/// The construction class of a road.
///
/// Each class carries a travel speed multiplier and a build priority used
/// when planning which roads to construct first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RoadType {
    /// Trampled foot path.
    Trail,
    /// Paved road.
    Road,
    /// Wide, lit highway.
    Highway,
    /// Bridge over water or a ravine.
    Bridge,
    /// Tunnel through terrain.
    Tunnel,
}

impl RoadType {
    /// Travel speed multiplier relative to walking on open ground.
    pub const fn speed_multiplier(self) -> f64 {
        match self {
            Self::Trail => 1.0,
            Self::Road => 1.3,
            Self::Highway => 1.6,
            Self::Bridge => 1.2,
            Self::Tunnel => 1.1,
        }
    }

    /// Build priority (higher builds first).
    pub const fn build_priority(self) -> u8 {
        match self {
            Self::Trail => 1,
            Self::Road | Self::Tunnel => 2,
            Self::Bridge => 3,
            Self::Highway => 4,
        }
    }
}

/// Physical condition of a road.
///
/// Roads degrade one step at a time; a [`RoadCondition::Blocked`] road is
/// never used for routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RoadCondition {
    /// Fully intact.
    Good,
    /// Minor damage.
    Fair,
    /// Heavily damaged but passable.
    Poor,
    /// Impassable.
    Blocked,
}

impl RoadCondition {
    /// Whether routing may use a road in this condition.
    pub const fn is_passable(self) -> bool {
        !matches!(self, Self::Blocked)
    }
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Classification of a resource-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ResourceClass {
    /// Mineable ore.
    Ore,
    /// A block that only appears in generated structures (chests, portal
    /// frames).
    StructureMarker,
    /// A mob spawner. Counts towards danger scoring.
    Spawner,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Coarse error taxonomy shared by every crate.
///
/// Library error enums map each variant onto one of these kinds so callers
/// (and the HTTP layer) can react without matching on crate-specific types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ErrorKind {
    /// A waypoint name or road id is already taken.
    DuplicateIdentity,
    /// A referenced waypoint or road does not exist.
    UnknownReference,
    /// The world sampler or the persistence store failed.
    CollaboratorFailure,
    /// The request itself is out of bounds (e.g. an oversized scan radius).
    InvalidRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_roads_are_impassable() {
        assert!(RoadCondition::Good.is_passable());
        assert!(RoadCondition::Poor.is_passable());
        assert!(!RoadCondition::Blocked.is_passable());
    }

    #[test]
    fn highway_outranks_trail() {
        assert!(RoadType::Highway.build_priority() > RoadType::Trail.build_priority());
        assert!(RoadType::Highway.speed_multiplier() > RoadType::Trail.speed_multiplier());
    }

    #[test]
    fn waypoint_type_serializes_snake_case() {
        let json = serde_json::to_string(&WaypointType::Landmark).ok();
        assert_eq!(json.as_deref(), Some("\"landmark\""));
    }
}
