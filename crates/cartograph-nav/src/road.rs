//! Road construction and condition changes.
//!
//! A road joins two waypoints, optionally through intermediate control
//! points. Its length is measured once when it is created and never
//! recomputed, even if the endpoint waypoints are later edited.
//!
//! # Condition
//!
//! Roads wear down one step at a time:
//! [`Good`](RoadCondition::Good) -> [`Fair`](RoadCondition::Fair) ->
//! [`Poor`](RoadCondition::Poor) -> [`Blocked`](RoadCondition::Blocked).
//! Routing ignores blocked roads.

use cartograph_types::{BlockPos, RoadCondition, RoadId, RoadType, WaypointName, polyline_length};
use serde::{Deserialize, Serialize};

/// Request to create a road. Endpoints are referenced by name and resolved
/// when the road is added to a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRoad {
    /// Unique road id.
    pub id: RoadId,
    /// First endpoint.
    pub endpoint_a: WaypointName,
    /// Second endpoint.
    pub endpoint_b: WaypointName,
    /// Construction class.
    #[serde(default = "default_road_type")]
    pub road_type: RoadType,
    /// Intermediate points between `endpoint_a` and `endpoint_b`, in order.
    #[serde(default)]
    pub control_points: Vec<BlockPos>,
    /// Whether the road can be travelled from `endpoint_b` to `endpoint_a`.
    #[serde(default = "default_bidirectional")]
    pub bidirectional: bool,
}

const fn default_road_type() -> RoadType {
    RoadType::Trail
}

const fn default_bidirectional() -> bool {
    true
}

impl NewRoad {
    /// A straight, two-way road.
    pub fn new(
        id: impl Into<RoadId>,
        endpoint_a: impl Into<WaypointName>,
        endpoint_b: impl Into<WaypointName>,
        road_type: RoadType,
    ) -> Self {
        Self {
            id: id.into(),
            endpoint_a: endpoint_a.into(),
            endpoint_b: endpoint_b.into(),
            road_type,
            control_points: Vec::new(),
            bidirectional: true,
        }
    }

    /// Route the road through `points`.
    #[must_use]
    pub fn via(mut self, points: impl IntoIterator<Item = BlockPos>) -> Self {
        self.control_points.extend(points);
        self
    }

    /// Only allow travel from `endpoint_a` to `endpoint_b`.
    #[must_use]
    pub const fn one_way(mut self) -> Self {
        self.bidirectional = false;
        self
    }
}

/// Length of a road from `a` through `control_points` to `b`.
pub fn measured_length(a: BlockPos, control_points: &[BlockPos], b: BlockPos) -> f64 {
    let mut points = Vec::with_capacity(control_points.len().saturating_add(2));
    points.push(a);
    points.extend_from_slice(control_points);
    points.push(b);
    polyline_length(&points)
}

/// The next worse condition, or `None` if the road is already blocked.
pub const fn degraded(condition: RoadCondition) -> Option<RoadCondition> {
    match condition {
        RoadCondition::Good => Some(RoadCondition::Fair),
        RoadCondition::Fair => Some(RoadCondition::Poor),
        RoadCondition::Poor => Some(RoadCondition::Blocked),
        RoadCondition::Blocked => None,
    }
}

/// The next better condition, or `None` if the road is already good.
pub const fn repaired(condition: RoadCondition) -> Option<RoadCondition> {
    match condition {
        RoadCondition::Good => None,
        RoadCondition::Fair => Some(RoadCondition::Good),
        RoadCondition::Poor => Some(RoadCondition::Fair),
        RoadCondition::Blocked => Some(RoadCondition::Poor),
    }
}
