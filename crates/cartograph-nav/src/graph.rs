//! Waypoint graph: waypoints as nodes, roads as weighted edges.
//!
//! [`WaypointGraph`] owns every waypoint and road and the adjacency between
//! them. Waypoints do not list their roads; use [`WaypointGraph::roads_at`]
//! or [`WaypointGraph::neighbors`].
//!
//! Internally an outbound index maps each waypoint to the roads that can be
//! travelled away from it, and an inbound index to the roads arriving at it.
//! A two-way road appears in both indexes of both endpoints.

use std::collections::{BTreeMap, BTreeSet};

use cartograph_types::{
    BlockPos, Road, RoadCondition, RoadId, Waypoint, WaypointName, WaypointType,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::NavError;
use crate::road::{self, NewRoad};

/// Serializable copy of a graph.
///
/// Adjacency is not stored; it is rebuilt (and validated) by
/// [`WaypointGraph::from_snapshot`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Waypoints by name.
    pub waypoints: BTreeMap<WaypointName, Waypoint>,
    /// Roads by id.
    pub roads: BTreeMap<RoadId, Road>,
    /// Waypoint insertion order. Names missing here are appended by
    /// creation time when the graph is rebuilt.
    #[serde(default)]
    pub order: Vec<WaypointName>,
}

/// The routing graph.
#[derive(Debug, Clone, Default)]
pub struct WaypointGraph {
    /// All waypoints indexed by name.
    waypoints: BTreeMap<WaypointName, Waypoint>,
    /// Waypoint names in insertion order. Nearest-waypoint ties resolve to
    /// the earliest entry.
    order: Vec<WaypointName>,
    /// All roads indexed by id.
    roads: BTreeMap<RoadId, Road>,
    /// Outbound adjacency: waypoint -> roads departing from it.
    outbound: BTreeMap<WaypointName, Vec<RoadId>>,
    /// Inbound adjacency: waypoint -> roads arriving at it.
    inbound: BTreeMap<WaypointName, Vec<RoadId>>,
}

impl WaypointGraph {
    /// Create an empty graph.
    pub const fn new() -> Self {
        Self {
            waypoints: BTreeMap::new(),
            order: Vec::new(),
            roads: BTreeMap::new(),
            outbound: BTreeMap::new(),
            inbound: BTreeMap::new(),
        }
    }

    // -------------------------------------------------------------------
    // Waypoint operations
    // -------------------------------------------------------------------

    /// Add a waypoint.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::DuplicateWaypoint`] if the name is taken. The
    /// existing waypoint is left untouched.
    pub fn create_waypoint(
        &mut self,
        name: impl Into<WaypointName>,
        position: BlockPos,
        waypoint_type: WaypointType,
    ) -> Result<&Waypoint, NavError> {
        let name = name.into();
        if self.waypoints.contains_key(&name) {
            return Err(NavError::DuplicateWaypoint(name));
        }
        tracing::debug!(waypoint = %name, %position, ?waypoint_type, "Waypoint created");
        self.insert_waypoint(Waypoint {
            name: name.clone(),
            position,
            waypoint_type,
            visit_count: 0,
            active: true,
            created_at: Utc::now(),
        });
        self.waypoints.get(&name).ok_or(NavError::UnknownWaypoint(name))
    }

    fn insert_waypoint(&mut self, waypoint: Waypoint) {
        let name = waypoint.name.clone();
        self.outbound.entry(name.clone()).or_default();
        self.inbound.entry(name.clone()).or_default();
        self.order.push(name.clone());
        self.waypoints.insert(name, waypoint);
    }

    /// Look up a waypoint by name.
    pub fn waypoint(&self, name: &str) -> Option<&Waypoint> {
        self.waypoints.get(name)
    }

    /// Number of waypoints, active or not.
    pub fn waypoint_count(&self) -> usize {
        self.waypoints.len()
    }

    /// All waypoints in insertion order.
    pub fn waypoints(&self) -> impl Iterator<Item = &Waypoint> {
        self.order.iter().filter_map(|name| self.waypoints.get(name))
    }

    /// Stop routing to and through a waypoint. Its roads are kept.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::UnknownWaypoint`] if no such waypoint exists.
    pub fn deactivate_waypoint(&mut self, name: &str) -> Result<(), NavError> {
        let waypoint = self
            .waypoints
            .get_mut(name)
            .ok_or_else(|| NavError::UnknownWaypoint(name.into()))?;
        waypoint.active = false;
        Ok(())
    }

    /// Count a visit to a waypoint. Returns the new visit count.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::UnknownWaypoint`] if no such waypoint exists.
    pub fn record_visit(&mut self, name: &str) -> Result<u64, NavError> {
        let waypoint = self
            .waypoints
            .get_mut(name)
            .ok_or_else(|| NavError::UnknownWaypoint(name.into()))?;
        waypoint.visit_count = waypoint.visit_count.saturating_add(1);
        Ok(waypoint.visit_count)
    }

    // -------------------------------------------------------------------
    // Road operations
    // -------------------------------------------------------------------

    /// Add a road between two existing waypoints.
    ///
    /// The road's distance is measured here, from the endpoints' current
    /// positions through any control points.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::UnknownWaypoint`] if either endpoint is missing,
    /// or [`NavError::DuplicateRoad`] if the id is taken.
    pub fn create_road(&mut self, new_road: NewRoad) -> Result<&Road, NavError> {
        let a = self.position_of(&new_road.endpoint_a)?;
        let b = self.position_of(&new_road.endpoint_b)?;
        if self.roads.contains_key(&new_road.id) {
            return Err(NavError::DuplicateRoad(new_road.id));
        }

        let distance = road::measured_length(a, &new_road.control_points, b);
        let id = new_road.id.clone();
        tracing::debug!(
            road = %id,
            from = %new_road.endpoint_a,
            to = %new_road.endpoint_b,
            distance,
            "Road created"
        );
        self.insert_road(Road {
            id: new_road.id,
            endpoint_a: new_road.endpoint_a,
            endpoint_b: new_road.endpoint_b,
            road_type: new_road.road_type,
            condition: RoadCondition::Good,
            control_points: new_road.control_points,
            distance,
            usage_count: 0,
            bidirectional: new_road.bidirectional,
            created_at: Utc::now(),
        });
        self.roads.get(&id).ok_or(NavError::UnknownRoad(id))
    }

    fn position_of(&self, name: &WaypointName) -> Result<BlockPos, NavError> {
        self.waypoints
            .get(name)
            .map(|w| w.position)
            .ok_or_else(|| NavError::UnknownWaypoint(name.clone()))
    }

    /// Insert an already-validated road and index it.
    fn insert_road(&mut self, road: Road) {
        let id = road.id.clone();
        let a = road.endpoint_a.clone();
        let b = road.endpoint_b.clone();
        let bidirectional = road.bidirectional;

        self.roads.insert(id.clone(), road);
        self.outbound.entry(a.clone()).or_default().push(id.clone());
        self.inbound.entry(b.clone()).or_default().push(id.clone());

        if bidirectional {
            self.outbound.entry(b).or_default().push(id.clone());
            self.inbound.entry(a).or_default().push(id);
        }
    }

    /// Look up a road by id.
    pub fn road(&self, id: &str) -> Option<&Road> {
        self.roads.get(id)
    }

    /// Number of roads.
    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    /// All roads ordered by id.
    pub fn roads(&self) -> impl Iterator<Item = &Road> {
        self.roads.values()
    }

    fn road_mut(&mut self, id: &str) -> Result<&mut Road, NavError> {
        self.roads
            .get_mut(id)
            .ok_or_else(|| NavError::UnknownRoad(id.into()))
    }

    /// Set a road's condition. Returns the previous condition.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::UnknownRoad`] if no such road exists.
    pub fn set_road_condition(
        &mut self,
        id: &str,
        condition: RoadCondition,
    ) -> Result<RoadCondition, NavError> {
        let road = self.road_mut(id)?;
        let previous = road.condition;
        road.condition = condition;
        Ok(previous)
    }

    /// Wear a road down one step. Returns the new condition; a blocked road
    /// stays blocked.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::UnknownRoad`] if no such road exists.
    pub fn degrade_road(&mut self, id: &str) -> Result<RoadCondition, NavError> {
        let road = self.road_mut(id)?;
        if let Some(next) = road::degraded(road.condition) {
            tracing::debug!(road = %road.id, from = ?road.condition, to = ?next, "Road degraded");
            road.condition = next;
        }
        Ok(road.condition)
    }

    /// Mend a road one step. Returns the new condition; a good road stays
    /// good.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::UnknownRoad`] if no such road exists.
    pub fn repair_road(&mut self, id: &str) -> Result<RoadCondition, NavError> {
        let road = self.road_mut(id)?;
        if let Some(next) = road::repaired(road.condition) {
            tracing::debug!(road = %road.id, from = ?road.condition, to = ?next, "Road repaired");
            road.condition = next;
        }
        Ok(road.condition)
    }

    /// Count one traversal of a road. Returns the new usage count.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::UnknownRoad`] if no such road exists.
    pub fn record_road_usage(&mut self, id: &str) -> Result<u64, NavError> {
        let road = self.road_mut(id)?;
        road.usage_count = road.usage_count.saturating_add(1);
        Ok(road.usage_count)
    }

    // -------------------------------------------------------------------
    // Graph queries
    // -------------------------------------------------------------------

    /// Every road touching `name`, in either direction, each listed once.
    pub fn roads_at(&self, name: &str) -> Vec<&Road> {
        let mut seen = BTreeSet::new();
        self.outbound
            .get(name)
            .into_iter()
            .chain(self.inbound.get(name))
            .flatten()
            .filter(|id| seen.insert(*id))
            .filter_map(|id| self.roads.get(id))
            .collect()
    }

    /// Waypoints reachable from `name` over a single road, with that road.
    ///
    /// One-way roads only appear from their `endpoint_a`. Road condition is
    /// not considered.
    pub fn neighbors(&self, name: &str) -> Vec<(&WaypointName, &Road)> {
        let Some(road_ids) = self.outbound.get(name) else {
            return Vec::new();
        };
        road_ids
            .iter()
            .filter_map(|id| self.roads.get(id))
            .filter_map(|road| road.other_end(name).map(|other| (other, road)))
            .collect()
    }

    /// The active waypoint closest to `position`, optionally restricted to
    /// one type.
    ///
    /// Waypoints are checked in insertion order and only a strictly closer
    /// one replaces the current best, so the earliest wins a tie.
    pub fn nearest_waypoint(
        &self,
        position: BlockPos,
        filter: Option<WaypointType>,
    ) -> Option<&Waypoint> {
        let mut best: Option<(&Waypoint, f64)> = None;
        for waypoint in self.waypoints() {
            if !waypoint.active || filter.is_some_and(|t| t != waypoint.waypoint_type) {
                continue;
            }
            let d = waypoint.position.distance_to(&position);
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((waypoint, d));
            }
        }
        best.map(|(waypoint, _)| waypoint)
    }

    /// Active waypoints within `radius` blocks of `center`, nearest first.
    /// Equal distances keep insertion order.
    pub fn waypoints_within_radius(&self, center: BlockPos, radius: f64) -> Vec<&Waypoint> {
        let mut found: Vec<(&Waypoint, f64)> = self
            .waypoints()
            .filter(|w| w.active)
            .map(|w| (w, w.position.distance_to(&center)))
            .filter(|(_, d)| *d <= radius)
            .collect();
        found.sort_by(|a, b| a.1.total_cmp(&b.1));
        found.into_iter().map(|(w, _)| w).collect()
    }

    // -------------------------------------------------------------------
    // Snapshots
    // -------------------------------------------------------------------

    /// Copy the graph into a serializable snapshot.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            waypoints: self.waypoints.clone(),
            roads: self.roads.clone(),
            order: self.order.clone(),
        }
    }

    /// Rebuild a graph from a snapshot.
    ///
    /// Waypoints are keyed by their own `name` and roads by their own `id`;
    /// the map keys are only used for lookup. Stored road distances are
    /// kept as they are.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::UnknownWaypoint`] if a road references a missing
    /// waypoint, or a duplicate error if two entries share a key.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self, NavError> {
        let GraphSnapshot {
            mut waypoints,
            roads,
            order,
        } = snapshot;
        let mut graph = Self::new();

        let mut ordered: Vec<Waypoint> = order
            .iter()
            .filter_map(|name| waypoints.remove(name))
            .collect();
        let mut rest: Vec<Waypoint> = waypoints.into_values().collect();
        rest.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));
        ordered.extend(rest);

        for waypoint in ordered {
            if graph.waypoints.contains_key(&waypoint.name) {
                return Err(NavError::DuplicateWaypoint(waypoint.name));
            }
            graph.insert_waypoint(waypoint);
        }

        for road in roads.into_values() {
            graph.position_of(&road.endpoint_a)?;
            graph.position_of(&road.endpoint_b)?;
            if graph.roads.contains_key(&road.id) {
                return Err(NavError::DuplicateRoad(road.id));
            }
            graph.insert_road(road);
        }

        Ok(graph)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use cartograph_types::RoadType;

    use super::*;

    fn village() -> WaypointGraph {
        let mut graph = WaypointGraph::new();
        graph.create_waypoint("Home", BlockPos::new(0, 64, 0), WaypointType::Home).unwrap();
        graph.create_waypoint("Mine", BlockPos::new(30, 40, 0), WaypointType::Mine).unwrap();
        graph.create_waypoint("Farm", BlockPos::new(0, 64, 30), WaypointType::Farm).unwrap();
        graph
    }

    #[test]
    fn duplicate_waypoint_leaves_original() {
        let mut graph = village();
        let err = graph
            .create_waypoint("Home", BlockPos::new(99, 0, 99), WaypointType::Base)
            .unwrap_err();
        assert!(matches!(err, NavError::DuplicateWaypoint(_)));
        let home = graph.waypoint("Home").unwrap();
        assert_eq!(home.position, BlockPos::new(0, 64, 0));
        assert_eq!(home.waypoint_type, WaypointType::Home);
        assert_eq!(graph.waypoint_count(), 3);
    }

    #[test]
    fn road_to_unknown_waypoint_is_rejected() {
        let mut graph = village();
        let err = graph
            .create_road(NewRoad::new("r1", "Home", "Nowhere", RoadType::Trail))
            .unwrap_err();
        assert!(matches!(err, NavError::UnknownWaypoint(ref n) if n.as_str() == "Nowhere"));
        assert_eq!(graph.road_count(), 0);
        assert!(graph.roads_at("Home").is_empty());
    }

    #[test]
    fn duplicate_road_is_rejected() {
        let mut graph = village();
        graph.create_road(NewRoad::new("r1", "Home", "Mine", RoadType::Road)).unwrap();
        let err = graph
            .create_road(NewRoad::new("r1", "Home", "Farm", RoadType::Road))
            .unwrap_err();
        assert!(matches!(err, NavError::DuplicateRoad(_)));
        assert_eq!(graph.road("r1").unwrap().endpoint_b.as_str(), "Mine");
    }

    #[test]
    fn road_distance_is_fixed_at_creation() {
        let mut graph = village();
        let road = graph.create_road(NewRoad::new("r1", "Home", "Farm", RoadType::Road)).unwrap();
        assert!((road.distance - 30.0).abs() < 1e-9);
        assert_eq!(road.condition, RoadCondition::Good);
    }

    #[test]
    fn one_way_roads_only_lead_forward() {
        let mut graph = village();
        graph
            .create_road(NewRoad::new("down", "Home", "Mine", RoadType::Tunnel).one_way())
            .unwrap();
        assert_eq!(graph.neighbors("Home").len(), 1);
        assert!(graph.neighbors("Mine").is_empty());
        assert_eq!(graph.roads_at("Mine").len(), 1);
    }

    #[test]
    fn nearest_prefers_earliest_on_tie() {
        let mut graph = WaypointGraph::new();
        graph.create_waypoint("East", BlockPos::new(10, 0, 0), WaypointType::Custom).unwrap();
        graph.create_waypoint("West", BlockPos::new(-10, 0, 0), WaypointType::Custom).unwrap();
        let nearest = graph.nearest_waypoint(BlockPos::new(0, 0, 0), None).unwrap();
        assert_eq!(nearest.name.as_str(), "East");
    }

    #[test]
    fn nearest_honours_type_filter_and_activity() {
        let mut graph = village();
        let origin = BlockPos::new(0, 64, 0);
        let mine = graph.nearest_waypoint(origin, Some(WaypointType::Mine)).unwrap();
        assert_eq!(mine.name.as_str(), "Mine");
        assert!(graph.nearest_waypoint(origin, Some(WaypointType::Portal)).is_none());

        graph.deactivate_waypoint("Home").unwrap();
        let nearest = graph.nearest_waypoint(origin, None).unwrap();
        assert_eq!(nearest.name.as_str(), "Farm");
    }

    #[test]
    fn radius_query_is_sorted_by_distance() {
        let graph = village();
        let found = graph.waypoints_within_radius(BlockPos::new(2, 64, 25), 50.0);
        let names: Vec<&str> = found.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["Farm", "Home", "Mine"]);
        assert!(graph.waypoints_within_radius(BlockPos::new(500, 0, 500), 10.0).is_empty());
    }

    #[test]
    fn degrading_stops_at_blocked() {
        let mut graph = village();
        graph.create_road(NewRoad::new("r1", "Home", "Mine", RoadType::Trail)).unwrap();
        for _ in 0..5 {
            graph.degrade_road("r1").unwrap();
        }
        assert_eq!(graph.road("r1").unwrap().condition, RoadCondition::Blocked);
        assert!(matches!(graph.degrade_road("nope"), Err(NavError::UnknownRoad(_))));
        assert_eq!(
            graph.set_road_condition("r1", RoadCondition::Good).unwrap(),
            RoadCondition::Blocked
        );
    }

    #[test]
    fn repairing_climbs_back_to_good() {
        let mut graph = village();
        graph.create_road(NewRoad::new("r1", "Home", "Mine", RoadType::Trail)).unwrap();
        graph.set_road_condition("r1", RoadCondition::Blocked).unwrap();
        assert_eq!(graph.repair_road("r1").unwrap(), RoadCondition::Poor);
        assert_eq!(graph.repair_road("r1").unwrap(), RoadCondition::Fair);
        assert_eq!(graph.repair_road("r1").unwrap(), RoadCondition::Good);
        assert_eq!(graph.repair_road("r1").unwrap(), RoadCondition::Good);
        assert!(matches!(graph.repair_road("nope"), Err(NavError::UnknownRoad(_))));
    }

    #[test]
    fn visits_and_usage_are_counted() {
        let mut graph = village();
        graph.create_road(NewRoad::new("r1", "Home", "Mine", RoadType::Trail)).unwrap();
        assert_eq!(graph.record_visit("Home").unwrap(), 1);
        assert_eq!(graph.record_visit("Home").unwrap(), 2);
        assert_eq!(graph.record_road_usage("r1").unwrap(), 1);
        assert!(graph.record_visit("Nowhere").is_err());
    }

    #[test]
    fn snapshot_rebuilds_adjacency_and_order() {
        let mut graph = village();
        graph.create_road(NewRoad::new("r1", "Home", "Mine", RoadType::Road)).unwrap();
        graph
            .create_road(NewRoad::new("r2", "Mine", "Farm", RoadType::Trail).one_way())
            .unwrap();

        let json = serde_json::to_string(&graph.snapshot()).unwrap();
        let restored = WaypointGraph::from_snapshot(serde_json::from_str(&json).unwrap()).unwrap();

        let names: Vec<&str> = restored.waypoints().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["Home", "Mine", "Farm"]);
        assert_eq!(restored.neighbors("Mine").len(), 2);
        assert!(restored.neighbors("Farm").is_empty());
        assert_eq!(restored.road("r1"), graph.road("r1"));
    }

    #[test]
    fn snapshot_with_dangling_road_is_rejected() {
        let mut graph = village();
        graph.create_road(NewRoad::new("r1", "Home", "Mine", RoadType::Road)).unwrap();
        let mut snapshot = graph.snapshot();
        snapshot.waypoints.remove("Mine");
        snapshot.order.clear();
        assert!(matches!(
            WaypointGraph::from_snapshot(snapshot),
            Err(NavError::UnknownWaypoint(_))
        ));
    }
}
