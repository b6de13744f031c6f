//! Shortest-path routing between arbitrary world positions.
//!
//! The router snaps the start and goal onto their nearest active waypoints,
//! runs Dijkstra between those over passable roads, and turns the result
//! into a pruned [`NavigationPath`]. When the graph cannot help (no
//! waypoints, or no connection) it falls back to a straight two-point path,
//! so routing never fails.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use cartograph_types::{BlockPos, NavigationPath, WaypointName};
use serde::{Deserialize, Serialize};

use crate::graph::WaypointGraph;
use crate::path::{self, Stop};

/// Routing tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
    /// Walking speed in blocks per second used for travel estimates.
    pub travel_speed: f64,
    /// Relative detour below which an interior point is pruned.
    pub prune_tolerance: f64,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            travel_speed: 4.3,
            prune_tolerance: 0.10,
        }
    }
}

/// A waypoint-to-waypoint route found in the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphRoute {
    /// Waypoints from source to target, inclusive.
    pub waypoints: Vec<WaypointName>,
    /// Sum of road distances along the route.
    pub distance: f64,
}

/// Open-set entry. Reversed ordering turns the max-heap into a min-heap.
#[derive(Debug)]
struct OpenEntry<'a> {
    distance: f64,
    name: &'a WaypointName,
}

impl PartialEq for OpenEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.distance.total_cmp(&other.distance) == Ordering::Equal && self.name == other.name
    }
}

impl Eq for OpenEntry<'_> {}

impl PartialOrd for OpenEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.name.cmp(self.name))
    }
}

/// Computes navigation paths over a [`WaypointGraph`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Router {
    settings: RouterSettings,
}

impl Router {
    /// Create a router.
    pub const fn new(settings: RouterSettings) -> Self {
        Self { settings }
    }

    /// The router's tunables.
    pub const fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    /// Find a path from `start` to `goal`. Never fails.
    pub fn find_path(&self, graph: &WaypointGraph, start: BlockPos, goal: BlockPos) -> NavigationPath {
        let (Some(from), Some(to)) = (
            graph.nearest_waypoint(start, None),
            graph.nearest_waypoint(goal, None),
        ) else {
            tracing::debug!(%start, %goal, "No waypoints, using direct path");
            return self.direct(start, goal);
        };

        let Some(route) = self.graph_route(graph, from.name.as_str(), to.name.as_str()) else {
            tracing::debug!(from = %from.name, to = %to.name, "Waypoints not connected, using direct path");
            return self.direct(start, goal);
        };

        let mut stops = Vec::with_capacity(route.waypoints.len().saturating_add(2));
        stops.push(Stop::at(start));
        for name in route.waypoints {
            if let Some(waypoint) = graph.waypoint(name.as_str()) {
                stops.push(Stop::waypoint(waypoint.position, name));
            }
        }
        stops.push(Stop::at(goal));

        let stops = path::prune(stops, self.settings.prune_tolerance);
        let instructions = path::instructions(&stops);
        let points = stops.into_iter().map(|s| s.position).collect();

        NavigationPath::from_points(points, instructions, self.settings.travel_speed)
            .unwrap_or_else(|| self.direct(start, goal))
    }

    fn direct(&self, start: BlockPos, goal: BlockPos) -> NavigationPath {
        let stops = [Stop::at(start), Stop::at(goal)];
        NavigationPath::direct(start, goal, path::instructions(&stops), self.settings.travel_speed)
    }

    /// Dijkstra between two waypoints.
    ///
    /// Only passable roads are relaxed, one-way roads only forwards, and
    /// inactive waypoints are never entered (though an inactive `from` may
    /// still be left). Returns `None` if either waypoint is unknown or
    /// `to` is unreachable.
    pub fn graph_route(&self, graph: &WaypointGraph, from: &str, to: &str) -> Option<GraphRoute> {
        let source = &graph.waypoint(from)?.name;
        let target = &graph.waypoint(to)?.name;

        let mut best: BTreeMap<&WaypointName, f64> = BTreeMap::new();
        let mut previous: BTreeMap<&WaypointName, &WaypointName> = BTreeMap::new();
        let mut open = BinaryHeap::new();

        best.insert(source, 0.0);
        open.push(OpenEntry {
            distance: 0.0,
            name: source,
        });

        let mut reached = None;
        while let Some(OpenEntry { distance, name }) = open.pop() {
            if name == target {
                reached = Some(distance);
                break;
            }
            if best.get(name).is_some_and(|&d| distance > d) {
                continue;
            }

            for (neighbor, road) in graph.neighbors(name.as_str()) {
                if !road.is_active() {
                    continue;
                }
                if graph.waypoint(neighbor.as_str()).is_none_or(|w| !w.active) {
                    continue;
                }
                let candidate = distance + road.distance;
                if best.get(neighbor).is_none_or(|&d| candidate < d) {
                    best.insert(neighbor, candidate);
                    previous.insert(neighbor, name);
                    open.push(OpenEntry {
                        distance: candidate,
                        name: neighbor,
                    });
                }
            }
        }

        let distance = reached?;
        let mut waypoints = vec![target.clone()];
        let mut current = target;
        while current != source {
            let prev = *previous.get(current)?;
            waypoints.push(prev.clone());
            current = prev;
        }
        waypoints.reverse();
        Some(GraphRoute { waypoints, distance })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cartograph_types::{RoadCondition, RoadType, WaypointType};

    use super::*;
    use crate::road::NewRoad;

    fn names(route: &GraphRoute) -> Vec<&str> {
        route.waypoints.iter().map(WaypointName::as_str).collect()
    }

    fn line() -> WaypointGraph {
        let mut graph = WaypointGraph::new();
        for (name, x) in [("A", 0), ("B", 10), ("C", 20)] {
            graph
                .create_waypoint(name, BlockPos::new(x, 64, 0), WaypointType::Custom)
                .unwrap();
        }
        graph.create_road(NewRoad::new("ab", "A", "B", RoadType::Road)).unwrap();
        graph.create_road(NewRoad::new("bc", "B", "C", RoadType::Road).one_way()).unwrap();
        graph
    }

    #[test]
    fn route_follows_roads() {
        let graph = line();
        let route = Router::default().graph_route(&graph, "A", "C").unwrap();
        assert_eq!(names(&route), vec!["A", "B", "C"]);
        assert!((route.distance - 20.0).abs() < 1e-9);
    }

    #[test]
    fn one_way_roads_are_not_reversed() {
        let graph = line();
        assert!(Router::default().graph_route(&graph, "C", "A").is_none());
    }

    #[test]
    fn blocked_roads_are_avoided() {
        let mut graph = line();
        graph.set_road_condition("ab", RoadCondition::Blocked).unwrap();
        assert!(Router::default().graph_route(&graph, "A", "C").is_none());
        graph.set_road_condition("ab", RoadCondition::Poor).unwrap();
        assert!(Router::default().graph_route(&graph, "A", "C").is_some());
    }

    #[test]
    fn inactive_waypoints_are_not_entered() {
        let mut graph = line();
        graph.deactivate_waypoint("B").unwrap();
        assert!(Router::default().graph_route(&graph, "A", "C").is_none());
    }

    #[test]
    fn same_waypoint_is_a_zero_length_route() {
        let graph = line();
        let route = Router::default().graph_route(&graph, "B", "B").unwrap();
        assert_eq!(names(&route), vec!["B"]);
        assert!(route.distance.abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_waypoints_have_no_route() {
        let graph = line();
        assert!(Router::default().graph_route(&graph, "A", "Z").is_none());
    }

    #[test]
    fn settings_default_from_partial_json() {
        let settings: RouterSettings = serde_json::from_str(r#"{"travel_speed": 5.6}"#).unwrap();
        assert!((settings.travel_speed - 5.6).abs() < f64::EPSILON);
        assert!((settings.prune_tolerance - 0.10).abs() < f64::EPSILON);
    }
}
