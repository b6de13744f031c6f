//! Integration tests for graph building and path finding.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::float_cmp)]

use cartograph_nav::{NavError, NewRoad, Router, WaypointGraph, prune_points};
use cartograph_types::{BlockPos, ErrorKind, RoadType, WaypointType};

/// Diamond-shaped graph where the short side goes through `C`.
///
/// Road lengths: A-B 10, B-D 10 (through a control point), A-C 5, C-D 5.
fn diamond() -> WaypointGraph {
    let mut graph = WaypointGraph::new();
    graph.create_waypoint("A", BlockPos::new(0, 0, 0), WaypointType::Home).unwrap();
    graph.create_waypoint("B", BlockPos::new(6, 0, 8), WaypointType::Landmark).unwrap();
    graph.create_waypoint("C", BlockPos::new(5, 0, 0), WaypointType::Village).unwrap();
    graph.create_waypoint("D", BlockPos::new(10, 0, 0), WaypointType::Mine).unwrap();

    graph.create_road(NewRoad::new("ab", "A", "B", RoadType::Trail)).unwrap();
    graph
        .create_road(NewRoad::new("bd", "B", "D", RoadType::Trail).via([BlockPos::new(10, 0, 5)]))
        .unwrap();
    graph.create_road(NewRoad::new("ac", "A", "C", RoadType::Road)).unwrap();
    graph.create_road(NewRoad::new("cd", "C", "D", RoadType::Road)).unwrap();
    graph
}

#[test]
fn diamond_road_lengths() {
    let graph = diamond();
    for (id, expected) in [("ab", 10.0), ("bd", 10.0), ("ac", 5.0), ("cd", 5.0)] {
        let road = graph.road(id).unwrap();
        assert!((road.distance - expected).abs() < 1e-9, "{id}: {}", road.distance);
    }
}

#[test]
fn dijkstra_takes_the_short_side() {
    let graph = diamond();
    let route = Router::default().graph_route(&graph, "A", "D").unwrap();
    let names: Vec<&str> = route.waypoints.iter().map(|n| n.as_str()).collect();
    assert_eq!(names, vec!["A", "C", "D"]);
    assert!((route.distance - 10.0).abs() < 1e-9);
}

#[test]
fn dijkstra_goes_around_a_blocked_road() {
    let mut graph = diamond();
    graph.degrade_road("cd").unwrap();
    graph.degrade_road("cd").unwrap();
    graph.degrade_road("cd").unwrap();
    let route = Router::default().graph_route(&graph, "A", "D").unwrap();
    let names: Vec<&str> = route.waypoints.iter().map(|n| n.as_str()).collect();
    assert_eq!(names, vec!["A", "B", "D"]);
    assert!((route.distance - 20.0).abs() < 1e-9);
}

#[test]
fn collinear_route_prunes_to_endpoints() {
    let graph = diamond();
    let start = BlockPos::new(-1, 0, 0);
    let goal = BlockPos::new(11, 0, 0);
    let path = Router::default().find_path(&graph, start, goal);

    assert_eq!(path.points(), &[start, goal]);
    assert!((path.total_distance() - 12.0).abs() < 1e-9);
    assert_eq!(path.estimated_seconds(), 3);
}

#[test]
fn detour_through_a_waypoint_is_kept() {
    let mut graph = WaypointGraph::new();
    graph.create_waypoint("Home", BlockPos::new(0, 64, 0), WaypointType::Home).unwrap();
    graph.create_waypoint("Bridge", BlockPos::new(50, 64, 50), WaypointType::Landmark).unwrap();
    graph.create_waypoint("Camp", BlockPos::new(100, 64, 0), WaypointType::Base).unwrap();
    graph.create_road(NewRoad::new("r1", "Home", "Bridge", RoadType::Bridge)).unwrap();
    graph.create_road(NewRoad::new("r2", "Bridge", "Camp", RoadType::Road)).unwrap();

    let start = BlockPos::new(0, 64, 0);
    let goal = BlockPos::new(100, 64, 0);
    let path = Router::default().find_path(&graph, start, goal);

    assert_eq!(path.points(), &[start, BlockPos::new(50, 64, 50), goal]);
    assert_eq!(path.estimated_seconds(), 33);
    assert_eq!(
        path.instructions(),
        &[
            "Head south-east for 71 blocks to Bridge".to_owned(),
            "Head north-east for 71 blocks".to_owned(),
            "Arrive at destination".to_owned(),
        ]
    );
}

#[test]
fn empty_graph_falls_back_to_direct_path() {
    let graph = WaypointGraph::new();
    let start = BlockPos::new(0, 70, 0);
    let goal = BlockPos::new(30, 70, 40);
    let path = Router::default().find_path(&graph, start, goal);

    assert_eq!(path.points(), &[start, goal]);
    assert!((path.total_distance() - 50.0).abs() < 1e-9);
    assert_eq!(path.estimated_seconds(), 12);
    assert_eq!(path.instructions().len(), 2);
}

#[test]
fn disconnected_waypoints_fall_back_to_direct_path() {
    let mut graph = WaypointGraph::new();
    graph.create_waypoint("North", BlockPos::new(0, 64, -100), WaypointType::Custom).unwrap();
    graph.create_waypoint("South", BlockPos::new(0, 64, 100), WaypointType::Custom).unwrap();

    let start = BlockPos::new(0, 64, -90);
    let goal = BlockPos::new(0, 64, 90);
    let path = Router::default().find_path(&graph, start, goal);
    assert_eq!(path.points(), &[start, goal]);
    assert_eq!(path.total_distance(), 180.0);
}

#[test]
fn pruning_never_drops_endpoints() {
    let cases: [&[BlockPos]; 3] = [
        &[BlockPos::new(0, 0, 0), BlockPos::new(1, 0, 0)],
        &[
            BlockPos::new(0, 0, 0),
            BlockPos::new(1, 0, 0),
            BlockPos::new(2, 0, 0),
            BlockPos::new(3, 0, 0),
        ],
        &[
            BlockPos::new(5, 5, 5),
            BlockPos::new(-40, 0, 12),
            BlockPos::new(5, 5, 5),
        ],
    ];
    for points in cases {
        let pruned = prune_points(points, 0.10);
        assert_eq!(pruned.first(), points.first());
        assert_eq!(pruned.last(), points.last());
        assert!(pruned.len() >= 2);
    }
}

#[test]
fn duplicate_home_is_rejected_and_first_kept() {
    let mut graph = WaypointGraph::new();
    graph.create_waypoint("Home", BlockPos::new(1, 2, 3), WaypointType::Home).unwrap();
    let err = graph
        .create_waypoint("Home", BlockPos::new(9, 9, 9), WaypointType::Base)
        .unwrap_err();
    assert!(matches!(err, NavError::DuplicateWaypoint(_)));
    assert_eq!(err.kind(), ErrorKind::DuplicateIdentity);
    assert_eq!(graph.waypoint("Home").unwrap().position, BlockPos::new(1, 2, 3));
}
