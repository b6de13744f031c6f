//! Path post-processing: pruning and turn-by-turn directions.
//!
//! The router produces a list of [`Stop`]s (the start, every waypoint on the
//! graph route, the goal). This module thins that list with a single
//! geometric pruning pass and renders directions for what is left.

use cartograph_types::{BlockPos, WaypointName};

/// A point on a path, labelled with the waypoint it sits on (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stop {
    /// Where the stop is.
    pub position: BlockPos,
    /// Waypoint at this stop.
    pub waypoint: Option<WaypointName>,
}

impl Stop {
    /// An unlabelled stop.
    pub const fn at(position: BlockPos) -> Self {
        Self {
            position,
            waypoint: None,
        }
    }

    /// A stop on a waypoint.
    pub const fn waypoint(position: BlockPos, name: WaypointName) -> Self {
        Self {
            position,
            waypoint: Some(name),
        }
    }
}

/// Drop interior stops that barely change the route.
///
/// One left-to-right pass. An interior stop is dropped when the detour
/// through it, relative to going straight from the last kept stop to the
/// next stop, is below `tolerance`:
///
/// ```text
/// (|prev, cur| + |cur, next| - |prev, next|) / |prev, next| < tolerance
/// ```
///
/// When `prev` and `next` coincide the stop is dropped only if it sits on
/// them as well. The first and last stops are always kept.
pub fn prune(stops: Vec<Stop>, tolerance: f64) -> Vec<Stop> {
    let count = stops.len();
    if count < 3 {
        return stops;
    }
    let next_positions: Vec<BlockPos> = stops.iter().skip(1).map(|s| s.position).collect();

    let mut kept: Vec<Stop> = Vec::with_capacity(count);
    for (index, stop) in stops.into_iter().enumerate() {
        let is_endpoint = index == 0 || index.saturating_add(1) == count;
        let (Some(prev), Some(next)) = (kept.last(), next_positions.get(index)) else {
            kept.push(stop);
            continue;
        };
        if is_endpoint || !is_negligible_detour(prev.position, stop.position, *next, tolerance) {
            kept.push(stop);
        }
    }
    kept
}

fn is_negligible_detour(prev: BlockPos, cur: BlockPos, next: BlockPos, tolerance: f64) -> bool {
    let direct = prev.distance_to(&next);
    let via = prev.distance_to(&cur) + cur.distance_to(&next);
    if direct <= 0.0 {
        return via <= 0.0;
    }
    (via - direct) / direct < tolerance
}

/// Prune bare positions. See [`prune`].
pub fn prune_points(points: &[BlockPos], tolerance: f64) -> Vec<BlockPos> {
    let stops = points.iter().copied().map(Stop::at).collect();
    prune(stops, tolerance).into_iter().map(|s| s.position).collect()
}

const COMPASS: [&str; 8] = [
    "north",
    "north-east",
    "east",
    "south-east",
    "south",
    "south-west",
    "west",
    "north-west",
];

/// Eight-way compass direction from `from` to `to`. Negative Z is north.
///
/// Purely vertical legs read `up` or `down`.
#[allow(clippy::cast_possible_truncation)]
pub fn compass(from: BlockPos, to: BlockPos) -> &'static str {
    let dx = f64::from(to.x) - f64::from(from.x);
    let dz = f64::from(to.z) - f64::from(from.z);
    if dx.abs() < f64::EPSILON && dz.abs() < f64::EPSILON {
        return if to.y >= from.y { "up" } else { "down" };
    }
    // 0 degrees is north, 90 is east.
    let bearing = dx.atan2(-dz).to_degrees();
    let sector = ((bearing / 45.0).round() as i64).rem_euclid(8);
    usize::try_from(sector)
        .ok()
        .and_then(|i| COMPASS.get(i))
        .copied()
        .unwrap_or("north")
}

/// Turn-by-turn directions, one line per leg plus a final arrival line.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn instructions(stops: &[Stop]) -> Vec<String> {
    let mut lines: Vec<String> = stops
        .windows(2)
        .filter_map(|leg| match leg {
            [from, to] => {
                let blocks = from.position.distance_to(&to.position).round().max(0.0) as u64;
                let direction = compass(from.position, to.position);
                Some(match &to.waypoint {
                    Some(name) => format!("Head {direction} for {blocks} blocks to {name}"),
                    None => format!("Head {direction} for {blocks} blocks"),
                })
            }
            _ => None,
        })
        .collect();
    lines.push("Arrive at destination".to_owned());
    lines
}
