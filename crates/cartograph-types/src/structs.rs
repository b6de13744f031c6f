//! Core record types: positions, cells, scan results, waypoints, roads, paths.
//!
//! These are plain data records. Behaviour that needs shared state (the
//! scanned-cell registry, the routing graph) lives in the downstream crates;
//! the only logic here is geometry and invariant-preserving construction.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ts_rs::TS;

use crate::enums::{RoadCondition, RoadType, WaypointType};
use crate::ids::{RoadId, ScanId, WaypointName};

/// Width (and depth) of a cell in blocks.
pub const CELL_SIZE: i32 = 16;

/// Number of bits a block coordinate is shifted by to obtain its cell.
pub const CELL_SHIFT: u32 = 4;

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// An integer block position in the world.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct BlockPos {
    /// East-west axis (east is positive).
    pub x: i32,
    /// Vertical axis.
    pub y: i32,
    /// North-south axis (south is positive).
    pub z: i32,
}

impl BlockPos {
    /// Create a position.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        let dz = f64::from(self.z) - f64::from(other.z);
        dz.mul_add(dz, dx.mul_add(dx, dy * dy)).sqrt()
    }

    /// Distance on the horizontal plane, ignoring height.
    pub fn horizontal_distance_to(&self, other: &Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dz = f64::from(self.z) - f64::from(other.z);
        dx.hypot(dz)
    }

    /// The cell containing this position.
    pub const fn cell(&self) -> CellCoordinate {
        CellCoordinate::containing(self.x, self.z)
    }
}

impl core::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

/// Error returned when parsing a coordinate string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCoordinateError(String);

impl core::fmt::Display for ParseCoordinateError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "invalid coordinate: {}", self.0)
    }
}

impl std::error::Error for ParseCoordinateError {}

/// Parse exactly `N` comma-separated integers.
fn parse_components<const N: usize>(s: &str) -> Result<[i32; N], ParseCoordinateError> {
    let mut out = [0_i32; N];
    let mut parts = s.split(',');
    for slot in &mut out {
        let part = parts
            .next()
            .ok_or_else(|| ParseCoordinateError(s.to_owned()))?;
        *slot = part
            .trim()
            .parse()
            .map_err(|e| ParseCoordinateError(format!("{s} ({e})")))?;
    }
    if parts.next().is_some() {
        return Err(ParseCoordinateError(s.to_owned()));
    }
    Ok(out)
}

impl FromStr for BlockPos {
    type Err = ParseCoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [x, y, z] = parse_components::<3>(s)?;
        Ok(Self { x, y, z })
    }
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// Identifies one 16x16 horizontal cell: `(x >> 4, z >> 4)`.
///
/// Serializes as the string `"cx,cz"` so it can key JSON objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellCoordinate {
    /// Cell index along x.
    pub cx: i32,
    /// Cell index along z.
    pub cz: i32,
}

impl CellCoordinate {
    /// Create a cell coordinate from cell indices.
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    /// The cell containing block column `(x, z)`.
    ///
    /// Arithmetic shift floors toward negative infinity, so block `-1` lies
    /// in cell `-1`, not cell `0`.
    pub const fn containing(x: i32, z: i32) -> Self {
        Self {
            cx: x >> CELL_SHIFT,
            cz: z >> CELL_SHIFT,
        }
    }

    /// Block x of the cell's western edge.
    pub const fn min_block_x(self) -> i32 {
        self.cx << CELL_SHIFT
    }

    /// Block z of the cell's northern edge.
    pub const fn min_block_z(self) -> i32 {
        self.cz << CELL_SHIFT
    }

    /// The representative centre column of the cell at height `y`.
    pub const fn center(self, y: i32) -> BlockPos {
        BlockPos {
            x: (self.cx << CELL_SHIFT) | 8,
            y,
            z: (self.cz << CELL_SHIFT) | 8,
        }
    }

    /// The eight surrounding cells (8-connected neighbourhood).
    pub fn neighbors(self) -> Vec<Self> {
        let mut out = Vec::with_capacity(8);
        for dx in -1_i32..=1 {
            for dz in -1_i32..=1 {
                if dx == 0 && dz == 0 {
                    continue;
                }
                if let (Some(cx), Some(cz)) = (self.cx.checked_add(dx), self.cz.checked_add(dz)) {
                    out.push(Self { cx, cz });
                }
            }
        }
        out
    }
}

impl core::fmt::Display for CellCoordinate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{},{}", self.cx, self.cz)
    }
}

impl FromStr for CellCoordinate {
    type Err = ParseCoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [cx, cz] = parse_components::<2>(s)?;
        Ok(Self { cx, cz })
    }
}

impl Serialize for CellCoordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellCoordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Exploration records
// ---------------------------------------------------------------------------

/// A valuable block found while scanning a cell.
///
/// Everything except `extracted` is fixed at discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceLocation {
    /// Where the block is.
    pub position: BlockPos,
    /// Block identifier, e.g. `minecraft:diamond_ore`.
    pub resource_type: String,
    /// Value from the resource table.
    pub value: u32,
    /// When the scan found it.
    pub discovered: DateTime<Utc>,
    /// Whether it has been mined out.
    pub extracted: bool,
}

/// Aggregate scan record for one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ExploredArea {
    /// The scanned cell.
    #[ts(as = "String")]
    pub coordinate: CellCoordinate,
    /// Biome at the cell's representative column.
    pub biome: String,
    /// Count of every block type seen in the cell.
    pub block_histogram: BTreeMap<String, u32>,
    /// Resource blocks found in the cell.
    pub resources: Vec<ResourceLocation>,
    /// Whether any water was seen.
    pub has_water: bool,
    /// Whether any lava was seen.
    pub has_lava: bool,
    /// First position of each structure-marker block type.
    pub structure_hints: BTreeMap<String, BlockPos>,
    /// When the scan completed.
    pub scanned_at: DateTime<Utc>,
}

impl ExploredArea {
    /// Number of blocks of the given type seen in the cell.
    pub fn block_count(&self, block: &str) -> u32 {
        self.block_histogram.get(block).copied().unwrap_or(0)
    }

    /// Whether the cell produced at least one resource.
    pub fn has_resources(&self) -> bool {
        !self.resources.is_empty()
    }

    /// Sum of the values of all resources in the cell.
    pub fn total_resource_value(&self) -> u64 {
        self.resources.iter().map(|r| u64::from(r.value)).sum()
    }
}

/// Hazard assessment for one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DangerZone {
    /// The assessed cell.
    #[ts(as = "String")]
    pub coordinate: CellCoordinate,
    /// Hazard level, always within `1..=10`.
    pub level: u8,
    /// Label of the dominant threat.
    pub primary_threat: String,
    /// Whether the hazard is still considered present.
    pub active: bool,
}

/// A pending request to scan one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ExplorationTask {
    /// The cell to scan.
    #[ts(as = "String")]
    pub coordinate: CellCoordinate,
    /// Higher runs first.
    pub priority: i64,
    /// When the task was queued.
    pub created_at: DateTime<Utc>,
}

/// Outcome of a successful area-scan request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AreaScanResult {
    /// Identifier of the request.
    pub scan_id: ScanId,
    /// Requested centre.
    pub center: BlockPos,
    /// Requested radius in blocks.
    pub radius: u32,
    /// Cells scanned by this request.
    pub areas: Vec<ExploredArea>,
    /// Resources found by this request.
    pub resources: Vec<ResourceLocation>,
    /// Danger zones recorded by this request.
    pub danger_zones: Vec<DangerZone>,
    /// Covered cells skipped because they were already scanned or being
    /// scanned by another request.
    pub cells_skipped: usize,
}

// ---------------------------------------------------------------------------
// Navigation records
// ---------------------------------------------------------------------------

/// A named point of interest and routing graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Waypoint {
    /// Unique name.
    pub name: WaypointName,
    /// Position (fixed after creation).
    pub position: BlockPos,
    /// Kind of place.
    pub waypoint_type: WaypointType,
    /// How many times an agent has arrived here.
    pub visit_count: u64,
    /// Inactive waypoints are ignored by nearest-waypoint lookups.
    pub active: bool,
    /// When the waypoint was created.
    pub created_at: DateTime<Utc>,
}

/// A weighted edge between two waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Road {
    /// Unique identifier.
    pub id: RoadId,
    /// First endpoint (the origin for one-way roads).
    pub endpoint_a: WaypointName,
    /// Second endpoint (the destination for one-way roads).
    pub endpoint_b: WaypointName,
    /// Construction class.
    pub road_type: RoadType,
    /// Current condition.
    pub condition: RoadCondition,
    /// Intermediate points the road passes through, in order from `a` to `b`.
    pub control_points: Vec<BlockPos>,
    /// Length in blocks, computed once at creation.
    pub distance: f64,
    /// How many trips have used the road.
    pub usage_count: u64,
    /// Whether the road may be travelled from `b` to `a`.
    pub bidirectional: bool,
    /// When the road was created.
    pub created_at: DateTime<Utc>,
}

impl Road {
    /// Whether routing may use the road.
    pub const fn is_active(&self) -> bool {
        self.condition.is_passable()
    }

    /// The endpoint opposite `from`, if `from` is an endpoint.
    pub fn other_end(&self, from: &str) -> Option<&WaypointName> {
        if self.endpoint_a.as_str() == from {
            Some(&self.endpoint_b)
        } else if self.endpoint_b.as_str() == from {
            Some(&self.endpoint_a)
        } else {
            None
        }
    }
}

/// An ordered route through the world with aggregate metrics.
///
/// Always holds at least two points. Construct through
/// [`NavigationPath::from_points`]; the metrics are derived from the points
/// and never edited afterwards. Deserializing rejects documents with fewer
/// than two points or a negative or non-finite distance.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NavigationPath {
    points: Vec<BlockPos>,
    total_distance: f64,
    estimated_seconds: u64,
    instructions: Vec<String>,
}

/// Wire form of [`NavigationPath`], checked before it becomes one.
#[derive(Deserialize)]
struct NavigationPathRecord {
    points: Vec<BlockPos>,
    total_distance: f64,
    estimated_seconds: u64,
    #[serde(default)]
    instructions: Vec<String>,
}

impl<'de> Deserialize<'de> for NavigationPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = NavigationPathRecord::deserialize(deserializer)?;
        if record.points.len() < 2 {
            return Err(serde::de::Error::custom(format!(
                "a navigation path needs at least 2 points, got {}",
                record.points.len()
            )));
        }
        if !record.total_distance.is_finite() || record.total_distance < 0.0 {
            return Err(serde::de::Error::custom(format!(
                "invalid total distance {}",
                record.total_distance
            )));
        }
        Ok(Self {
            points: record.points,
            total_distance: record.total_distance,
            estimated_seconds: record.estimated_seconds,
            instructions: record.instructions,
        })
    }
}

impl NavigationPath {
    /// Build a path, deriving distance and travel time from the points.
    ///
    /// Returns `None` when fewer than two points are supplied.
    pub fn from_points(
        points: Vec<BlockPos>,
        instructions: Vec<String>,
        travel_speed: f64,
    ) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let total_distance = polyline_length(&points);
        Some(Self {
            estimated_seconds: travel_seconds(total_distance, travel_speed),
            points,
            total_distance,
            instructions,
        })
    }

    /// The two-point straight path used when the graph cannot help.
    pub fn direct(start: BlockPos, goal: BlockPos, instructions: Vec<String>, travel_speed: f64) -> Self {
        let total_distance = start.distance_to(&goal);
        Self {
            points: vec![start, goal],
            total_distance,
            estimated_seconds: travel_seconds(total_distance, travel_speed),
            instructions,
        }
    }

    /// Ordered points, first is the start and last is the goal.
    pub fn points(&self) -> &[BlockPos] {
        &self.points
    }

    /// Sum of straight-line distances between consecutive points.
    pub const fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Estimated travel time in whole seconds.
    pub const fn estimated_seconds(&self) -> u64 {
        self.estimated_seconds
    }

    /// Human-readable turn-by-turn directions.
    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }

    /// First point.
    pub fn start(&self) -> Option<&BlockPos> {
        self.points.first()
    }

    /// Last point.
    pub fn goal(&self) -> Option<&BlockPos> {
        self.points.last()
    }
}

/// Sum of consecutive straight-line distances along `points`.
pub fn polyline_length(points: &[BlockPos]) -> f64 {
    points
        .windows(2)
        .filter_map(|pair| match pair {
            [a, b] => Some(a.distance_to(b)),
            _ => None,
        })
        .sum()
}

/// Whole seconds needed to cover `distance` blocks at `speed` blocks/second.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn travel_seconds(distance: f64, speed: f64) -> u64 {
    if speed.is_nan() || speed <= 0.0 || !distance.is_finite() {
        return 0;
    }
    let seconds = (distance / speed).round();
    if seconds <= 0.0 { 0 } else { seconds as u64 }
}
