//! Endpoint handlers for the query API.
//!
//! Every handler works against the shared [`Atlas`](cartograph_core::Atlas)
//! in [`AppState`]. Extractor rejections are turned into
//! [`ObserverError::InvalidQuery`] so that every failure shares one JSON
//! error shape.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Status counts |
//! | `POST` | `/api/scans` | Scan an area |
//! | `POST` | `/api/frontier` | Queue frontier cells |
//! | `POST` | `/api/frontier/next` | Pop the next task |
//! | `GET` | `/api/cells/{cx}/{cz}` | Explored area of one cell |
//! | `GET` | `/api/danger` | Stored danger zones |
//! | `PUT` | `/api/danger/{cx}/{cz}` | Replace a scanned cell's danger zone |
//! | `POST` | `/api/resources/extracted` | Mark a resource as extracted |
//! | `GET` | `/api/candidates` | Suggested waypoints |
//! | `GET` | `/api/waypoints` | All waypoints, or within `radius` of `x,y,z` |
//! | `GET` | `/api/waypoints/nearest` | Nearest active waypoint to `x,y,z` |
//! | `POST` | `/api/waypoints` | Create a waypoint |
//! | `POST` | `/api/roads` | Create a road |
//! | `POST` | `/api/roads/{id}/degrade` | Wear a road down one step |
//! | `POST` | `/api/roads/{id}/repair` | Mend a road one step |
//! | `GET` | `/api/path` | Path `from=x,y,z` `to=x,y,z` |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use cartograph_explore::WorldSampler;
use cartograph_nav::NewRoad;
use cartograph_types::{BlockPos, CellCoordinate, DangerZone, WaypointType};
use serde::Deserialize;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies and query parameters
// ---------------------------------------------------------------------------

/// Body of `POST /api/scans`.
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    /// Centre of the scanned square.
    pub center: BlockPos,
    /// Half-width of the square in blocks (default 0: just the centre cell).
    #[serde(default)]
    pub radius: u32,
}

/// Body of `POST /api/frontier`.
#[derive(Debug, Deserialize)]
pub struct FrontierRequest {
    /// Frontier origin.
    pub center: BlockPos,
    /// Largest horizontal offset of a queued cell centre.
    pub max_radius: u32,
}

/// Body of `PUT /api/danger/{cx}/{cz}`.
#[derive(Debug, Deserialize)]
pub struct DangerUpdate {
    /// New hazard level, `1..=10`.
    pub level: u8,
    /// Label of the dominant threat.
    pub primary_threat: String,
    /// Whether the hazard is still present (default `true`).
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

/// Body of `POST /api/resources/extracted`.
#[derive(Debug, Deserialize)]
pub struct ExtractionRequest {
    /// Position of the extracted resource.
    pub position: BlockPos,
}

/// Body of `POST /api/waypoints`.
#[derive(Debug, Deserialize)]
pub struct CreateWaypointRequest {
    /// Unique waypoint name.
    pub name: String,
    /// Where the waypoint is.
    pub position: BlockPos,
    /// Kind of place (default `custom`).
    #[serde(default = "default_waypoint_type")]
    pub waypoint_type: WaypointType,
}

const fn default_waypoint_type() -> WaypointType {
    WaypointType::Custom
}

/// Query parameters for `GET /api/waypoints`.
///
/// Either all four are given or none.
#[derive(Debug, Deserialize)]
pub struct RadiusQuery {
    /// Centre x.
    pub x: Option<i32>,
    /// Centre y.
    pub y: Option<i32>,
    /// Centre z.
    pub z: Option<i32>,
    /// Search radius in blocks.
    pub radius: Option<f64>,
}

/// Query parameters for `GET /api/waypoints/nearest`.
#[derive(Debug, Deserialize)]
pub struct NearestQuery {
    /// Position x.
    pub x: i32,
    /// Position y.
    pub y: i32,
    /// Position z.
    pub z: i32,
    /// Only consider waypoints of this type (snake case, e.g. `mine`).
    #[serde(rename = "type")]
    pub waypoint_type: Option<String>,
}

/// Query parameters for `GET /api/path`.
#[derive(Debug, Deserialize)]
pub struct PathQuery {
    /// Start position as `x,y,z`.
    pub from: String,
    /// Goal position as `x,y,z`.
    pub to: String,
}

// ---------------------------------------------------------------------------
// GET / -- status
// ---------------------------------------------------------------------------

/// Current counts of explored cells, queued tasks, and graph size.
pub async fn index<S: WorldSampler>(State(state): State<Arc<AppState<S>>>) -> impl IntoResponse {
    Json(state.atlas.status())
}

// ---------------------------------------------------------------------------
// Exploration
// ---------------------------------------------------------------------------

/// Scan every cell covering the requested square.
pub async fn request_scan<S: WorldSampler>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Json(request) = payload.map_err(|e| ObserverError::InvalidQuery(e.body_text()))?;
    let result = state.atlas.scan_area(request.center, request.radius).await?;
    tracing::info!(
        scan_id = %result.scan_id,
        scanned = result.areas.len(),
        skipped = result.cells_skipped,
        "Area scan served"
    );
    Ok(Json(result))
}

/// Queue unscanned cells around a centre.
pub async fn schedule_frontier<S: WorldSampler>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<FrontierRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Json(request) = payload.map_err(|e| ObserverError::InvalidQuery(e.body_text()))?;
    let scheduled = state.atlas.schedule_frontier(request.center, request.max_radius)?;
    Ok(Json(serde_json::json!({
        "scheduled": scheduled,
        "pending": state.atlas.scheduler().pending_count(),
    })))
}

/// Pop the most urgent live task. `task` is `null` when none is left.
pub async fn next_task<S: WorldSampler>(State(state): State<Arc<AppState<S>>>) -> impl IntoResponse {
    let task = state.atlas.next_task();
    Json(serde_json::json!({ "task": task }))
}

/// The explored area of one cell.
pub async fn get_cell<S: WorldSampler>(
    State(state): State<Arc<AppState<S>>>,
    path: Result<Path<(i32, i32)>, PathRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Path((cx, cz)) = path.map_err(|e| ObserverError::InvalidQuery(e.body_text()))?;
    let cell = CellCoordinate::new(cx, cz);
    let area = state
        .atlas
        .area(cell)
        .ok_or_else(|| ObserverError::NotFound(format!("cell {cell} has not been explored")))?;
    Ok(Json(area))
}

/// Stored danger zones, most dangerous first.
pub async fn list_danger<S: WorldSampler>(State(state): State<Arc<AppState<S>>>) -> impl IntoResponse {
    let zones = state.atlas.danger_zones();
    Json(serde_json::json!({
        "count": zones.len(),
        "zones": zones,
    }))
}

/// Replace the danger zone of a scanned cell.
pub async fn update_danger<S: WorldSampler>(
    State(state): State<Arc<AppState<S>>>,
    path: Result<Path<(i32, i32)>, PathRejection>,
    payload: Result<Json<DangerUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Path((cx, cz)) = path.map_err(|e| ObserverError::InvalidQuery(e.body_text()))?;
    let Json(update) = payload.map_err(|e| ObserverError::InvalidQuery(e.body_text()))?;
    if !(1..=10).contains(&update.level) {
        return Err(ObserverError::InvalidQuery(format!(
            "level must be within 1..=10, got {}",
            update.level
        )));
    }

    let zone = DangerZone {
        coordinate: CellCoordinate::new(cx, cz),
        level: update.level,
        primary_threat: update.primary_threat,
        active: update.active,
    };
    if !state.atlas.update_danger(zone.clone()) {
        return Err(ObserverError::NotFound(format!(
            "cell {} has not been explored",
            zone.coordinate
        )));
    }
    tracing::info!(cell = %zone.coordinate, level = zone.level, "Danger zone updated");
    Ok(Json(zone))
}

/// Mark a known resource as extracted.
pub async fn mark_extracted<S: WorldSampler>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<ExtractionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Json(request) = payload.map_err(|e| ObserverError::InvalidQuery(e.body_text()))?;
    if !state.atlas.mark_extracted(request.position) {
        return Err(ObserverError::NotFound(format!(
            "no resource known at {}",
            request.position
        )));
    }
    Ok(Json(serde_json::json!({
        "position": request.position,
        "extracted": true,
    })))
}

/// Suggested waypoints derived from explored cells.
pub async fn list_candidates<S: WorldSampler>(
    State(state): State<Arc<AppState<S>>>,
) -> impl IntoResponse {
    let candidates = state.atlas.candidate_waypoints();
    Json(serde_json::json!({
        "count": candidates.len(),
        "candidates": candidates,
    }))
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// All waypoints, or only active waypoints within `radius` of `x,y,z`
/// (nearest first).
pub async fn list_waypoints<S: WorldSampler>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<RadiusQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Query(params) = query.map_err(|e| ObserverError::InvalidQuery(e.body_text()))?;

    let waypoints = match (params.x, params.y, params.z, params.radius) {
        (None, None, None, None) => state.atlas.waypoints(),
        (Some(x), Some(y), Some(z), Some(radius)) => {
            if !radius.is_finite() || radius < 0.0 {
                return Err(ObserverError::InvalidQuery(format!(
                    "radius must be a non-negative number, got {radius}"
                )));
            }
            state.atlas.waypoints_within_radius(BlockPos::new(x, y, z), radius)
        }
        _ => {
            return Err(ObserverError::InvalidQuery(
                "x, y, z and radius must be given together".to_owned(),
            ));
        }
    };

    Ok(Json(serde_json::json!({
        "count": waypoints.len(),
        "waypoints": waypoints,
    })))
}

/// The nearest active waypoint, optionally of one type.
pub async fn nearest_waypoint<S: WorldSampler>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<NearestQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Query(params) = query.map_err(|e| ObserverError::InvalidQuery(e.body_text()))?;
    let filter = params
        .waypoint_type
        .as_deref()
        .map(parse_waypoint_type)
        .transpose()?;
    let position = BlockPos::new(params.x, params.y, params.z);

    let waypoint = state
        .atlas
        .nearest_waypoint(position, filter)
        .ok_or_else(|| ObserverError::NotFound(format!("no active waypoint near {position}")))?;
    Ok(Json(waypoint))
}

/// Create a waypoint. Responds `201 Created`.
pub async fn create_waypoint<S: WorldSampler>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CreateWaypointRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Json(request) = payload.map_err(|e| ObserverError::InvalidQuery(e.body_text()))?;
    let waypoint = state
        .atlas
        .create_waypoint(&request.name, request.position, request.waypoint_type)?;
    tracing::info!(name = %waypoint.name, position = %waypoint.position, "Waypoint created");
    Ok((StatusCode::CREATED, Json(waypoint)))
}

/// Create a road. Responds `201 Created`.
pub async fn create_road<S: WorldSampler>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<NewRoad>, JsonRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Json(new_road) = payload.map_err(|e| ObserverError::InvalidQuery(e.body_text()))?;
    let road = state.atlas.create_road(new_road)?;
    tracing::info!(id = %road.id, distance = road.distance, "Road created");
    Ok((StatusCode::CREATED, Json(road)))
}

/// Wear a road down one step.
pub async fn degrade_road<S: WorldSampler>(
    State(state): State<Arc<AppState<S>>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Path(id) = path.map_err(|e| ObserverError::InvalidQuery(e.body_text()))?;
    let road = state.atlas.degrade_road(&id)?;
    tracing::info!(id = %road.id, condition = ?road.condition, "Road degraded");
    Ok(Json(road))
}

/// Mend a road one step.
pub async fn repair_road<S: WorldSampler>(
    State(state): State<Arc<AppState<S>>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Path(id) = path.map_err(|e| ObserverError::InvalidQuery(e.body_text()))?;
    let road = state.atlas.repair_road(&id)?;
    tracing::info!(id = %road.id, condition = ?road.condition, "Road repaired");
    Ok(Json(road))
}

/// Navigation path between two positions. Never fails once the
/// positions parse.
pub async fn find_path<S: WorldSampler>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<PathQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Query(params) = query.map_err(|e| ObserverError::InvalidQuery(e.body_text()))?;
    let start = parse_position("from", &params.from)?;
    let goal = parse_position("to", &params.to)?;
    Ok(Json(state.atlas.find_path(start, goal)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_position(field: &str, raw: &str) -> Result<BlockPos, ObserverError> {
    raw.parse()
        .map_err(|e| ObserverError::InvalidQuery(format!("{field}: {e}")))
}

fn parse_waypoint_type(raw: &str) -> Result<WaypointType, ObserverError> {
    serde_json::from_value(serde_json::Value::String(raw.to_owned()))
        .map_err(|e| ObserverError::InvalidQuery(format!("type {raw}: {e}")))
}
