//! Axum router construction for the query API.
//!
//! Assembles all routes into a single [`Router`] with CORS and request
//! tracing enabled.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use cartograph_explore::WorldSampler;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- status counts
/// - `POST /api/scans` -- scan an area
/// - `POST /api/frontier` -- queue frontier cells
/// - `POST /api/frontier/next` -- pop the next task
/// - `GET /api/cells/{cx}/{cz}` -- explored area of one cell
/// - `GET /api/danger` -- stored danger zones
/// - `PUT /api/danger/{cx}/{cz}` -- replace a cell's danger zone
/// - `POST /api/resources/extracted` -- mark a resource extracted
/// - `GET /api/candidates` -- suggested waypoints
/// - `GET /api/waypoints` -- all waypoints, or those within a radius
/// - `GET /api/waypoints/nearest` -- nearest active waypoint
/// - `POST /api/waypoints` -- create a waypoint
/// - `POST /api/roads` -- create a road
/// - `POST /api/roads/{id}/degrade` -- wear a road down
/// - `POST /api/roads/{id}/repair` -- mend a road
/// - `GET /api/path` -- navigation path between two positions
pub fn build_router<S: WorldSampler + 'static>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index::<S>))
        // Exploration
        .route("/api/scans", post(handlers::request_scan::<S>))
        .route("/api/frontier", post(handlers::schedule_frontier::<S>))
        .route("/api/frontier/next", post(handlers::next_task::<S>))
        .route("/api/cells/{cx}/{cz}", get(handlers::get_cell::<S>))
        .route("/api/danger", get(handlers::list_danger::<S>))
        .route("/api/danger/{cx}/{cz}", put(handlers::update_danger::<S>))
        .route("/api/resources/extracted", post(handlers::mark_extracted::<S>))
        .route("/api/candidates", get(handlers::list_candidates::<S>))
        // Navigation
        .route(
            "/api/waypoints",
            get(handlers::list_waypoints::<S>).post(handlers::create_waypoint::<S>),
        )
        .route("/api/waypoints/nearest", get(handlers::nearest_waypoint::<S>))
        .route("/api/roads", post(handlers::create_road::<S>))
        .route("/api/roads/{id}/degrade", post(handlers::degrade_road::<S>))
        .route("/api/roads/{id}/repair", post(handlers::repair_road::<S>))
        .route("/api/path", get(handlers::find_path::<S>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
