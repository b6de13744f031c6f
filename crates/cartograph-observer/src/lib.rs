//! HTTP query API for Cartograph.
//!
//! An Axum server exposing the exploration scheduler and the waypoint
//! router: area scans, frontier scheduling, cell and danger lookups,
//! waypoint and road creation, and path finding. Bodies are JSON; every
//! error is `{"error": message, "status": code}`.
//!
//! # Modules
//!
//! - [`router`] -- [`build_router`]: routes plus CORS and tracing layers.
//! - [`handlers`] -- One handler per endpoint.
//! - [`state`] -- [`AppState`] shared with every handler.
//! - [`server`] -- Binding, serving, and spawning on a background task.
//! - [`error`] -- [`ObserverError`] and its HTTP mapping.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ObserverError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, spawn_observer, start_server};
pub use state::AppState;
