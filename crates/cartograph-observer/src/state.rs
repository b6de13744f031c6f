//! Shared application state for the query API.

use std::sync::Arc;

use cartograph_core::Atlas;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. The atlas
/// synchronises itself, so handlers need no further locking.
#[derive(Debug)]
pub struct AppState<S> {
    /// All exploration and navigation state.
    pub atlas: Arc<Atlas<S>>,
}

impl<S> AppState<S> {
    /// Serve the given atlas.
    pub const fn new(atlas: Arc<Atlas<S>>) -> Self {
        Self { atlas }
    }
}
