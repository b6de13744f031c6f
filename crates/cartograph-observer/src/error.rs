//! Error types for the query API.
//!
//! [`ObserverError`] wraps the library errors and maps each onto an HTTP
//! status through its [`ErrorKind`]. Every error response has the body
//! `{"error": message, "status": code}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cartograph_explore::ExploreError;
use cartograph_nav::NavError;
use cartograph_types::ErrorKind;

/// Errors that can occur in the query API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// A scan or scheduling request failed.
    #[error(transparent)]
    Explore(#[from] ExploreError),

    /// A graph mutation was rejected.
    #[error(transparent)]
    Nav(#[from] NavError),

    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A query string, path segment, or body could not be understood.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl ObserverError {
    /// Coarse classification of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Explore(e) => e.kind(),
            Self::Nav(e) => e.kind(),
            Self::NotFound(_) => ErrorKind::UnknownReference,
            Self::InvalidQuery(_) => ErrorKind::InvalidRequest,
        }
    }

    /// The HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::DuplicateIdentity => StatusCode::CONFLICT,
            ErrorKind::UnknownReference => StatusCode::NOT_FOUND,
            ErrorKind::CollaboratorFailure => StatusCode::BAD_GATEWAY,
            ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "Request failed");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
