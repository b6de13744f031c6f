//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error that `main` propagates with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: cartograph_core::ConfigError,
    },

    /// The query API could not be started.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying server error.
        #[from]
        source: cartograph_observer::ServerError,
    },

    /// The log subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}
