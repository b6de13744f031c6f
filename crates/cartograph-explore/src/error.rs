//! Error types for the `cartograph-explore` crate.

use cartograph_types::{CellCoordinate, ErrorKind};

use crate::sampler::SampleError;

/// Errors that can occur while scanning or scheduling exploration.
#[derive(Debug, thiserror::Error)]
pub enum ExploreError {
    /// The world sampler failed part-way through a cell.
    ///
    /// The failing cell was not recorded and stays eligible for a retry.
    /// Cells committed earlier in the same request remain committed.
    #[error(
        "world sampler failed while scanning cell {cell} ({committed} cells committed before the failure): {source}"
    )]
    CollaboratorFailure {
        /// The cell whose scan was abandoned.
        cell: CellCoordinate,
        /// Cells from the same request that were committed before the failure.
        committed: usize,
        /// The underlying sampler error.
        source: SampleError,
    },

    /// The requested scan radius exceeds the configured maximum.
    #[error("scan radius {radius} exceeds the maximum of {max}")]
    RadiusTooLarge {
        /// The requested radius.
        radius: u32,
        /// The configured maximum.
        max: u32,
    },
}

impl ExploreError {
    /// Coarse classification of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::CollaboratorFailure { .. } => ErrorKind::CollaboratorFailure,
            Self::RadiusTooLarge { .. } => ErrorKind::InvalidRequest,
        }
    }
}
