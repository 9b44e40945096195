//! Failures surfaced while discovering or mutating networks.

use ductwork_grid::CellCoord;
use serde::{Deserialize, Serialize};

/// Errors from network discovery and mutation.
///
/// Each variant carries the coordinate that triggered the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum NetworkError {
    /// A cell was reached whose partition is not resident, and the walk had
    /// seen no chunk loader yet.
    #[error("partition not resident at {0}")]
    ChunkNotLoaded(CellCoord),
    /// One more segment would exceed the configured maximum.
    #[error("segment limit exceeded at {0}")]
    PipeTooLong(CellCoord),
    /// One more output would exceed the configured maximum.
    #[error("output limit exceeded at {0}")]
    TooManyOutputs(CellCoord),
}

impl NetworkError {
    /// The coordinate that triggered the failure.
    pub fn coord(&self) -> CellCoord {
        match self {
            NetworkError::ChunkNotLoaded(coord) => *coord,
            NetworkError::PipeTooLong(coord) => *coord,
            NetworkError::TooManyOutputs(coord) => *coord,
        }
    }
}
