use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::types::{Locator, SourceId};

/// Error type for sampling, record integrity, and source failures.
#[derive(Debug, Error)]
pub enum PairsError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("malformed country record: {0}")]
    DataIntegrity(String),
    #[error("source '{source_id}' failed fetching '{locator}': {reason}")]
    FetchFailure {
        source_id: SourceId,
        locator: Locator,
        reason: String,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl PairsError {
    /// Coarse classification exposed to the presentation layer.
    pub fn kind(&self) -> FailureKind {
        match self {
            PairsError::InvalidArgument(_) | PairsError::Configuration(_) => {
                FailureKind::InvalidArgument
            }
            PairsError::DataIntegrity(_) => FailureKind::DataIntegrity,
            PairsError::FetchFailure { .. } | PairsError::Io(_) => FailureKind::FetchFailure,
        }
    }
}

/// Serializable failure category recorded on a failed cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidArgument,
    DataIntegrity,
    FetchFailure,
}
