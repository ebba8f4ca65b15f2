// Error types for dataset loading and statistics queries.

use std::path::PathBuf;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Dataset provider errors
// ---------------------------------------------------------------------------

/// Failures while resolving or reading a division's dataset.
///
/// Every variant other than `NotFound` means the backing snapshot is corrupt
/// or unreadable and should be reported as a server-side failure.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("no dataset for division '{division}'")]
    NotFound {
        division: String,
        path: Option<PathBuf>,
    },

    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed CSV in division '{division}': {source}")]
    Malformed {
        division: String,
        source: csv::Error,
    },

    #[error("data integrity error in division '{division}', line {line}, column `{column}`: {message}")]
    Integrity {
        division: String,
        line: u64,
        column: String,
        message: String,
    },
}

impl DatasetError {
    /// Whether the snapshot exists but cannot be trusted.
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            DatasetError::Malformed { .. } | DatasetError::Integrity { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Query errors
// ---------------------------------------------------------------------------

/// Failures surfaced by catalog, aggregate, and ranking queries.
///
/// Validation variants carry the authoritative list of valid values so a
/// caller can render a correction.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("invalid player name '{name}', valid players: {valid:?}")]
    UnknownPlayer { name: String, valid: Vec<String> },

    #[error("invalid team name '{name}', valid teams: {valid:?}")]
    UnknownTeam { name: String, valid: Vec<String> },

    #[error("invalid track name '{name}', valid tracks: {valid:?}")]
    UnknownTrack { name: String, valid: Vec<String> },

    #[error("'{name}' is not a valid search option, valid options: {valid:?}")]
    InvalidDimension { name: String, valid: Vec<String> },

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

impl StatsError {
    /// True for user-input errors that must not be retried unchanged.
    pub fn is_validation(&self) -> bool {
        !matches!(self, StatsError::Dataset(_))
    }

    /// The valid-value list attached to a validation error.
    pub fn valid_values(&self) -> Option<&[String]> {
        match self {
            StatsError::UnknownPlayer { valid, .. }
            | StatsError::UnknownTeam { valid, .. }
            | StatsError::UnknownTrack { valid, .. }
            | StatsError::InvalidDimension { valid, .. } => Some(valid),
            StatsError::Dataset(_) => None,
        }
    }
}
