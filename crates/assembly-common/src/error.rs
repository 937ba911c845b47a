//! Error types for the Assembly planner.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by planning queries.
///
/// Only the top-level lookup can fail. Anything below the target that has no
/// producing recipe is treated as a raw material, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerError {
    /// The requested target item has no producing recipe.
    #[error("No recipe produces item '{item}'")]
    NotFound {
        /// Item that was requested
        item: String,
    },
}

impl PlannerError {
    /// Builds a [`PlannerError::NotFound`] for `item`.
    #[must_use]
    pub fn not_found(item: impl Into<String>) -> Self {
        Self::NotFound { item: item.into() }
    }
}

/// Errors raised while loading a production dataset.
///
/// These are fatal at startup; nothing in the planner recovers from them.
#[derive(Debug, Error)]
pub enum DataError {
    /// Dataset file could not be read
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        /// File that failed to load
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Dataset is not valid JSON or does not match the expected shape
    #[error("Failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),

    /// Dataset parsed but violates a structural rule
    #[error("Invalid dataset: {0}")]
    Validation(String),

    /// Schema version mismatch
    #[error("Dataset version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Version this build understands
        expected: String,
        /// Version found in the file
        actual: String,
    },
}

/// Result type alias for planning queries.
pub type PlannerResult<T> = Result<T, PlannerError>;

/// Result type alias for dataset loading.
pub type DataResult<T> = Result<T, DataError>;
