//! Error types for the presence-clean library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum CleanError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid mask value '{value}' on line {line}")]
    InvalidMaskValue { value: String, line: usize },

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Both floors are binding but some kept row or column is still over budget.
    #[error(
        "Matrix is at dimension limit ({min_rows} x {min_cols}) but fails the missing-data budget"
    )]
    InfeasibleFloor { min_rows: usize, min_cols: usize },

    /// Solver bookkeeping disagrees with what the control flow guarantees.
    #[error("Solver invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Need to remove {needed} entries with missing data but only {available} are available")]
    InsufficientCandidates { needed: usize, available: usize },

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CleanError {
    /// True for errors raised by a solver because the requested floors or
    /// budget cannot be met, as opposed to I/O or parameter problems.
    pub fn is_infeasible(&self) -> bool {
        matches!(
            self,
            CleanError::InfeasibleFloor { .. } | CleanError::InsufficientCandidates { .. }
        )
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, CleanError>;
