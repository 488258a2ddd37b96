//! Missing-Data Cleaning Library
//!
//! This library chooses which rows and columns of a table to drop so that the
//! remaining cells meet a missing-data budget while keeping as many valid
//! cells as possible.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (PresenceMatrix, DataTable, CleanSolution)
//! - **solve**: Greedy heuristics (threshold elimination, row inclusion)
//! - **profile**: Missing-data profiling
//! - **pipeline**: Configuration, execution and reporting
//!
//! # Example
//!
//! ```no_run
//! use presence_clean::prelude::*;
//!
//! // Load data
//! let table = DataTable::from_tsv("data.tsv", "NA", 1, 1).unwrap();
//! let matrix = table.presence().unwrap();
//!
//! // Keep rows and columns with at most 10% missing data
//! let outcome = Cleaner::new()
//!     .max_missing(0.1)
//!     .floors(5, 5)
//!     .run(&matrix)
//!     .unwrap();
//!
//! table.write_tsv("cleaned.tsv", &outcome.solution).unwrap();
//! ```

pub mod data;
pub mod error;
pub mod pipeline;
pub mod profile;
pub mod solve;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::data::{count_valid_kept, CleanSolution, DataTable, MissingData, PresenceMatrix};
    pub use crate::error::{CleanError, Result};
    pub use crate::pipeline::{
        clean_matrix, CandidateSummary, CleanConfig, CleanOutcome, CleanReport, Cleaner, Heuristic,
    };
    pub use crate::profile::{profile_missingness, MissingnessProfile};
    pub use crate::solve::{
        // Threshold elimination
        elimination_step, Axis, EliminationParams, EliminationState, Removal,
        ThresholdEliminationSolver, Trigger,
        // Row inclusion
        inclusion_step, Inclusion, InclusionGreedySolver, InclusionState, RowScore,
        LOCALITY_WINDOW,
    };
}
