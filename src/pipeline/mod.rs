//! Cleaning configuration, execution and reporting.

mod runner;

pub use runner::{
    clean_matrix, CandidateSummary, CleanConfig, CleanOutcome, CleanReport, Cleaner, Heuristic,
};
