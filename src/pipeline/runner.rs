//! Cleaning runner: configures the heuristics, runs them and picks a result.

use crate::data::{CleanSolution, MissingData};
use crate::error::{CleanError, Result};
use crate::solve::{EliminationParams, InclusionGreedySolver, ThresholdEliminationSolver};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Heuristic that produced a candidate solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Heuristic {
    /// Remove rows and columns until the budget is met.
    ThresholdElimination,
    /// Add rows to a block with no missing cells.
    RowInclusion,
}

impl std::fmt::Display for Heuristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Heuristic::ThresholdElimination => write!(f, "threshold elimination"),
            Heuristic::RowInclusion => write!(f, "row inclusion"),
        }
    }
}

/// Cleaning configuration for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanConfig {
    /// Name of the run.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Largest missing fraction allowed in a kept row or column.
    pub max_missing: f64,
    /// Minimum number of rows to keep.
    pub min_rows: usize,
    /// Minimum number of columns to keep.
    pub min_cols: usize,
    /// Token marking a missing cell in input tables.
    pub na_symbol: String,
    /// Leading lines of the table carried through as headers.
    pub header_rows: usize,
    /// Leading fields of each line carried through as row labels.
    pub header_cols: usize,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            name: "unnamed".to_string(),
            description: None,
            max_missing: 0.0,
            min_rows: 0,
            min_cols: 0,
            na_symbol: "NA".to_string(),
            header_rows: 1,
            header_cols: 1,
        }
    }
}

impl CleanConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(CleanError::from)
    }

    /// Check values that do not depend on the data.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.max_missing) {
            return Err(CleanError::InvalidParameter(format!(
                "max_missing must be between 0 and 1, got {}",
                self.max_missing
            )));
        }
        if self.na_symbol.is_empty() {
            return Err(CleanError::InvalidParameter(
                "NA symbol must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of one heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub heuristic: Heuristic,
    pub n_rows_kept: usize,
    pub n_cols_kept: usize,
    pub n_valid_kept: usize,
    /// Whether the candidate keeps at least the requested rows and columns.
    pub meets_floors: bool,
}

/// Summary of a cleaning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanReport {
    pub name: String,
    pub max_missing: f64,
    pub min_rows: usize,
    pub min_cols: usize,
    /// Input rows.
    pub n_rows: usize,
    /// Input columns.
    pub n_cols: usize,
    /// Valid cells in the input.
    pub n_valid: usize,
    /// Every candidate considered, elimination first.
    pub candidates: Vec<CandidateSummary>,
    /// The candidate returned.
    pub chosen: Heuristic,
}

impl CleanReport {
    /// Summary of the chosen candidate.
    pub fn chosen_summary(&self) -> Option<&CandidateSummary> {
        self.candidates.iter().find(|c| c.heuristic == self.chosen)
    }
}

impl std::fmt::Display for CleanReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Clean Report ({})", self.name)?;
        writeln!(f, "  Budget:            {:.2}%", self.max_missing * 100.0)?;
        writeln!(f, "  Floors:            {} x {}", self.min_rows, self.min_cols)?;
        writeln!(
            f,
            "  Input:             {} x {} ({} valid cells)",
            self.n_rows, self.n_cols, self.n_valid
        )?;
        for c in &self.candidates {
            writeln!(
                f,
                "  {:<22} {} x {} ({} valid cells){}",
                format!("{}:", c.heuristic),
                c.n_rows_kept,
                c.n_cols_kept,
                c.n_valid_kept,
                if c.meets_floors { "" } else { " below floors" }
            )?;
        }
        writeln!(f, "  Chosen:            {}", self.chosen)?;
        Ok(())
    }
}

/// Chosen solution together with the report describing how it was chosen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanOutcome {
    pub solution: CleanSolution,
    pub report: CleanReport,
}

/// Builder for configuring and running a cleaning pass.
#[derive(Debug, Clone)]
pub struct Cleaner {
    name: String,
    max_missing: f64,
    min_rows: usize,
    min_cols: usize,
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new()
    }
}

impl Cleaner {
    /// Zero budget, no floors.
    pub fn new() -> Self {
        Self {
            name: "unnamed".to_string(),
            max_missing: 0.0,
            min_rows: 0,
            min_cols: 0,
        }
    }

    /// Create from a config.
    pub fn from_config(config: &CleanConfig) -> Self {
        Self {
            name: config.name.clone(),
            max_missing: config.max_missing,
            min_rows: config.min_rows,
            min_cols: config.min_cols,
        }
    }

    /// Set the run name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Set the missing-data budget.
    pub fn max_missing(mut self, max_missing: f64) -> Self {
        self.max_missing = max_missing;
        self
    }

    /// Set the row and column floors.
    pub fn floors(mut self, min_rows: usize, min_cols: usize) -> Self {
        self.min_rows = min_rows;
        self.min_cols = min_cols;
        self
    }

    /// Run on a matrix.
    ///
    /// Threshold elimination always runs. With a zero budget, row inclusion
    /// runs as well and wins if it meets the floors and keeps strictly more
    /// valid cells.
    pub fn run<M: MissingData + ?Sized>(&self, matrix: &M) -> Result<CleanOutcome> {
        let params =
            EliminationParams::new(self.max_missing).with_floors(self.min_rows, self.min_cols);
        let mut elimination = ThresholdEliminationSolver::from_params(matrix, params)?;
        let mut solution = elimination.solve()?;

        let mut candidates = vec![self.summarize(matrix, Heuristic::ThresholdElimination, &solution)?];
        let mut chosen = Heuristic::ThresholdElimination;

        if self.max_missing == 0.0 {
            let mut inclusion = InclusionGreedySolver::with_floors(matrix, self.min_rows, self.min_cols)?;
            let included = inclusion.solve()?;
            let summary = self.summarize(matrix, Heuristic::RowInclusion, &included)?;

            if !summary.meets_floors {
                tracing::warn!(
                    rows = summary.n_rows_kept,
                    cols = summary.n_cols_kept,
                    "row inclusion result is below the floors, keeping threshold elimination"
                );
            } else if summary.n_valid_kept > candidates[0].n_valid_kept {
                chosen = Heuristic::RowInclusion;
                solution = included;
            }
            candidates.push(summary);
        }

        let report = CleanReport {
            name: self.name.clone(),
            max_missing: self.max_missing,
            min_rows: self.min_rows,
            min_cols: self.min_cols,
            n_rows: matrix.n_rows(),
            n_cols: matrix.n_cols(),
            n_valid: CleanSolution::keep_all(matrix.n_rows(), matrix.n_cols())
                .n_valid_kept(matrix)?,
            candidates,
            chosen,
        };

        tracing::info!(
            chosen = %report.chosen,
            rows_kept = solution.n_rows_kept(),
            cols_kept = solution.n_cols_kept(),
            "cleaning finished"
        );

        Ok(CleanOutcome { solution, report })
    }

    fn summarize<M: MissingData + ?Sized>(
        &self,
        matrix: &M,
        heuristic: Heuristic,
        solution: &CleanSolution,
    ) -> Result<CandidateSummary> {
        let n_rows_kept = solution.n_rows_kept();
        let n_cols_kept = solution.n_cols_kept();
        Ok(CandidateSummary {
            heuristic,
            n_rows_kept,
            n_cols_kept,
            n_valid_kept: solution.n_valid_kept(matrix)?,
            meets_floors: n_rows_kept >= self.min_rows && n_cols_kept >= self.min_cols,
        })
    }
}

/// Convenience function to clean a matrix with a budget and no floors.
pub fn clean_matrix<M: MissingData + ?Sized>(
    matrix: &M,
    max_missing: f64,
) -> Result<CleanSolution> {
    Cleaner::new()
        .max_missing(max_missing)
        .run(matrix)
        .map(|outcome| outcome.solution)
}
