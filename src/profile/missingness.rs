//! Missingness profiling for presence matrices.

use crate::data::MissingData;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Profile of missing data in a matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingnessProfile {
    /// Number of rows.
    pub n_rows: usize,
    /// Number of columns.
    pub n_cols: usize,
    /// Total number of cells (rows × columns).
    pub total_cells: usize,
    /// Number of valid cells.
    pub valid_cells: usize,
    /// Number of missing cells.
    pub missing_cells: usize,
    /// Overall missing fraction.
    pub missing_fraction: f64,
    /// Missing fraction per row.
    pub row_missing: Vec<f64>,
    /// Missing fraction per column.
    pub col_missing: Vec<f64>,
    /// Lowest row missing fraction.
    pub min_row_missing: f64,
    /// Highest row missing fraction.
    pub max_row_missing: f64,
    /// Lowest column missing fraction.
    pub min_col_missing: f64,
    /// Highest column missing fraction.
    pub max_col_missing: f64,
    /// Rows with no missing cells.
    pub complete_rows: usize,
    /// Columns with no missing cells.
    pub complete_cols: usize,
}

impl MissingnessProfile {
    /// Whether the matrix has no missing cells at all.
    pub fn is_complete(&self) -> bool {
        self.missing_cells == 0
    }

    /// Rows whose missing fraction exceeds `max_missing`.
    pub fn rows_over(&self, max_missing: f64) -> usize {
        self.row_missing.iter().filter(|&&m| m > max_missing).count()
    }

    /// Columns whose missing fraction exceeds `max_missing`.
    pub fn cols_over(&self, max_missing: f64) -> usize {
        self.col_missing.iter().filter(|&&m| m > max_missing).count()
    }
}

impl std::fmt::Display for MissingnessProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Missingness Profile")?;
        writeln!(f, "  Dimensions:        {} x {}", self.n_rows, self.n_cols)?;
        writeln!(f, "  Total cells:       {}", self.total_cells)?;
        writeln!(f, "  Valid cells:       {}", self.valid_cells)?;
        writeln!(f, "  Missing cells:     {}", self.missing_cells)?;
        writeln!(f, "  Overall missing:   {:.2}%", self.missing_fraction * 100.0)?;
        writeln!(
            f,
            "  Row missing:       {:.2}% - {:.2}%",
            self.min_row_missing * 100.0,
            self.max_row_missing * 100.0
        )?;
        writeln!(
            f,
            "  Column missing:    {:.2}% - {:.2}%",
            self.min_col_missing * 100.0,
            self.max_col_missing * 100.0
        )?;
        writeln!(f, "  Complete rows:     {}", self.complete_rows)?;
        writeln!(f, "  Complete columns:  {}", self.complete_cols)?;
        Ok(())
    }
}

/// Profile the missing data of a matrix.
pub fn profile_missingness<M: MissingData + Sync + ?Sized>(matrix: &M) -> MissingnessProfile {
    let n_rows = matrix.n_rows();
    let n_cols = matrix.n_cols();
    let total_cells = n_rows * n_cols;

    let row_counts: Vec<usize> = (0..n_rows)
        .into_par_iter()
        .map(|i| (0..n_cols).filter(|&j| matrix.is_missing(i, j)).count())
        .collect();
    let col_counts: Vec<usize> = (0..n_cols)
        .into_par_iter()
        .map(|j| (0..n_rows).filter(|&i| matrix.is_missing(i, j)).count())
        .collect();

    let missing_cells: usize = row_counts.iter().sum();
    let row_missing = fractions(&row_counts, n_cols);
    let col_missing = fractions(&col_counts, n_rows);
    let (min_row_missing, max_row_missing) = min_max(&row_missing);
    let (min_col_missing, max_col_missing) = min_max(&col_missing);

    MissingnessProfile {
        n_rows,
        n_cols,
        total_cells,
        valid_cells: total_cells - missing_cells,
        missing_cells,
        missing_fraction: if total_cells == 0 {
            0.0
        } else {
            missing_cells as f64 / total_cells as f64
        },
        complete_rows: row_counts.iter().filter(|&&c| c == 0).count(),
        complete_cols: col_counts.iter().filter(|&&c| c == 0).count(),
        row_missing,
        col_missing,
        min_row_missing,
        max_row_missing,
        min_col_missing,
        max_col_missing,
    }
}

fn fractions(counts: &[usize], total: usize) -> Vec<f64> {
    counts
        .iter()
        .map(|&c| if total == 0 { 0.0 } else { c as f64 / total as f64 })
        .collect()
}

fn min_max(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}
