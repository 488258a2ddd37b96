//! Row and column keep-masks produced by a cleaning run.

use crate::data::{count_valid_kept, MissingData};
use crate::error::{CleanError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// A pair of keep-masks: `true` marks a row or column that survives cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanSolution {
    rows_to_keep: Vec<bool>,
    cols_to_keep: Vec<bool>,
}

impl CleanSolution {
    /// Create a solution from explicit masks.
    pub fn new(rows_to_keep: Vec<bool>, cols_to_keep: Vec<bool>) -> Self {
        Self {
            rows_to_keep,
            cols_to_keep,
        }
    }

    /// A solution keeping every row and column.
    pub fn keep_all(n_rows: usize, n_cols: usize) -> Self {
        Self::new(vec![true; n_rows], vec![true; n_cols])
    }

    /// Row keep-mask.
    #[inline]
    pub fn rows_to_keep(&self) -> &[bool] {
        &self.rows_to_keep
    }

    /// Column keep-mask.
    #[inline]
    pub fn cols_to_keep(&self) -> &[bool] {
        &self.cols_to_keep
    }

    /// Indices of the kept rows.
    pub fn kept_rows(&self) -> impl Iterator<Item = usize> + '_ {
        kept_indices(&self.rows_to_keep)
    }

    /// Indices of the kept columns.
    pub fn kept_cols(&self) -> impl Iterator<Item = usize> + '_ {
        kept_indices(&self.cols_to_keep)
    }

    /// Number of rows kept.
    pub fn n_rows_kept(&self) -> usize {
        self.rows_to_keep.iter().filter(|&&k| k).count()
    }

    /// Number of columns kept.
    pub fn n_cols_kept(&self) -> usize {
        self.cols_to_keep.iter().filter(|&&k| k).count()
    }

    /// Number of valid cells of `matrix` retained by this solution.
    pub fn n_valid_kept<M: MissingData + ?Sized>(&self, matrix: &M) -> Result<usize> {
        count_valid_kept(matrix, &self.rows_to_keep, &self.cols_to_keep)
    }

    /// Largest missing fraction over kept rows and kept columns.
    ///
    /// Returns 0.0 when nothing is kept.
    pub fn max_missing_fraction<M: MissingData + ?Sized>(&self, matrix: &M) -> Result<f64> {
        self.check_dimensions(matrix.n_rows(), matrix.n_cols())?;
        let rows: Vec<usize> = self.kept_rows().collect();
        let cols: Vec<usize> = self.kept_cols().collect();

        let mut worst: f64 = 0.0;
        for &i in &rows {
            let missing = cols.iter().filter(|&&j| matrix.is_missing(i, j)).count();
            worst = worst.max(missing as f64 / cols.len() as f64);
        }
        for &j in &cols {
            let missing = rows.iter().filter(|&&i| matrix.is_missing(i, j)).count();
            worst = worst.max(missing as f64 / rows.len() as f64);
        }
        Ok(worst)
    }

    /// Check that the masks match a matrix of the given dimensions.
    pub fn check_dimensions(&self, n_rows: usize, n_cols: usize) -> Result<()> {
        if self.rows_to_keep.len() != n_rows {
            return Err(CleanError::DimensionMismatch {
                expected: n_rows,
                actual: self.rows_to_keep.len(),
            });
        }
        if self.cols_to_keep.len() != n_cols {
            return Err(CleanError::DimensionMismatch {
                expected: n_cols,
                actual: self.cols_to_keep.len(),
            });
        }
        Ok(())
    }

    /// Write the solution as two tab-separated lines of `0`/`1` flags,
    /// rows first, then columns.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", format_mask(&self.rows_to_keep))?;
        writeln!(writer, "{}", format_mask(&self.cols_to_keep))?;
        writer.flush()?;
        Ok(())
    }

    /// Read a solution written by [`CleanSolution::write_to_file`] and check
    /// it against the expected dimensions.
    pub fn read_from_file<P: AsRef<Path>>(path: P, n_rows: usize, n_cols: usize) -> Result<Self> {
        let file = File::open(path)?;
        let mut lines = BufReader::new(file).lines();

        let rows_line = lines
            .next()
            .ok_or_else(|| CleanError::EmptyData("Solution file has no row mask".to_string()))??;
        let cols_line = lines.next().ok_or_else(|| {
            CleanError::EmptyData("Solution file has no column mask".to_string())
        })??;

        let solution = Self::new(parse_mask(&rows_line, 1)?, parse_mask(&cols_line, 2)?);
        solution.check_dimensions(n_rows, n_cols)?;
        Ok(solution)
    }
}

impl std::fmt::Display for CleanSolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {} rows x {} of {} columns",
            self.n_rows_kept(),
            self.rows_to_keep.len(),
            self.n_cols_kept(),
            self.cols_to_keep.len()
        )
    }
}

fn kept_indices(mask: &[bool]) -> impl Iterator<Item = usize> + '_ {
    mask.iter()
        .enumerate()
        .filter(|(_, &keep)| keep)
        .map(|(i, _)| i)
}

fn format_mask(mask: &[bool]) -> String {
    mask.iter()
        .map(|&keep| if keep { "1" } else { "0" })
        .collect::<Vec<_>>()
        .join("\t")
}

fn parse_mask(line: &str, line_number: usize) -> Result<Vec<bool>> {
    if line.trim().is_empty() {
        return Ok(Vec::new());
    }
    line.trim_end()
        .split('\t')
        .map(|token| match token.trim() {
            "1" => Ok(true),
            "0" => Ok(false),
            other => Err(CleanError::InvalidMaskValue {
                value: other.to_string(),
                line: line_number,
            }),
        })
        .collect()
}
