//! Presence/absence matrix recording which cells of a table hold valid data.

use crate::error::{CleanError, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use sprs::CsMat;

/// Read-only view of a grid of cells that are either present or missing.
///
/// The solvers only ever talk to this trait, so any table representation can
/// be cleaned without first copying it into a [`PresenceMatrix`].
pub trait MissingData {
    /// Number of rows.
    fn n_rows(&self) -> usize;

    /// Number of columns.
    fn n_cols(&self) -> usize;

    /// Whether the cell at (row, col) is missing.
    fn is_missing(&self, row: usize, col: usize) -> bool;

    /// Total number of cells.
    fn n_cells(&self) -> usize {
        self.n_rows() * self.n_cols()
    }
}

impl<M: MissingData + ?Sized> MissingData for &M {
    fn n_rows(&self) -> usize {
        (**self).n_rows()
    }

    fn n_cols(&self) -> usize {
        (**self).n_cols()
    }

    fn is_missing(&self, row: usize, col: usize) -> bool {
        (**self).is_missing(row, col)
    }
}

/// Dense boolean presence matrix.
///
/// Cells are stored row-major; `true` means the cell holds valid data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceMatrix {
    n_rows: usize,
    n_cols: usize,
    present: Vec<bool>,
}

impl PresenceMatrix {
    /// Create a matrix from row-major presence flags.
    pub fn new(n_rows: usize, n_cols: usize, present: Vec<bool>) -> Result<Self> {
        if present.len() != n_rows * n_cols {
            return Err(CleanError::DimensionMismatch {
                expected: n_rows * n_cols,
                actual: present.len(),
            });
        }
        Ok(Self {
            n_rows,
            n_cols,
            present,
        })
    }

    /// Create a fully present matrix.
    pub fn full(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            present: vec![true; n_rows * n_cols],
        }
    }

    /// Create a matrix from per-row presence flags. All rows must have the same length.
    pub fn from_rows(rows: &[Vec<bool>]) -> Result<Self> {
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut present = Vec::with_capacity(rows.len() * n_cols);
        for row in rows {
            if row.len() != n_cols {
                return Err(CleanError::DimensionMismatch {
                    expected: n_cols,
                    actual: row.len(),
                });
            }
            present.extend_from_slice(row);
        }
        Self::new(rows.len(), n_cols, present)
    }

    /// Create a matrix where only the listed (row, col) cells are missing.
    pub fn from_missing_cells(
        n_rows: usize,
        n_cols: usize,
        missing: &[(usize, usize)],
    ) -> Result<Self> {
        let mut matrix = Self::full(n_rows, n_cols);
        for &(row, col) in missing {
            if row >= n_rows || col >= n_cols {
                return Err(CleanError::InvalidParameter(format!(
                    "Missing cell ({}, {}) out of bounds for {} x {} matrix",
                    row, col, n_rows, n_cols
                )));
            }
            matrix.present[row * n_cols + col] = false;
        }
        Ok(matrix)
    }

    /// Create from a dense numeric matrix, treating NaN entries as missing.
    pub fn from_dense(data: &DMatrix<f64>) -> Self {
        let (n_rows, n_cols) = data.shape();
        let mut present = Vec::with_capacity(n_rows * n_cols);
        for row in 0..n_rows {
            for col in 0..n_cols {
                present.push(!data[(row, col)].is_nan());
            }
        }
        Self {
            n_rows,
            n_cols,
            present,
        }
    }

    /// Create from a sparse matrix, treating stored entries as present and
    /// everything else as missing.
    pub fn from_sparse<N>(data: &CsMat<N>) -> Self {
        let (n_rows, n_cols) = data.shape();
        let mut present = vec![false; n_rows * n_cols];
        for (_, (row, col)) in data.iter() {
            present[row * n_cols + col] = true;
        }
        Self {
            n_rows,
            n_cols,
            present,
        }
    }

    /// Whether the cell at (row, col) holds valid data.
    #[inline]
    pub fn is_present(&self, row: usize, col: usize) -> bool {
        self.present[row * self.n_cols + col]
    }

    /// Presence flags of a single row.
    #[inline]
    pub fn row(&self, row: usize) -> &[bool] {
        &self.present[row * self.n_cols..(row + 1) * self.n_cols]
    }

    /// Total number of valid cells.
    pub fn n_valid(&self) -> usize {
        self.present.iter().filter(|&&p| p).count()
    }

    /// Number of valid cells in a row.
    pub fn n_valid_in_row(&self, row: usize) -> usize {
        self.row(row).iter().filter(|&&p| p).count()
    }

    /// Number of valid cells in a column.
    pub fn n_valid_in_col(&self, col: usize) -> usize {
        (0..self.n_rows).filter(|&row| self.is_present(row, col)).count()
    }

    /// Subset the matrix to the rows and columns flagged in the masks.
    pub fn subset(&self, rows_to_keep: &[bool], cols_to_keep: &[bool]) -> Result<Self> {
        check_mask_lengths(self, rows_to_keep, cols_to_keep)?;

        let kept_cols: Vec<usize> = cols_to_keep
            .iter()
            .enumerate()
            .filter(|(_, &keep)| keep)
            .map(|(j, _)| j)
            .collect();

        let mut present = Vec::new();
        let mut n_rows = 0;
        for (row, _) in rows_to_keep.iter().enumerate().filter(|(_, &keep)| keep) {
            n_rows += 1;
            present.extend(kept_cols.iter().map(|&col| self.is_present(row, col)));
        }

        Self::new(n_rows, kept_cols.len(), present)
    }

    /// Sparse matrix with a stored `1` for each present cell.
    pub fn to_sparse(&self) -> CsMat<u8> {
        let mut tri_mat = sprs::TriMat::new((self.n_rows, self.n_cols));
        for row in 0..self.n_rows {
            for col in 0..self.n_cols {
                if self.is_present(row, col) {
                    tri_mat.add_triplet(row, col, 1u8);
                }
            }
        }
        tri_mat.to_csr()
    }
}

impl MissingData for PresenceMatrix {
    #[inline]
    fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    fn n_cols(&self) -> usize {
        self.n_cols
    }

    #[inline]
    fn is_missing(&self, row: usize, col: usize) -> bool {
        !self.is_present(row, col)
    }
}

/// Count the valid cells retained by a pair of keep-masks.
pub fn count_valid_kept<M: MissingData + ?Sized>(
    matrix: &M,
    rows_to_keep: &[bool],
    cols_to_keep: &[bool],
) -> Result<usize> {
    check_mask_lengths(matrix, rows_to_keep, cols_to_keep)?;

    let mut count = 0;
    for (row, _) in rows_to_keep.iter().enumerate().filter(|(_, &keep)| keep) {
        count += cols_to_keep
            .iter()
            .enumerate()
            .filter(|&(col, &keep)| keep && !matrix.is_missing(row, col))
            .count();
    }
    Ok(count)
}

fn check_mask_lengths<M: MissingData + ?Sized>(
    matrix: &M,
    rows_to_keep: &[bool],
    cols_to_keep: &[bool],
) -> Result<()> {
    if rows_to_keep.len() != matrix.n_rows() {
        return Err(CleanError::DimensionMismatch {
            expected: matrix.n_rows(),
            actual: rows_to_keep.len(),
        });
    }
    if cols_to_keep.len() != matrix.n_cols() {
        return Err(CleanError::DimensionMismatch {
            expected: matrix.n_cols(),
            actual: cols_to_keep.len(),
        });
    }
    Ok(())
}
