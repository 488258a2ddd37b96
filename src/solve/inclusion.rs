//! Zero-missing inclusion heuristic.
//!
//! Starts with no rows and every column, then adds rows one at a time. Each
//! added row prunes the columns it is missing in, so the included block never
//! contains a missing cell. The best `rows x cols` snapshot seen is returned.

use super::rank::first_max_by_key;
use crate::data::{CleanSolution, MissingData};
use crate::error::{CleanError, Result};

/// How far below the best alpha an excluded row may be and still count
/// towards a candidate's tie-break score.
pub const LOCALITY_WINDOW: usize = 3;

/// Selection score of an excluded row, compared lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RowScore {
    /// Valid cells over the included columns.
    pub alpha: usize,
    /// Largest number of nearby excluded rows missing in one of the columns
    /// this row would prune.
    pub worst_missing_count: usize,
    /// Sum of the alphas of the rows behind `worst_missing_count`.
    pub alpha_sum: usize,
}

/// What a single inclusion step changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inclusion {
    pub row: usize,
    /// Columns dropped because the new row is missing in them.
    pub pruned_cols: Vec<usize>,
    /// `included rows x included columns` after this step.
    pub objective: usize,
    /// Whether this step set a new best objective.
    pub improved: bool,
}

/// Bookkeeping of an inclusion run.
///
/// `alpha[i]` is kept current for excluded rows only: the number of included
/// columns in which row `i` is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionState {
    included_cols: Vec<bool>,
    n_included_cols: usize,
    alpha: Vec<usize>,
    excluded: Vec<usize>,
    inclusion_order: Vec<usize>,
    best_objective: usize,
    best_n_rows: usize,
}

impl InclusionState {
    pub fn new<M: MissingData + ?Sized>(matrix: &M) -> Self {
        let n_rows = matrix.n_rows();
        let n_cols = matrix.n_cols();
        let alpha = (0..n_rows)
            .map(|i| (0..n_cols).filter(|&j| !matrix.is_missing(i, j)).count())
            .collect();

        Self {
            included_cols: vec![true; n_cols],
            n_included_cols: n_cols,
            alpha,
            excluded: (0..n_rows).collect(),
            inclusion_order: Vec::with_capacity(n_rows),
            best_objective: 0,
            best_n_rows: 0,
        }
    }

    pub fn included_cols(&self) -> &[bool] {
        &self.included_cols
    }

    pub fn n_included_cols(&self) -> usize {
        self.n_included_cols
    }

    pub fn alpha(&self) -> &[usize] {
        &self.alpha
    }

    /// Rows not yet included, in ascending order.
    pub fn excluded(&self) -> &[usize] {
        &self.excluded
    }

    /// Rows in the order they were included.
    pub fn inclusion_order(&self) -> &[usize] {
        &self.inclusion_order
    }

    pub fn best_objective(&self) -> usize {
        self.best_objective
    }

    pub fn best_n_rows(&self) -> usize {
        self.best_n_rows
    }

    /// Current `included rows x included columns`.
    pub fn objective(&self) -> usize {
        self.inclusion_order.len() * self.n_included_cols
    }

    pub fn is_done(&self) -> bool {
        self.excluded.is_empty()
    }

    /// Check alphas of excluded rows and the included-column flags against a
    /// full recount.
    pub fn counters_consistent<M: MissingData + ?Sized>(&self, matrix: &M) -> bool {
        let alpha_ok = self.excluded.iter().all(|&i| {
            let count = (0..matrix.n_cols())
                .filter(|&j| self.included_cols[j] && !matrix.is_missing(i, j))
                .count();
            count == self.alpha[i]
        });
        let cols_ok = (0..matrix.n_cols()).all(|j| {
            let clean = self.inclusion_order.iter().all(|&i| !matrix.is_missing(i, j));
            clean == self.included_cols[j]
        });
        alpha_ok
            && cols_ok
            && self.included_cols.iter().filter(|&&c| c).count() == self.n_included_cols
    }

    /// Masks of the best snapshot.
    ///
    /// Rows are the first `best_n_rows` included rows; a column is kept iff
    /// none of those rows is missing in it.
    pub fn to_solution<M: MissingData + ?Sized>(&self, matrix: &M) -> CleanSolution {
        let mut rows_to_keep = vec![false; matrix.n_rows()];
        for &row in &self.inclusion_order[..self.best_n_rows] {
            rows_to_keep[row] = true;
        }

        let cols_to_keep = (0..matrix.n_cols())
            .map(|j| {
                self.inclusion_order[..self.best_n_rows]
                    .iter()
                    .all(|&i| !matrix.is_missing(i, j))
            })
            .collect();

        CleanSolution::new(rows_to_keep, cols_to_keep)
    }

    /// Score of excluded row `row` when several rows share `best_alpha`.
    pub fn score<M: MissingData + ?Sized>(
        &self,
        matrix: &M,
        row: usize,
        best_alpha: usize,
    ) -> RowScore {
        let mut worst_missing_count = 0;
        let mut alpha_sum = 0;

        for j in (0..matrix.n_cols()).filter(|&j| self.included_cols[j]) {
            if !matrix.is_missing(row, j) {
                continue;
            }
            let (count, sum) = self
                .excluded
                .iter()
                .filter(|&&i| {
                    matrix.is_missing(i, j)
                        && best_alpha.saturating_sub(self.alpha[i]) < LOCALITY_WINDOW
                })
                .fold((0, 0), |(count, sum), &i| (count + 1, sum + self.alpha[i]));

            if count > worst_missing_count {
                worst_missing_count = count;
                alpha_sum = sum;
            }
        }

        RowScore {
            alpha: self.alpha[row],
            worst_missing_count,
            alpha_sum,
        }
    }

    /// Next row to include; `None` once every row is included.
    fn select_row<M: MissingData + ?Sized>(&self, matrix: &M) -> Option<usize> {
        let best_alpha = self.excluded.iter().map(|&i| self.alpha[i]).max()?;
        let tied: Vec<usize> = self
            .excluded
            .iter()
            .copied()
            .filter(|&i| self.alpha[i] == best_alpha)
            .collect();

        if let [only] = tied.as_slice() {
            return Some(*only);
        }
        first_max_by_key(tied, |&i| self.score(matrix, i, best_alpha))
    }

    fn include<M: MissingData + ?Sized>(&mut self, matrix: &M, row: usize) -> Result<Vec<usize>> {
        let pos = self
            .excluded
            .iter()
            .position(|&i| i == row)
            .ok_or_else(|| {
                CleanError::InvariantViolation(format!("row {} is not in the excluded set", row))
            })?;
        self.excluded.remove(pos);
        self.inclusion_order.push(row);

        let mut pruned = Vec::new();
        for j in 0..self.included_cols.len() {
            if !self.included_cols[j] || !matrix.is_missing(row, j) {
                continue;
            }
            self.included_cols[j] = false;
            self.n_included_cols -= 1;
            for &i in &self.excluded {
                if !matrix.is_missing(i, j) {
                    self.alpha[i] -= 1;
                }
            }
            pruned.push(j);
        }
        Ok(pruned)
    }
}

/// Run one inclusion step; `Ok(None)` once every row is included.
pub fn inclusion_step<M: MissingData + ?Sized>(
    matrix: &M,
    state: &mut InclusionState,
) -> Result<Option<Inclusion>> {
    let row = match state.select_row(matrix) {
        Some(row) => row,
        None => return Ok(None),
    };

    let pruned_cols = state.include(matrix, row)?;
    let objective = state.objective();
    let improved = objective > state.best_objective;
    if improved {
        state.best_objective = objective;
        state.best_n_rows = state.inclusion_order.len();
    }

    tracing::debug!(
        row,
        n_pruned = pruned_cols.len(),
        objective,
        improved,
        "inclusion step"
    );

    Ok(Some(Inclusion {
        row,
        pruned_cols,
        objective,
        improved,
    }))
}

/// Greedy solver producing a block with no missing cells.
///
/// The floors are not enforced while solving; [`meets_floors`] reports whether
/// the result satisfies them.
///
/// [`meets_floors`]: InclusionGreedySolver::meets_floors
#[derive(Debug)]
pub struct InclusionGreedySolver<'a, M: MissingData + ?Sized> {
    matrix: &'a M,
    state: InclusionState,
    min_rows: usize,
    min_cols: usize,
}

impl<'a, M: MissingData + ?Sized> InclusionGreedySolver<'a, M> {
    pub fn new(matrix: &'a M) -> Self {
        Self {
            matrix,
            state: InclusionState::new(matrix),
            min_rows: 0,
            min_cols: 0,
        }
    }

    /// Constrained variant. Floors must not exceed the matrix dimensions.
    pub fn with_floors(matrix: &'a M, min_rows: usize, min_cols: usize) -> Result<Self> {
        if min_rows > matrix.n_rows() || min_cols > matrix.n_cols() {
            return Err(CleanError::InvalidParameter(format!(
                "floors {} x {} exceed matrix dimensions {} x {}",
                min_rows,
                min_cols,
                matrix.n_rows(),
                matrix.n_cols()
            )));
        }
        Ok(Self {
            min_rows,
            min_cols,
            ..Self::new(matrix)
        })
    }

    pub fn state(&self) -> &InclusionState {
        &self.state
    }

    pub fn step(&mut self) -> Result<Option<Inclusion>> {
        inclusion_step(self.matrix, &mut self.state)
    }

    /// Include every row and return the best snapshot.
    pub fn solve(&mut self) -> Result<CleanSolution> {
        while self.step()?.is_some() {}

        tracing::info!(
            best_objective = self.state.best_objective,
            best_n_rows = self.state.best_n_rows,
            "row inclusion finished"
        );
        Ok(self.solution())
    }

    /// Masks of the best snapshot seen so far.
    pub fn solution(&self) -> CleanSolution {
        self.state.to_solution(self.matrix)
    }

    pub fn best_objective(&self) -> usize {
        self.state.best_objective
    }

    pub fn best_n_rows(&self) -> usize {
        self.state.best_n_rows
    }

    /// Whether the best snapshot keeps at least `min_rows` rows and `min_cols` columns.
    pub fn meets_floors(&self) -> bool {
        let solution = self.solution();
        solution.n_rows_kept() >= self.min_rows && solution.n_cols_kept() >= self.min_cols
    }
}
