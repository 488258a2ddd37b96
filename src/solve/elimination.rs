//! Threshold-driven elimination.
//!
//! Starts with every row and column kept and repeatedly removes the worst
//! offender (or the cheapest set of cells that brings it within budget) until
//! every kept row and column has a missing fraction at or below the budget.

use super::rank::{rank_by_count, Order};
use crate::data::{CleanSolution, MissingData};
use crate::error::{CleanError, Result};
use serde::{Deserialize, Serialize};

/// Budget and floors for [`ThresholdEliminationSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EliminationParams {
    /// Largest missing fraction allowed in any kept row or column (0.0 to 1.0).
    pub max_missing: f64,
    /// Never keep fewer rows than this.
    pub min_rows: usize,
    /// Never keep fewer columns than this.
    pub min_cols: usize,
}

impl EliminationParams {
    /// Parameters with the given budget and no floors.
    pub fn new(max_missing: f64) -> Self {
        Self {
            max_missing,
            min_rows: 0,
            min_cols: 0,
        }
    }

    /// Set the row and column floors.
    pub fn with_floors(mut self, min_rows: usize, min_cols: usize) -> Self {
        self.min_rows = min_rows;
        self.min_cols = min_cols;
        self
    }

    /// Check the parameters against the matrix they will be used on.
    pub fn validate<M: MissingData + ?Sized>(&self, matrix: &M) -> Result<()> {
        if !(0.0..=1.0).contains(&self.max_missing) {
            return Err(CleanError::InvalidParameter(format!(
                "max_missing must be between 0 and 1, got {}",
                self.max_missing
            )));
        }
        if self.min_rows > matrix.n_rows() {
            return Err(CleanError::InvalidParameter(format!(
                "min_rows ({}) exceeds the number of rows ({})",
                self.min_rows,
                matrix.n_rows()
            )));
        }
        if self.min_cols > matrix.n_cols() {
            return Err(CleanError::InvalidParameter(format!(
                "min_cols ({}) exceeds the number of columns ({})",
                self.min_cols,
                matrix.n_cols()
            )));
        }
        Ok(())
    }

    fn floor(&self, axis: Axis) -> usize {
        match axis {
            Axis::Row => self.min_rows,
            Axis::Column => self.min_cols,
        }
    }
}

/// Matrix dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Row,
    Column,
}

impl Axis {
    /// The orthogonal dimension.
    pub fn other(self) -> Self {
        match self {
            Axis::Row => Axis::Column,
            Axis::Column => Axis::Row,
        }
    }
}

/// Which over-budget entity drove an elimination step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Row floor reached; columns were dropped to fix this row.
    RowFloor { row: usize },
    /// Column floor reached; rows were dropped to fix this column.
    ColumnFloor { col: usize },
    /// This row was the worst offender overall.
    WorstRow { row: usize },
    /// This column was the worst offender overall.
    WorstColumn { col: usize },
}

/// What a single elimination step changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// Dimension the indices refer to.
    pub axis: Axis,
    /// Indices actually removed, in removal order.
    pub removed: Vec<usize>,
    /// The entity that caused the removal.
    pub trigger: Trigger,
}

/// Keep flags and valid-cell counters of an elimination run.
///
/// `alpha[i]` is the number of kept columns in which row `i` is valid and
/// `beta[j]` the number of kept rows in which column `j` is valid. Both are
/// updated incrementally on every removal, for kept and removed indices alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EliminationState {
    keep_rows: Vec<bool>,
    keep_cols: Vec<bool>,
    alpha: Vec<usize>,
    beta: Vec<usize>,
    n_rows_kept: usize,
    n_cols_kept: usize,
}

impl EliminationState {
    /// Everything kept, counters computed by a full scan.
    pub fn new<M: MissingData + ?Sized>(matrix: &M) -> Self {
        let n_rows = matrix.n_rows();
        let n_cols = matrix.n_cols();
        let mut alpha = vec![0; n_rows];
        let mut beta = vec![0; n_cols];
        for i in 0..n_rows {
            for j in 0..n_cols {
                if !matrix.is_missing(i, j) {
                    alpha[i] += 1;
                    beta[j] += 1;
                }
            }
        }

        Self {
            keep_rows: vec![true; n_rows],
            keep_cols: vec![true; n_cols],
            alpha,
            beta,
            n_rows_kept: n_rows,
            n_cols_kept: n_cols,
        }
    }

    pub fn keep_rows(&self) -> &[bool] {
        &self.keep_rows
    }

    pub fn keep_cols(&self) -> &[bool] {
        &self.keep_cols
    }

    /// Valid cells per row over kept columns.
    pub fn alpha(&self) -> &[usize] {
        &self.alpha
    }

    /// Valid cells per column over kept rows.
    pub fn beta(&self) -> &[usize] {
        &self.beta
    }

    pub fn n_rows_kept(&self) -> usize {
        self.n_rows_kept
    }

    pub fn n_cols_kept(&self) -> usize {
        self.n_cols_kept
    }

    /// Remove a row. Returns false, changing nothing, if it was already removed.
    pub fn remove_row<M: MissingData + ?Sized>(&mut self, matrix: &M, row: usize) -> bool {
        self.remove(matrix, Axis::Row, row)
    }

    /// Remove a column. Returns false, changing nothing, if it was already removed.
    pub fn remove_col<M: MissingData + ?Sized>(&mut self, matrix: &M, col: usize) -> bool {
        self.remove(matrix, Axis::Column, col)
    }

    /// Missing fraction of a row over the kept columns (0.0 when none are kept).
    pub fn row_missing_fraction(&self, row: usize) -> f64 {
        self.missing_fraction(Axis::Row, row)
    }

    /// Missing fraction of a column over the kept rows (0.0 when none are kept).
    pub fn col_missing_fraction(&self, col: usize) -> f64 {
        self.missing_fraction(Axis::Column, col)
    }

    /// Whether every kept row and column is within `max_missing`.
    pub fn is_clean(&self, max_missing: f64) -> bool {
        self.worst_over(Axis::Row, max_missing).is_none()
            && self.worst_over(Axis::Column, max_missing).is_none()
    }

    /// Recount both counters from scratch and compare with the incremental ones.
    pub fn counters_consistent<M: MissingData + ?Sized>(&self, matrix: &M) -> bool {
        let alpha_ok = (0..matrix.n_rows()).all(|i| {
            let count = (0..matrix.n_cols())
                .filter(|&j| self.keep_cols[j] && !matrix.is_missing(i, j))
                .count();
            count == self.alpha[i]
        });
        let beta_ok = (0..matrix.n_cols()).all(|j| {
            let count = (0..matrix.n_rows())
                .filter(|&i| self.keep_rows[i] && !matrix.is_missing(i, j))
                .count();
            count == self.beta[j]
        });
        alpha_ok
            && beta_ok
            && self.keep_rows.iter().filter(|&&k| k).count() == self.n_rows_kept
            && self.keep_cols.iter().filter(|&&k| k).count() == self.n_cols_kept
    }

    /// Current keep flags as a solution.
    pub fn to_solution(&self) -> CleanSolution {
        CleanSolution::new(self.keep_rows.clone(), self.keep_cols.clone())
    }

    fn kept(&self, axis: Axis) -> &[bool] {
        match axis {
            Axis::Row => &self.keep_rows,
            Axis::Column => &self.keep_cols,
        }
    }

    fn n_kept(&self, axis: Axis) -> usize {
        match axis {
            Axis::Row => self.n_rows_kept,
            Axis::Column => self.n_cols_kept,
        }
    }

    fn valid_counts(&self, axis: Axis) -> &[usize] {
        match axis {
            Axis::Row => &self.alpha,
            Axis::Column => &self.beta,
        }
    }

    fn n_missing(&self, axis: Axis, idx: usize) -> usize {
        self.n_kept(axis.other()) - self.valid_counts(axis)[idx]
    }

    fn missing_fraction(&self, axis: Axis, idx: usize) -> f64 {
        let total = self.n_kept(axis.other());
        if total == 0 {
            return 0.0;
        }
        self.n_missing(axis, idx) as f64 / total as f64
    }

    fn remove<M: MissingData + ?Sized>(&mut self, matrix: &M, axis: Axis, idx: usize) -> bool {
        match axis {
            Axis::Row => {
                if !self.keep_rows[idx] {
                    return false;
                }
                self.keep_rows[idx] = false;
                self.n_rows_kept -= 1;
                for (j, beta) in self.beta.iter_mut().enumerate() {
                    if !matrix.is_missing(idx, j) {
                        *beta -= 1;
                    }
                }
            }
            Axis::Column => {
                if !self.keep_cols[idx] {
                    return false;
                }
                self.keep_cols[idx] = false;
                self.n_cols_kept -= 1;
                for (i, alpha) in self.alpha.iter_mut().enumerate() {
                    if !matrix.is_missing(i, idx) {
                        *alpha -= 1;
                    }
                }
            }
        }
        true
    }

    /// Kept entity on `axis` with the strictly highest missing fraction above
    /// `max_missing`; the first one seen wins ties.
    fn worst_over(&self, axis: Axis, max_missing: f64) -> Option<(usize, f64)> {
        let mut worst: Option<(usize, f64)> = None;
        for (idx, _) in self.kept(axis).iter().enumerate().filter(|(_, &k)| k) {
            let fraction = self.missing_fraction(axis, idx);
            if fraction > max_missing && worst.map_or(true, |(_, w)| fraction > w) {
                worst = Some((idx, fraction));
            }
        }
        worst
    }

    /// Worst entity across both axes. Rows are scanned first, so a column
    /// only wins when strictly worse than every row.
    fn worst_entity(&self, max_missing: f64) -> Option<(Axis, usize)> {
        let row = self.worst_over(Axis::Row, max_missing);
        let col = self.worst_over(Axis::Column, max_missing);
        match (row, col) {
            (Some((_, rf)), Some((j, cf))) if cf > rf => Some((Axis::Column, j)),
            (Some((i, _)), _) => Some((Axis::Row, i)),
            (None, Some((j, _))) => Some((Axis::Column, j)),
            (None, None) => None,
        }
    }

    /// Kept entities on the other axis that are missing in `idx`.
    fn missing_across<M: MissingData + ?Sized>(
        &self,
        matrix: &M,
        axis: Axis,
        idx: usize,
    ) -> Vec<usize> {
        self.kept(axis.other())
            .iter()
            .enumerate()
            .filter(|(_, &k)| k)
            .map(|(other, _)| other)
            .filter(|&other| match axis {
                Axis::Row => matrix.is_missing(idx, other),
                Axis::Column => matrix.is_missing(other, idx),
            })
            .collect()
    }

    /// The cheapest entities on the other axis whose removal brings `idx`
    /// within budget, paired with the valid cells each one would take along.
    fn cheapest_fix<M: MissingData + ?Sized>(
        &self,
        matrix: &M,
        axis: Axis,
        idx: usize,
        max_missing: f64,
    ) -> Result<Vec<(usize, usize)>> {
        let k = n_to_remove(
            self.n_missing(axis, idx),
            self.n_kept(axis.other()),
            max_missing,
        );
        let candidates = self.missing_across(matrix, axis, idx);
        select_cheapest(&candidates, self.valid_counts(axis.other()), k)
    }

    /// Remove `indices` on `axis` until its floor is hit; returns what was removed.
    fn remove_down_to_floor<M: MissingData + ?Sized>(
        &mut self,
        matrix: &M,
        axis: Axis,
        indices: &[usize],
        floor: usize,
    ) -> Vec<usize> {
        let mut removed = Vec::with_capacity(indices.len());
        for &idx in indices {
            if self.n_kept(axis) > floor && self.remove(matrix, axis, idx) {
                removed.push(idx);
            }
        }
        removed
    }
}

/// Number of missing entries that must go before `n_missing / n_total`
/// falls to `max_missing` or below. Each removal drops one missing entry and
/// one entry overall.
pub fn n_to_remove(n_missing: usize, n_total: usize, max_missing: f64) -> usize {
    let mut missing = n_missing;
    let mut total = n_total;
    while total > 0 && missing as f64 / total as f64 > max_missing {
        missing -= 1;
        total -= 1;
    }
    n_total - total
}

/// The `k` candidates with the fewest valid cells, stable on ties.
fn select_cheapest(
    candidates: &[usize],
    valid_counts: &[usize],
    k: usize,
) -> Result<Vec<(usize, usize)>> {
    if k > candidates.len() {
        return Err(CleanError::InsufficientCandidates {
            needed: k,
            available: candidates.len(),
        });
    }
    let mut ranked = rank_by_count(
        candidates.iter().map(|&c| (c, valid_counts[c])),
        Order::Ascending,
    );
    ranked.truncate(k);
    Ok(ranked)
}

/// Run one elimination step on `state`.
///
/// Returns `Ok(None)` once the state is clean, otherwise the removal that was
/// applied.
pub fn elimination_step<M: MissingData + ?Sized>(
    matrix: &M,
    params: &EliminationParams,
    state: &mut EliminationState,
) -> Result<Option<Removal>> {
    let max_missing = params.max_missing;
    if state.is_clean(max_missing) {
        return Ok(None);
    }

    let rows_at_floor = state.n_rows_kept <= params.min_rows;
    let cols_at_floor = state.n_cols_kept <= params.min_cols;

    let (axis, indices, trigger) = match (rows_at_floor, cols_at_floor) {
        (true, true) => {
            return Err(CleanError::InfeasibleFloor {
                min_rows: params.min_rows,
                min_cols: params.min_cols,
            });
        }
        (true, false) => {
            // Only columns are over budget and rows may not shrink
            let (row, _) = state
                .worst_over(Axis::Row, max_missing)
                .ok_or(CleanError::InfeasibleFloor {
                    min_rows: params.min_rows,
                    min_cols: params.min_cols,
                })?;
            let cols = state.cheapest_fix(matrix, Axis::Row, row, max_missing)?;
            (
                Axis::Column,
                cols.into_iter().map(|(j, _)| j).collect::<Vec<_>>(),
                Trigger::RowFloor { row },
            )
        }
        (false, true) => {
            let (col, _) = state
                .worst_over(Axis::Column, max_missing)
                .ok_or(CleanError::InfeasibleFloor {
                    min_rows: params.min_rows,
                    min_cols: params.min_cols,
                })?;
            let rows = state.cheapest_fix(matrix, Axis::Column, col, max_missing)?;
            (
                Axis::Row,
                rows.into_iter().map(|(i, _)| i).collect(),
                Trigger::ColumnFloor { col },
            )
        }
        (false, false) => {
            let (axis, idx) = state.worst_entity(max_missing).ok_or_else(|| {
                CleanError::InvariantViolation(
                    "could not find a row or column over the budget".to_string(),
                )
            })?;
            let trigger = match axis {
                Axis::Row => Trigger::WorstRow { row: idx },
                Axis::Column => Trigger::WorstColumn { col: idx },
            };

            let fix = state.cheapest_fix(matrix, axis, idx, max_missing)?;
            let partial_cost: usize = fix.iter().map(|&(_, valid)| valid).sum();
            let entity_cost = state.valid_counts(axis)[idx];

            // An exact tie removes the whole entity
            if partial_cost < entity_cost {
                (axis.other(), fix.into_iter().map(|(o, _)| o).collect(), trigger)
            } else {
                (axis, vec![idx], trigger)
            }
        }
    };

    let removed = state.remove_down_to_floor(matrix, axis, &indices, params.floor(axis));
    if removed.is_empty() {
        return Err(CleanError::InvariantViolation(
            "no rows or columns were selected for removal".to_string(),
        ));
    }

    tracing::debug!(
        ?axis,
        ?trigger,
        n_removed = removed.len(),
        rows_kept = state.n_rows_kept,
        cols_kept = state.n_cols_kept,
        "elimination step"
    );

    Ok(Some(Removal {
        axis,
        removed,
        trigger,
    }))
}

/// Greedy solver that removes rows and columns until every kept row and
/// column is within the missing-data budget.
///
/// # Example
///
/// ```
/// use presence_clean::data::PresenceMatrix;
/// use presence_clean::solve::ThresholdEliminationSolver;
///
/// let matrix = PresenceMatrix::from_missing_cells(3, 3, &[(0, 0)]).unwrap();
/// let mut solver = ThresholdEliminationSolver::new(&matrix, 0.0).unwrap();
/// let solution = solver.solve().unwrap();
/// assert_eq!(solution.rows_to_keep(), &[false, true, true]);
/// assert_eq!(solution.n_cols_kept(), 3);
/// ```
#[derive(Debug)]
pub struct ThresholdEliminationSolver<'a, M: MissingData + ?Sized> {
    matrix: &'a M,
    params: EliminationParams,
    state: EliminationState,
    n_steps: usize,
}

impl<'a, M: MissingData + ?Sized> ThresholdEliminationSolver<'a, M> {
    /// Solver with a budget and no floors.
    pub fn new(matrix: &'a M, max_missing: f64) -> Result<Self> {
        Self::from_params(matrix, EliminationParams::new(max_missing))
    }

    /// Solver with a budget and row/column floors.
    pub fn with_floors(
        matrix: &'a M,
        max_missing: f64,
        min_rows: usize,
        min_cols: usize,
    ) -> Result<Self> {
        Self::from_params(
            matrix,
            EliminationParams::new(max_missing).with_floors(min_rows, min_cols),
        )
    }

    /// Solver from validated parameters.
    pub fn from_params(matrix: &'a M, params: EliminationParams) -> Result<Self> {
        params.validate(matrix)?;
        Ok(Self {
            matrix,
            params,
            state: EliminationState::new(matrix),
            n_steps: 0,
        })
    }

    pub fn params(&self) -> &EliminationParams {
        &self.params
    }

    pub fn state(&self) -> &EliminationState {
        &self.state
    }

    /// Number of steps applied so far.
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Apply a single step; `Ok(None)` when already clean.
    pub fn step(&mut self) -> Result<Option<Removal>> {
        let removal = elimination_step(self.matrix, &self.params, &mut self.state)?;
        if removal.is_some() {
            self.n_steps += 1;
        }
        Ok(removal)
    }

    /// Step until clean.
    pub fn solve(&mut self) -> Result<CleanSolution> {
        while self.step()?.is_some() {}

        tracing::info!(
            max_missing = self.params.max_missing,
            steps = self.n_steps,
            rows_kept = self.state.n_rows_kept,
            cols_kept = self.state.n_cols_kept,
            "threshold elimination finished"
        );
        Ok(self.state.to_solution())
    }

    pub fn rows_to_keep(&self) -> &[bool] {
        self.state.keep_rows()
    }

    pub fn cols_to_keep(&self) -> &[bool] {
        self.state.keep_cols()
    }

    pub fn n_rows_kept(&self) -> usize {
        self.state.n_rows_kept()
    }

    pub fn n_cols_kept(&self) -> usize {
        self.state.n_cols_kept()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PresenceMatrix;

    /// Deterministic pseudo-random matrix with roughly `missing_pct`% missing cells.
    fn random_matrix(n_rows: usize, n_cols: usize, missing_pct: u64, seed: u64) -> PresenceMatrix {
        let mut state = seed;
        let mut next = || {
            state = state.wrapping_mul(1103515245).wrapping_add(12345);
            (state >> 16) & 0x7FFF
        };
        let present = (0..n_rows * n_cols).map(|_| next() % 100 >= missing_pct).collect();
        PresenceMatrix::new(n_rows, n_cols, present).unwrap()
    }

    #[test]
    fn test_full_matrix_keeps_everything() {
        let mat = PresenceMatrix::full(3, 3);
        let mut solver = ThresholdEliminationSolver::new(&mat, 0.0).unwrap();
        let sol = solver.solve().unwrap();
        assert_eq!(sol.n_rows_kept(), 3);
        assert_eq!(sol.n_cols_kept(), 3);
        assert_eq!(sol.n_valid_kept(&mat).unwrap(), 9);
        assert_eq!(solver.n_steps(), 0);
    }

    #[test]
    fn test_single_missing_cell_removes_row_on_tie() {
        let mat = PresenceMatrix::from_missing_cells(3, 3, &[(0, 0)]).unwrap();
        let mut solver = ThresholdEliminationSolver::new(&mat, 0.0).unwrap();

        let removal = solver.step().unwrap().unwrap();
        assert_eq!(
            removal,
            Removal {
                axis: Axis::Row,
                removed: vec![0],
                trigger: Trigger::WorstRow { row: 0 },
            }
        );
        assert!(solver.step().unwrap().is_none());

        assert_eq!(solver.rows_to_keep(), &[false, true, true]);
        assert_eq!(solver.cols_to_keep(), &[true, true, true]);
        assert_eq!(solver.state().to_solution().n_valid_kept(&mat).unwrap(), 6);
    }

    #[test]
    fn test_sparse_column_removed_outright() {
        // Column 3 is missing in rows 0..3: removing it costs 1 valid cell,
        // removing the three rows would cost 9.
        let mat = PresenceMatrix::from_missing_cells(4, 4, &[(0, 3), (1, 3), (2, 3)]).unwrap();
        let mut solver = ThresholdEliminationSolver::new(&mat, 0.0).unwrap();

        let removal = solver.step().unwrap().unwrap();
        assert_eq!(removal.axis, Axis::Column);
        assert_eq!(removal.removed, vec![3]);
        assert_eq!(removal.trigger, Trigger::WorstColumn { col: 3 });

        let sol = solver.solve().unwrap();
        assert_eq!(sol.n_rows_kept(), 4);
        assert_eq!(sol.n_cols_kept(), 3);
    }

    #[test]
    fn test_partial_removal_when_cheaper() {
        // Row 0 misses columns 0 and 1 (2/6 > 0.2). Dropping one column costs
        // 3 valid cells, dropping the row costs 4.
        let mat = PresenceMatrix::from_missing_cells(4, 6, &[(0, 0), (0, 1)]).unwrap();
        let mut solver = ThresholdEliminationSolver::new(&mat, 0.2).unwrap();

        let first = solver.step().unwrap().unwrap();
        assert_eq!(first.axis, Axis::Column);
        assert_eq!(first.removed, vec![0]);
        assert_eq!(first.trigger, Trigger::WorstRow { row: 0 });

        // Column 1 is now the worst offender (1/4) and goes as a whole
        let second = solver.step().unwrap().unwrap();
        assert_eq!(second.axis, Axis::Column);
        assert_eq!(second.removed, vec![1]);
        assert_eq!(second.trigger, Trigger::WorstColumn { col: 1 });

        assert!(solver.step().unwrap().is_none());
        assert_eq!(solver.n_rows_kept(), 4);
        assert_eq!(solver.n_cols_kept(), 4);
    }

    #[test]
    fn test_partial_row_removal_for_worst_column() {
        // Column 0 misses rows 0 and 1 (2/6 > 0.2). Dropping one row costs
        // 3 valid cells, dropping the column costs 4.
        let mat = PresenceMatrix::from_missing_cells(6, 4, &[(0, 0), (1, 0)]).unwrap();
        let mut solver = ThresholdEliminationSolver::new(&mat, 0.2).unwrap();

        let first = solver.step().unwrap().unwrap();
        assert_eq!(first.axis, Axis::Row);
        assert_eq!(first.removed, vec![0]);
        assert_eq!(first.trigger, Trigger::WorstColumn { col: 0 });

        // Row 1 is now the worst offender (1/4) and goes as a whole
        let second = solver.step().unwrap().unwrap();
        assert_eq!(second.axis, Axis::Row);
        assert_eq!(second.removed, vec![1]);
        assert_eq!(second.trigger, Trigger::WorstRow { row: 1 });

        assert!(solver.step().unwrap().is_none());
        assert_eq!(solver.n_rows_kept(), 4);
        assert_eq!(solver.n_cols_kept(), 4);
    }

    #[test]
    fn test_row_floor_drops_columns() {
        let mat = PresenceMatrix::from_missing_cells(3, 3, &[(0, 0)]).unwrap();
        let mut solver = ThresholdEliminationSolver::with_floors(&mat, 0.0, 3, 0).unwrap();

        let removal = solver.step().unwrap().unwrap();
        assert_eq!(removal.axis, Axis::Column);
        assert_eq!(removal.removed, vec![0]);
        assert_eq!(removal.trigger, Trigger::RowFloor { row: 0 });

        let sol = solver.solve().unwrap();
        assert_eq!(sol.n_rows_kept(), 3);
        assert_eq!(sol.n_cols_kept(), 2);
    }

    #[test]
    fn test_column_floor_drops_rows() {
        let mat = PresenceMatrix::from_missing_cells(3, 3, &[(0, 0)]).unwrap();
        let mut solver = ThresholdEliminationSolver::with_floors(&mat, 0.0, 0, 3).unwrap();

        let removal = solver.step().unwrap().unwrap();
        assert_eq!(removal.axis, Axis::Row);
        assert_eq!(removal.removed, vec![0]);
        assert_eq!(removal.trigger, Trigger::ColumnFloor { col: 0 });
    }

    #[test]
    fn test_floor_picks_lowest_beta_columns() {
        // Row 0 misses columns 1 and 2 and needs both gone; column 2 also
        // misses row 1, so it has fewer valid cells and goes first.
        let mat = PresenceMatrix::from_missing_cells(4, 4, &[(0, 1), (0, 2), (1, 2)]).unwrap();
        let mut solver = ThresholdEliminationSolver::with_floors(&mat, 0.25, 4, 0).unwrap();

        let removal = solver.step().unwrap().unwrap();
        assert_eq!(removal.trigger, Trigger::RowFloor { row: 0 });
        assert_eq!(removal.removed, vec![2, 1]);
    }

    #[test]
    fn test_floor_picks_lowest_alpha_rows() {
        // Column 0 misses rows 1 and 2 and needs both gone; row 2 also
        // misses column 1, so it has fewer valid cells and goes first.
        let mat = PresenceMatrix::from_missing_cells(4, 4, &[(1, 0), (2, 0), (2, 1)]).unwrap();
        let mut solver = ThresholdEliminationSolver::with_floors(&mat, 0.25, 0, 4).unwrap();

        let removal = solver.step().unwrap().unwrap();
        assert_eq!(removal.axis, Axis::Row);
        assert_eq!(removal.trigger, Trigger::ColumnFloor { col: 0 });
        assert_eq!(removal.removed, vec![2, 1]);
        assert!(solver.step().unwrap().is_none());
    }

    #[test]
    fn test_row_floor_with_only_columns_over_is_infeasible() {
        // Every row is within budget but column 0 is not, and no row may go
        let mat = PresenceMatrix::from_missing_cells(4, 4, &[(0, 0), (1, 0), (2, 0)]).unwrap();
        let mut solver = ThresholdEliminationSolver::with_floors(&mat, 0.5, 4, 0).unwrap();
        let err = solver.solve().unwrap_err();
        assert!(matches!(
            err,
            CleanError::InfeasibleFloor {
                min_rows: 4,
                min_cols: 0
            }
        ));
        assert!(err.is_infeasible());

        let mut unconstrained = ThresholdEliminationSolver::new(&mat, 0.5).unwrap();
        let sol = unconstrained.solve().unwrap();
        assert_eq!(sol.n_rows_kept(), 4);
        assert_eq!(sol.n_cols_kept(), 3);
    }

    #[test]
    fn test_column_floor_with_only_rows_over_is_infeasible() {
        let mat = PresenceMatrix::from_missing_cells(4, 4, &[(0, 0), (0, 1), (0, 2)]).unwrap();
        let mut solver = ThresholdEliminationSolver::with_floors(&mat, 0.5, 0, 4).unwrap();
        assert!(matches!(
            solver.solve(),
            Err(CleanError::InfeasibleFloor {
                min_rows: 0,
                min_cols: 4
            })
        ));
    }

    #[test]
    fn test_both_floors_infeasible() {
        let mat = PresenceMatrix::from_missing_cells(3, 3, &[(0, 0)]).unwrap();
        let mut solver = ThresholdEliminationSolver::with_floors(&mat, 0.0, 3, 3).unwrap();
        let err = solver.solve().unwrap_err();
        assert!(matches!(
            err,
            CleanError::InfeasibleFloor {
                min_rows: 3,
                min_cols: 3
            }
        ));
        assert!(err.is_infeasible());
    }

    #[test]
    fn test_floor_reached_mid_solve_is_infeasible() {
        // The row floor forces columns out, but the column floor stops after one
        let mat = PresenceMatrix::from_missing_cells(3, 3, &[(0, 0), (0, 1)]).unwrap();
        let mut solver = ThresholdEliminationSolver::with_floors(&mat, 0.0, 3, 2).unwrap();

        let removal = solver.step().unwrap().unwrap();
        assert_eq!(removal.removed, vec![0]);
        assert_eq!(solver.n_cols_kept(), 2);

        assert!(matches!(
            solver.step(),
            Err(CleanError::InfeasibleFloor { .. })
        ));
    }

    #[test]
    fn test_full_budget_removes_nothing() {
        let mat = random_matrix(6, 5, 60, 7);
        let mut solver = ThresholdEliminationSolver::new(&mat, 1.0).unwrap();
        let sol = solver.solve().unwrap();
        assert_eq!(sol, CleanSolution::keep_all(6, 5));
    }

    #[test]
    fn test_invalid_parameters() {
        let mat = PresenceMatrix::full(2, 2);
        assert!(ThresholdEliminationSolver::new(&mat, -0.1).is_err());
        assert!(ThresholdEliminationSolver::new(&mat, 1.5).is_err());
        assert!(ThresholdEliminationSolver::new(&mat, f64::NAN).is_err());
        assert!(ThresholdEliminationSolver::with_floors(&mat, 0.1, 3, 0).is_err());
        assert!(ThresholdEliminationSolver::with_floors(&mat, 0.1, 0, 3).is_err());
    }

    #[test]
    fn test_removal_is_idempotent() {
        let mat = PresenceMatrix::from_missing_cells(3, 4, &[(1, 2), (2, 0)]).unwrap();
        let mut state = EliminationState::new(&mat);

        assert!(state.remove_row(&mat, 1));
        let snapshot = state.clone();
        assert!(!state.remove_row(&mat, 1));
        assert_eq!(state, snapshot);

        assert!(state.remove_col(&mat, 0));
        let snapshot = state.clone();
        assert!(!state.remove_col(&mat, 0));
        assert_eq!(state, snapshot);
        assert!(state.counters_consistent(&mat));
    }

    #[test]
    fn test_counters_after_removals() {
        let mat = PresenceMatrix::from_missing_cells(3, 3, &[(0, 0), (1, 1)]).unwrap();
        let mut state = EliminationState::new(&mat);
        assert_eq!(state.alpha(), &[2, 2, 3]);
        assert_eq!(state.beta(), &[2, 2, 3]);

        state.remove_col(&mat, 2);
        assert_eq!(state.alpha(), &[1, 1, 2]);
        assert_eq!(state.n_cols_kept(), 2);
        assert!((state.row_missing_fraction(0) - 0.5).abs() < 1e-12);

        state.remove_row(&mat, 2);
        assert_eq!(state.beta(), &[1, 1, 2]);
        assert!((state.col_missing_fraction(0) - 0.5).abs() < 1e-12);
        assert!(state.counters_consistent(&mat));
    }

    #[test]
    fn test_fraction_with_nothing_kept() {
        let mat = PresenceMatrix::from_missing_cells(1, 2, &[(0, 0)]).unwrap();
        let mut state = EliminationState::new(&mat);
        state.remove_col(&mat, 0);
        state.remove_col(&mat, 1);
        assert_eq!(state.row_missing_fraction(0), 0.0);
        assert!(state.is_clean(0.0));
    }

    #[test]
    fn test_n_to_remove() {
        assert_eq!(n_to_remove(1, 3, 0.0), 1);
        assert_eq!(n_to_remove(2, 6, 0.2), 1);
        assert_eq!(n_to_remove(3, 3, 0.0), 3);
        assert_eq!(n_to_remove(0, 5, 0.0), 0);
        assert_eq!(n_to_remove(3, 10, 0.25), 1);
    }

    #[test]
    fn test_select_cheapest() {
        let counts = vec![5, 1, 3, 1];
        let picked = select_cheapest(&[0, 1, 2, 3], &counts, 3).unwrap();
        assert_eq!(picked, vec![(1, 1), (3, 1), (2, 3)]);

        let err = select_cheapest(&[0, 1], &counts, 3).unwrap_err();
        assert!(matches!(
            err,
            CleanError::InsufficientCandidates {
                needed: 3,
                available: 2
            }
        ));
    }

    #[test]
    fn test_invariants_hold_at_every_step() {
        for (seed, max_missing) in [(1u64, 0.0), (2, 0.1), (3, 0.25), (4, 0.5)] {
            let mat = random_matrix(12, 9, 20, seed);
            let mut solver = ThresholdEliminationSolver::new(&mat, max_missing).unwrap();
            let mut prev = (solver.n_rows_kept(), solver.n_cols_kept());

            while let Some(removal) = solver.step().unwrap() {
                assert!(!removal.removed.is_empty());
                assert!(solver.state().counters_consistent(&mat));

                let now = (solver.n_rows_kept(), solver.n_cols_kept());
                assert!(now.0 <= prev.0 && now.1 <= prev.1);
                assert!(now.0 + now.1 < prev.0 + prev.1);
                prev = now;
            }

            let sol = solver.state().to_solution();
            assert!(sol.max_missing_fraction(&mat).unwrap() <= max_missing + 1e-12);
        }
    }

    #[test]
    fn test_deterministic() {
        let mat = random_matrix(10, 10, 30, 11);
        let a = ThresholdEliminationSolver::new(&mat, 0.1).unwrap().solve().unwrap();
        let b = ThresholdEliminationSolver::new(&mat, 0.1).unwrap().solve().unwrap();
        assert_eq!(a, b);
    }
}
