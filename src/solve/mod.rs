//! Greedy heuristics choosing which rows and columns to keep.

pub mod elimination;
pub mod inclusion;
pub mod rank;

pub use elimination::{
    elimination_step, Axis, EliminationParams, EliminationState, Removal,
    ThresholdEliminationSolver, Trigger,
};
pub use inclusion::{
    inclusion_step, Inclusion, InclusionGreedySolver, InclusionState, RowScore, LOCALITY_WINDOW,
};
pub use rank::{first_max_by_key, rank_by_count, rank_by_key, Order};
