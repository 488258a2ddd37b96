//! Data structures for missing-data cleaning.

mod presence_matrix;
mod solution;
mod table;

pub use presence_matrix::{count_valid_kept, MissingData, PresenceMatrix};
pub use solution::CleanSolution;
pub use table::DataTable;
