//! Data profiling primitives for understanding where data is missing.

mod missingness;

pub use missingness::{profile_missingness, MissingnessProfile};
