//! Mathematical utilities: sample moments, rolling windows and least squares.

pub mod ols;
pub mod stats;

pub use ols::*;
pub use stats::*;
