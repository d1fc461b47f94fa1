//! Numeric utilities shared by the detector and the summaries.

pub mod ols;
pub mod stats;

pub use ols::{ols_fit, OlsFit};
pub use stats::{argmin_abs_deviation, mean, quantile};
