//! Structural break detection.
//!
//! Decides whether a series changed regime at some point by comparing a
//! single linear trend with the best two-segment linear trend.
//!
//! # Example
//!
//! ```
//! use trendbreak::changepoint::{detect_break_values, BreakConfig};
//!
//! // Radiance drops from ~30 to ~3 after month 10
//! let mut series: Vec<f64> = (0..10).map(|i| 30.0 + (i % 3) as f64).collect();
//! series.extend((0..10).map(|i| 3.0 + (i % 2) as f64 * 0.5));
//!
//! let result = detect_break_values(&series, &BreakConfig::default()).unwrap();
//! assert!(result.has_break);
//! assert_eq!(result.break_index(), Some(10));
//!
//! // A stricter threshold asks for more evidence
//! let strict = BreakConfig::default().criterion_threshold(-1e6);
//! assert!(!detect_break_values(&series, &strict).unwrap().has_break);
//! ```

pub mod criterion;
pub mod segmented;

pub use criterion::{bic, residual_floor, TrendModel, RESIDUAL_FLOOR_RATIO};
pub use segmented::{
    detect_break, detect_break_or_none, detect_break_values, BreakConfig, BreakRegime,
    BreakResult,
};
