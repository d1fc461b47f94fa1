//! # trendbreak
//!
//! Structural break detection for monthly radiance series.
//!
//! Fits a single linear trend and the best two-segment trend to a time
//! series, compares them with BIC and, when the split is justified, picks
//! representative samples on each side of the break. Around the detector
//! sit the helpers a night-lights dashboard needs: series preparation,
//! change summaries, pixel-wise blackout masks and retrying acquisition
//! from an external aggregation service.

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::needless_range_loop)]

pub mod analysis;
pub mod changepoint;
pub mod core;
pub mod error;
pub mod source;
pub mod utils;

pub use error::{BreakError, Result};

pub mod prelude {
    pub use crate::analysis::{BreakReport, ChangeSummary};
    pub use crate::changepoint::{detect_break, BreakConfig, BreakResult};
    pub use crate::core::TimeSeries;
    pub use crate::error::{BreakError, Result};
    pub use crate::source::{RetryPolicy, SeriesRequest, SeriesSource};
}
