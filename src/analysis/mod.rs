//! Post-detection analysis: regime summaries, fallback sample selection,
//! text reports and pixel-wise change images.

pub mod raster;
pub mod summary;

pub use raster::{
    blackout_mask, compute_change, hotspot_fraction, suppress_small_changes, BlackoutThresholds,
    Raster, DEFAULT_CHANGE_EPSILON,
};
pub use summary::{
    default_usual_sample, usual_sample, BreakReport, ChangeSummary, UsualSample,
    DEFAULT_PCT_FLOOR,
};
