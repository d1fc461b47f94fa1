//! Summaries derived from a break result.
//!
//! Covers the numbers a dashboard shows next to the map: regime means and
//! their change, the "usual" sample used when no break exists, and a plain
//! text report.

use crate::changepoint::BreakResult;
use crate::core::TimeSeries;
use crate::error::{BreakError, Result};
use crate::utils::quantile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest pre-break mean used as the percent change denominator.
pub const DEFAULT_PCT_FLOOR: f64 = 0.2;

/// Absolute and relative change between the pre- and post-break regimes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub pre_mean: f64,
    pub post_mean: f64,
    /// `post_mean - pre_mean`
    pub change: f64,
    /// `100 * change / max(pre_mean, floor)`
    pub pct_change: f64,
}

impl ChangeSummary {
    /// Summarize a detected break using [`DEFAULT_PCT_FLOOR`].
    ///
    /// Returns `None` when the result has no break.
    pub fn from_result(result: &BreakResult) -> Option<Self> {
        Self::with_floor(result, DEFAULT_PCT_FLOOR)
    }

    /// Summarize a detected break with a custom denominator floor.
    pub fn with_floor(result: &BreakResult, floor: f64) -> Option<Self> {
        let regime = result.regime.as_ref()?;
        Some(Self::from_means(regime.pre_mean, regime.post_mean, floor))
    }

    pub fn from_means(pre_mean: f64, post_mean: f64, floor: f64) -> Self {
        let change = post_mean - pre_mean;
        Self {
            pre_mean,
            post_mean,
            change,
            pct_change: 100.0 * change / pre_mean.max(floor),
        }
    }
}

/// A single sample picked to stand for typical conditions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsualSample {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Latest sample whose value lies strictly between two quantiles.
///
/// Used in place of a pre/post pair when no break is detected. Returns
/// `Ok(None)` for an empty series or when no value falls strictly inside
/// the band (e.g. a constant series).
///
/// # Errors
/// `InvalidParameter` unless `0 <= lower_q < upper_q <= 1`.
pub fn usual_sample(series: &TimeSeries, lower_q: f64, upper_q: f64) -> Result<Option<UsualSample>> {
    if !(0.0..=1.0).contains(&lower_q) || !(0.0..=1.0).contains(&upper_q) || lower_q >= upper_q {
        return Err(BreakError::InvalidParameter(format!(
            "quantile band must satisfy 0 <= lower < upper <= 1, got [{}, {}]",
            lower_q, upper_q
        )));
    }

    if series.is_empty() {
        return Ok(None);
    }

    let lo = quantile(series.values(), lower_q);
    let hi = quantile(series.values(), upper_q);

    Ok(series
        .iter()
        .enumerate()
        .filter(|(_, (_, v))| *v > lo && *v < hi)
        .last()
        .map(|(index, (timestamp, value))| UsualSample {
            index,
            timestamp,
            value,
        }))
}

/// [`usual_sample`] with the 40th/60th percentile band.
pub fn default_usual_sample(series: &TimeSeries) -> Result<Option<UsualSample>> {
    usual_sample(series, 0.40, 0.60)
}

/// Human-readable rendering of a [`BreakResult`].
#[derive(Debug, Clone, Copy)]
pub struct BreakReport<'a> {
    result: &'a BreakResult,
}

impl<'a> BreakReport<'a> {
    pub fn new(result: &'a BreakResult) -> Self {
        Self { result }
    }
}

fn fmt_point(f: &mut fmt::Formatter<'_>, ts: Option<DateTime<Utc>>, index: usize) -> fmt::Result {
    match ts {
        Some(ts) => write!(f, "{}", ts.format("%Y-%m-%d")),
        None => write!(f, "index {}", index),
    }
}

impl fmt::Display for BreakReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(regime) = self.result.regime.as_ref() else {
            return write!(
                f,
                "No structural break detected (delta BIC {:.2}).",
                self.result.delta_criterion
            );
        };

        writeln!(
            f,
            "Structural break detected (delta BIC {:.2}).",
            self.result.delta_criterion
        )?;

        write!(f, "- Break at: ")?;
        fmt_point(f, regime.break_timestamp, regime.break_index)?;
        writeln!(f, " (first sample of new regime)")?;

        let summary = ChangeSummary::from_means(regime.pre_mean, regime.post_mean, DEFAULT_PCT_FLOOR);
        writeln!(
            f,
            "- Pre mean: {:.2} | Post mean: {:.2} | Change: {:.2} ({:+.1}%)",
            summary.pre_mean, summary.post_mean, summary.change, summary.pct_change
        )?;

        write!(f, "- Pre sample: ")?;
        fmt_point(f, regime.pre_timestamp, regime.pre_index)?;
        write!(f, " - Post sample: ")?;
        fmt_point(f, regime.post_timestamp, regime.post_index)
    }
}
