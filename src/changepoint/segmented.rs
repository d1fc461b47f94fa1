//! Single structural break detection by segmented linear regression.
//!
//! Compares one global linear trend against the best two-segment trend
//! (level and slope may change at the break) using BIC. A break is accepted
//! when the two-segment model improves the criterion by at least the
//! configured threshold.

use super::criterion::{bic, residual_floor, TrendModel};
use crate::core::TimeSeries;
use crate::error::{BreakError, Result};
use crate::utils::{argmin_abs_deviation, mean};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for segmented break detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakConfig {
    /// Minimum number of samples on each side of a candidate break
    pub min_segment_size: usize,
    /// Accept a break only when `BIC(k*) - BIC(linear) <= criterion_threshold`
    pub criterion_threshold: f64,
    /// Number of samples before the break searched for the pre representative
    pub pre_window: usize,
    /// Last offset after the break searched for the post representative
    pub post_window: usize,
    /// First offset after the break searched for the post representative
    pub post_gap: usize,
}

impl Default for BreakConfig {
    fn default() -> Self {
        Self {
            min_segment_size: 6,
            criterion_threshold: -10.0,
            pre_window: 6,
            post_window: 12,
            post_gap: 1,
        }
    }
}

impl BreakConfig {
    /// Set the minimum segment size.
    pub fn min_segment_size(mut self, size: usize) -> Self {
        self.min_segment_size = size;
        self
    }

    /// Set the acceptance threshold for the criterion delta.
    pub fn criterion_threshold(mut self, threshold: f64) -> Self {
        self.criterion_threshold = threshold;
        self
    }

    /// Set the pre representative search window.
    pub fn pre_window(mut self, window: usize) -> Self {
        self.pre_window = window;
        self
    }

    /// Set the post representative search window.
    pub fn post_window(mut self, window: usize) -> Self {
        self.post_window = window;
        self
    }

    /// Set the gap skipped right after the break.
    pub fn post_gap(mut self, gap: usize) -> Self {
        self.post_gap = gap;
        self
    }

    /// Minimum number of usable samples: `2 * min_segment_size + 1`.
    pub fn min_samples(&self) -> usize {
        2 * self.min_segment_size + 1
    }

    /// Check the parameters without looking at any data.
    pub fn validate(&self) -> Result<()> {
        // With a single sample on the post side the slope-change column is
        // identically zero.
        if self.min_segment_size < 2 {
            return Err(BreakError::InvalidParameter(format!(
                "min_segment_size must be at least 2, got {}",
                self.min_segment_size
            )));
        }
        if !self.criterion_threshold.is_finite() {
            return Err(BreakError::InvalidParameter(
                "criterion_threshold must be finite".into(),
            ));
        }
        Ok(())
    }
}

/// Fields that only exist when a break was accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakRegime {
    /// First index of the post-break segment
    pub break_index: usize,
    /// Index of the representative pre-break sample
    pub pre_index: usize,
    /// Index of the representative post-break sample
    pub post_index: usize,
    /// Mean of values in `[0, break_index)`
    pub pre_mean: f64,
    /// Mean of values in `[break_index, n)`
    pub post_mean: f64,
    /// Timestamp at `break_index` (absent for bare value input)
    pub break_timestamp: Option<DateTime<Utc>>,
    /// Timestamp at `pre_index` (absent for bare value input)
    pub pre_timestamp: Option<DateTime<Utc>>,
    /// Timestamp at `post_index` (absent for bare value input)
    pub post_timestamp: Option<DateTime<Utc>>,
}

/// Result of segmented break detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakResult {
    /// Whether the two-segment model was accepted
    pub has_break: bool,
    /// `BIC(k*) - BIC(linear)`; more negative means stronger evidence
    pub delta_criterion: f64,
    /// Best candidate break index, reported even when rejected
    pub candidate_index: usize,
    /// Number of samples analysed
    pub n_obs: usize,
    /// Break details, present only when `has_break` is true
    pub regime: Option<BreakRegime>,
}

impl BreakResult {
    /// First index of the new regime.
    pub fn break_index(&self) -> Option<usize> {
        self.regime.as_ref().map(|r| r.break_index)
    }

    /// Timestamp of the first sample of the new regime.
    pub fn break_timestamp(&self) -> Option<DateTime<Utc>> {
        self.regime.as_ref().and_then(|r| r.break_timestamp)
    }

    /// Timestamp of the sample typifying the pre-break regime.
    pub fn pre_representative_timestamp(&self) -> Option<DateTime<Utc>> {
        self.regime.as_ref().and_then(|r| r.pre_timestamp)
    }

    /// Timestamp of the sample typifying the post-break regime.
    pub fn post_representative_timestamp(&self) -> Option<DateTime<Utc>> {
        self.regime.as_ref().and_then(|r| r.post_timestamp)
    }

    /// Index of the sample typifying the pre-break regime.
    pub fn pre_representative_index(&self) -> Option<usize> {
        self.regime.as_ref().map(|r| r.pre_index)
    }

    /// Index of the sample typifying the post-break regime.
    pub fn post_representative_index(&self) -> Option<usize> {
        self.regime.as_ref().map(|r| r.post_index)
    }

    /// Mean of the samples before the break.
    pub fn pre_mean(&self) -> Option<f64> {
        self.regime.as_ref().map(|r| r.pre_mean)
    }

    /// Mean of the samples from the break onwards.
    pub fn post_mean(&self) -> Option<f64> {
        self.regime.as_ref().map(|r| r.post_mean)
    }
}

/// Detect a single structural break in a time series.
///
/// # Arguments
/// * `series` - Input series (already sorted and free of missing values)
/// * `config` - Detection parameters
///
/// # Errors
/// * `InvalidParameter` for an invalid `config`
/// * `InsufficientData` when `series.len() < 2 * min_segment_size + 1`
/// * `DegenerateFit` if a regression is numerically singular
///
/// # Example
/// ```
/// use trendbreak::changepoint::{detect_break, BreakConfig};
/// use trendbreak::core::TimeSeries;
///
/// let mut values = vec![10.0, 11.0, 10.5, 9.5, 10.0, 10.2, 9.8, 10.1];
/// values.extend([1.0, 1.2, 0.9, 1.1, 1.0, 0.8, 1.1, 1.0]);
/// let series = TimeSeries::monthly(2021, 1, values).unwrap();
///
/// let result = detect_break(&series, &BreakConfig::default()).unwrap();
/// assert!(result.has_break);
/// assert_eq!(result.break_index(), Some(8));
/// ```
pub fn detect_break(series: &TimeSeries, config: &BreakConfig) -> Result<BreakResult> {
    let mut result = detect_break_values(series.values(), config)?;

    if let Some(regime) = result.regime.as_mut() {
        regime.break_timestamp = series.timestamp(regime.break_index);
        regime.pre_timestamp = series.timestamp(regime.pre_index);
        regime.post_timestamp = series.timestamp(regime.post_index);
    }

    Ok(result)
}

/// Like [`detect_break`], but a too-short series yields `Ok(None)`.
pub fn detect_break_or_none(
    series: &TimeSeries,
    config: &BreakConfig,
) -> Result<Option<BreakResult>> {
    match detect_break(series, config) {
        Ok(result) => Ok(Some(result)),
        Err(BreakError::InsufficientData { needed, got }) => {
            debug!(needed, got, "series too short for break detection");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Detect a single structural break in bare, equally weighted samples.
///
/// Non-finite values are dropped first; indices in the result refer to the
/// remaining samples. Timestamps in the result are always `None`.
pub fn detect_break_values(values: &[f64], config: &BreakConfig) -> Result<BreakResult> {
    config.validate()?;

    let y: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = y.len();
    let m = config.min_segment_size;

    if n < config.min_samples() {
        return Err(BreakError::InsufficientData {
            needed: config.min_samples(),
            got: n,
        });
    }

    let floor = residual_floor(&y);
    let linear = TrendModel::Linear;
    let bic_linear = bic(linear.fit_sse(&y)?, n, linear.num_params(), floor);

    // First minimum wins on ties
    let mut best: Option<(usize, f64)> = None;
    for k in m..(n - m) {
        let model = TrendModel::Segmented { break_index: k };
        let bic_k = bic(model.fit_sse(&y)?, n, model.num_params(), floor);
        if best.map_or(true, |(_, b)| bic_k < b) {
            best = Some((k, bic_k));
        }
    }

    let (k, best_bic) = best.ok_or_else(|| BreakError::InsufficientData {
        needed: config.min_samples(),
        got: n,
    })?;

    let delta = best_bic - bic_linear;
    let has_break = delta <= config.criterion_threshold;

    debug!(
        n_obs = n,
        candidate = k,
        delta_criterion = delta,
        threshold = config.criterion_threshold,
        has_break,
        "segmented trend comparison"
    );

    let regime = if has_break {
        Some(select_representatives(&y, k, config))
    } else {
        None
    };

    Ok(BreakResult {
        has_break,
        delta_criterion: delta,
        candidate_index: k,
        n_obs: n,
        regime,
    })
}

/// Pick the samples closest to each regime mean near the break.
///
/// The pre search covers `[k - pre_window - 1, k - 1)`, skipping the sample
/// right before the break; the post search covers
/// `[k + post_gap, k + post_window]`, clamped to the series. An empty window
/// falls back to the whole segment.
fn select_representatives(y: &[f64], k: usize, config: &BreakConfig) -> BreakRegime {
    let n = y.len();
    let pre_mean = mean(&y[..k]);
    let post_mean = mean(&y[k..]);

    let pre_lo = k.saturating_sub(config.pre_window + 1);
    let pre_hi = pre_lo.max(k.saturating_sub(1));
    let pre_range = if pre_hi > pre_lo { pre_lo..pre_hi } else { 0..k };

    let post_start = (k + config.post_gap).min(n - 1);
    let post_end = (k + config.post_window).min(n - 1);
    let post_range = if post_end >= post_start {
        post_start..post_end + 1
    } else {
        k..n
    };

    // Both ranges are non-empty: 0 < k < n
    let pre_index = argmin_abs_deviation(y, pre_range, pre_mean).unwrap_or(0);
    let post_index = argmin_abs_deviation(y, post_range, post_mean).unwrap_or(k);

    BreakRegime {
        break_index: k,
        pre_index,
        post_index,
        pre_mean,
        post_mean,
        break_timestamp: None,
        pre_timestamp: None,
        post_timestamp: None,
    }
}
