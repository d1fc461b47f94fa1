//! Trend models and the information criterion used to compare them.
//!
//! Both models regress the values on the sample index `t = 0..n-1`, not on
//! wall-clock time, so irregular sampling does not distort the fit.
//!
//! # Models
//!
//! - **Linear**: `y ~ 1 + t` (2 parameters)
//! - **Segmented(k)**: `y ~ 1 + t + I(t>=k) + I(t>=k)*(t - k)` (4 parameters);
//!   level and slope may both change at index `k`
//!
//! # Criterion
//!
//! `BIC = n * ln(SSE / n) + p * ln(n)`
//!
//! A perfect fit has `SSE == 0`, where the logarithm is undefined. Residual
//! sums are clamped to a floor at the round-off level of the series
//! magnitude, so a zero (or round-off sized) residual contributes a large
//! but finite negative term while any real residual passes through
//! unchanged. When both models hit the floor the comparison reduces to the
//! parameter penalty alone.

use crate::error::Result;
use crate::utils::ols_fit;
use serde::{Deserialize, Serialize};

/// Per-sample residual floor relative to the largest magnitude in the series.
pub const RESIDUAL_FLOOR_RATIO: f64 = 1e-12;

/// Trend model fitted against the sample index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendModel {
    /// Single intercept and slope over the whole series.
    Linear,
    /// Intercept and slope may change starting at `break_index`.
    Segmented { break_index: usize },
}

impl TrendModel {
    /// Number of estimated parameters, intercept included.
    pub fn num_params(&self) -> usize {
        match self {
            TrendModel::Linear => 2,
            TrendModel::Segmented { .. } => 4,
        }
    }

    /// Build the regressor columns (without the intercept) for `n` samples.
    pub fn design(&self, n: usize) -> Vec<Vec<f64>> {
        let t: Vec<f64> = (0..n).map(|i| i as f64).collect();
        match *self {
            TrendModel::Linear => vec![t],
            TrendModel::Segmented { break_index } => {
                let step: Vec<f64> = (0..n)
                    .map(|i| if i >= break_index { 1.0 } else { 0.0 })
                    .collect();
                let ramp: Vec<f64> = (0..n)
                    .map(|i| {
                        if i >= break_index {
                            (i - break_index) as f64
                        } else {
                            0.0
                        }
                    })
                    .collect();
                vec![t, step, ramp]
            }
        }
    }

    /// Fit the model by OLS and return its sum of squared residuals.
    pub fn fit_sse(&self, values: &[f64]) -> Result<f64> {
        let columns = self.design(values.len());
        Ok(ols_fit(values, &columns)?.sse)
    }
}

/// Smallest residual sum admitted into the criterion for `values`.
///
/// `n * (RESIDUAL_FLOOR_RATIO * max|y|)^2`: residuals below this are
/// indistinguishable from round-off in the fit.
pub fn residual_floor(values: &[f64]) -> f64 {
    let max_abs = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    (values.len() as f64 * (RESIDUAL_FLOOR_RATIO * max_abs).powi(2)).max(f64::MIN_POSITIVE)
}

/// Bayesian information criterion for a Gaussian least-squares fit.
///
/// `sse` below `floor` is clamped to `floor`.
pub fn bic(sse: f64, n_obs: usize, num_params: usize, floor: f64) -> f64 {
    let n = n_obs as f64;
    let sse = sse.max(floor);
    n * (sse.ln() - n.ln()) + num_params as f64 * n.ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn num_params() {
        assert_eq!(TrendModel::Linear.num_params(), 2);
        assert_eq!(TrendModel::Segmented { break_index: 3 }.num_params(), 4);
    }

    #[test]
    fn segmented_design_columns() {
        let design = TrendModel::Segmented { break_index: 2 }.design(4);
        assert_eq!(design.len(), 3);
        assert_eq!(design[0], vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(design[1], vec![0.0, 0.0, 1.0, 1.0]);
        assert_eq!(design[2], vec![0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn linear_sse_of_perfect_line_is_negligible() {
        let values: Vec<f64> = (0..20).map(|i| 3.0 + 0.5 * i as f64).collect();
        let sse = TrendModel::Linear.fit_sse(&values).unwrap();
        assert!(sse < residual_floor(&values));
    }

    #[test]
    fn segmented_sse_of_two_lines_is_negligible() {
        let values: Vec<f64> = (0..16)
            .map(|i| if i < 8 { 1.0 + i as f64 } else { 50.0 - 2.0 * i as f64 })
            .collect();
        let sse = TrendModel::Segmented { break_index: 8 }
            .fit_sse(&values)
            .unwrap();
        let linear = TrendModel::Linear.fit_sse(&values).unwrap();
        assert!(sse < residual_floor(&values));
        assert!(linear > 1.0);
    }

    #[test]
    fn bic_known_value() {
        // n=10, SSE=10 -> 10*ln(1) + 2*ln(10)
        let value = bic(10.0, 10, 2, 1e-12);
        assert_relative_eq!(value, 2.0 * 10.0_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn bic_zero_residual_is_finite() {
        let floor = residual_floor(&[1.0, 2.0, 3.0]);
        let value = bic(0.0, 3, 2, floor);
        assert!(value.is_finite());
        assert!(value < -60.0);
    }

    #[test]
    fn residual_floor_of_constant_series_is_positive() {
        let floor = residual_floor(&[4.0; 10]);
        assert!(floor > 0.0);
        assert!(bic(0.0, 10, 4, floor).is_finite());
    }

    #[test]
    fn residual_floor_scales_with_magnitude_not_spread() {
        // Same magnitude, very different spread: same floor
        let flat = vec![100.0; 20];
        let spread: Vec<f64> = (0..20).map(|i| 100.0 - 10.0 * i as f64).collect();
        assert_relative_eq!(residual_floor(&flat), 20.0 * 1e-20, max_relative = 1e-12);
        assert_relative_eq!(residual_floor(&spread), residual_floor(&flat), max_relative = 1e-12);
        assert_eq!(residual_floor(&[0.0; 5]), f64::MIN_POSITIVE);
    }

    #[test]
    fn small_real_residuals_are_not_floored() {
        // y = t plus a tiny exact level shift at 10
        let values: Vec<f64> = (0..20)
            .map(|i| i as f64 + if i >= 10 { 3e-4 } else { 0.0 })
            .collect();
        let floor = residual_floor(&values);
        let linear = TrendModel::Linear.fit_sse(&values).unwrap();

        assert!(linear > 1e6 * floor);
        assert_relative_eq!(bic(linear, 20, 2, floor), bic(linear, 20, 2, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn floored_models_differ_by_penalty_only() {
        let floor = 1e-6;
        let delta = bic(0.0, 20, 4, floor) - bic(1e-30, 20, 2, floor);
        assert_relative_eq!(delta, 2.0 * 20.0_f64.ln(), epsilon = 1e-9);
    }
}
