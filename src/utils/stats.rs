//! Statistical utility functions.

use std::ops::Range;

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Quantile with linear interpolation between closest ranks.
///
/// Matches the default ("linear") method of NumPy and pandas: the sorted
/// position is `q * (n - 1)`.
///
/// # Returns
/// `NaN` for empty input or `q` outside `[0, 1]`.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return f64::NAN;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;

    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Index in `range` whose value is closest to `target`.
///
/// Ties resolve to the lowest index. Returns `None` when the range is
/// empty or falls outside `values`.
pub fn argmin_abs_deviation(values: &[f64], range: Range<usize>, target: f64) -> Option<usize> {
    if range.start >= range.end || range.end > values.len() {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for i in range {
        let dev = (values[i] - target).abs();
        match best {
            Some((_, best_dev)) if dev >= best_dev => {}
            _ => best = Some((i, dev)),
        }
    }
    best.map(|(i, _)| i)
}
