//! Pixel-wise change between two radiance composites.
//!
//! Works on in-memory grids; `NaN` marks pixels without data and propagates
//! through the change images.

use crate::error::{BreakError, Result};
use serde::{Deserialize, Serialize};

/// Default lower bound on the pre radiance used as the percent denominator.
pub const DEFAULT_CHANGE_EPSILON: f64 = 1.0;

/// Thresholds for flagging blackout pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlackoutThresholds {
    /// Percent change at or below which a pixel may be a blackout
    pub pct_thresh: f64,
    /// Post radiance at or below which a pixel may be a blackout
    pub abs_thresh: f64,
}

impl Default for BlackoutThresholds {
    fn default() -> Self {
        Self {
            pct_thresh: -70.0,
            abs_thresh: 0.5,
        }
    }
}

/// A row-major grid of radiance values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Raster {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl Raster {
    /// Create a raster, checking that `data.len() == width * height`.
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(BreakError::EmptyData);
        }
        let expected = width * height;
        if data.len() != expected {
            return Err(BreakError::DimensionMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Value at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    fn check_same_shape(&self, other: &Raster) -> Result<()> {
        if self.width != other.width || self.height != other.height {
            return Err(BreakError::DimensionMismatch {
                expected: self.data.len(),
                got: other.data.len(),
            });
        }
        Ok(())
    }

    fn map_with(&self, other: &Raster, f: impl Fn(f64, f64) -> f64) -> Result<Raster> {
        self.check_same_shape(other)?;
        Ok(Raster {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }
}

/// Absolute (`post - pre`) and percent change images.
///
/// The percent denominator is `max(pre, epsilon)` so dark pixels do not
/// blow up the ratio.
pub fn compute_change(pre: &Raster, post: &Raster, epsilon: f64) -> Result<(Raster, Raster)> {
    let abs = post.map_with(pre, |b, a| b - a)?;
    let pct = abs.map_with(pre, |d, a| 100.0 * d / a.max(epsilon))?;
    Ok((abs, pct))
}

/// Zero out percent changes smaller than `min_abs_pct` in magnitude.
pub fn suppress_small_changes(pct: &Raster, min_abs_pct: f64) -> Raster {
    Raster {
        width: pct.width,
        height: pct.height,
        data: pct
            .data
            .iter()
            .map(|&v| if v.abs() < min_abs_pct { 0.0 } else { v })
            .collect(),
    }
}

/// Likely blackout pixels: a large relative drop ending in low radiance.
///
/// Pixels with missing data in either input are never flagged.
pub fn blackout_mask(
    post: &Raster,
    pct: &Raster,
    thresholds: &BlackoutThresholds,
) -> Result<Vec<bool>> {
    post.check_same_shape(pct)?;
    Ok(post
        .data
        .iter()
        .zip(&pct.data)
        .map(|(&p, &c)| c <= thresholds.pct_thresh && p <= thresholds.abs_thresh)
        .collect())
}

/// Fraction of pixels flagged in a mask.
pub fn hotspot_fraction(mask: &[bool]) -> f64 {
    if mask.is_empty() {
        return 0.0;
    }
    mask.iter().filter(|&&m| m).count() as f64 / mask.len() as f64
}
