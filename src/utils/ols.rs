//! Ordinary Least Squares (OLS) regression on an explicit design.
//!
//! The segmented trend models are small (two or four parameters) but their
//! regressors live on very different scales (an index running to a few
//! hundred next to 0/1 indicators) and, for a break close to either end,
//! are nearly collinear. Columns are centered and scaled to unit norm, then
//! the least-squares problem is solved by Householder QR directly on the
//! standardized design. Unlike the normal equations this does not square
//! the condition number, so residuals stay accurate to near machine
//! precision relative to `y` on long series too.

use crate::error::{BreakError, Result};

/// Tolerance for treating a column as constant, relative to its magnitude.
const CONSTANT_TOLERANCE: f64 = 1e-12;

/// A standardized column whose component orthogonal to the preceding
/// columns has a smaller norm than this is considered collinear.
const RANK_TOLERANCE: f64 = 1e-10;

/// Fitted OLS model `y = intercept + X @ coefficients`.
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    /// Regression coefficients, one per design column.
    pub coefficients: Vec<f64>,
    /// Intercept term.
    pub intercept: f64,
    /// Sum of squared residuals.
    pub sse: f64,
    /// Number of observations used in the fit.
    pub n_obs: usize,
}

impl OlsFit {
    /// Number of estimated parameters, intercept included.
    pub fn num_params(&self) -> usize {
        self.coefficients.len() + 1
    }

    /// Predict a single observation from its regressor values.
    pub fn predict(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.coefficients.len() {
            return Err(BreakError::DimensionMismatch {
                expected: self.coefficients.len(),
                got: row.len(),
            });
        }
        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(b, x)| b * x)
                .sum::<f64>())
    }
}

/// Fit OLS regression of `y` on an intercept plus the given columns.
///
/// # Arguments
/// * `y` - Target values (length n)
/// * `columns` - Regressor columns, each of length n; the intercept is implicit
///
/// # Errors
/// * `InsufficientData` when there are fewer observations than parameters
/// * `DimensionMismatch` when a column length differs from `y`
/// * `DegenerateFit` when a column is constant or the design is collinear
pub fn ols_fit<C: AsRef<[f64]>>(y: &[f64], columns: &[C]) -> Result<OlsFit> {
    let n = y.len();
    let k = columns.len();

    if n < k + 1 || n == 0 {
        return Err(BreakError::InsufficientData {
            needed: k + 1,
            got: n,
        });
    }

    for col in columns {
        if col.as_ref().len() != n {
            return Err(BreakError::DimensionMismatch {
                expected: n,
                got: col.as_ref().len(),
            });
        }
    }

    let mean_y = y.iter().sum::<f64>() / n as f64;
    let yc: Vec<f64> = y.iter().map(|v| v - mean_y).collect();

    if k == 0 {
        let sse = yc.iter().map(|r| r * r).sum();
        return Ok(OlsFit {
            coefficients: vec![],
            intercept: mean_y,
            sse,
            n_obs: n,
        });
    }

    // Standardize each regressor: z = (x - mean) / ||x - mean||
    let mut means = Vec::with_capacity(k);
    let mut norms = Vec::with_capacity(k);
    let mut z: Vec<Vec<f64>> = Vec::with_capacity(k);

    for (j, col) in columns.iter().enumerate() {
        let col = col.as_ref();
        let mean = col.iter().sum::<f64>() / n as f64;
        let centered: Vec<f64> = col.iter().map(|x| x - mean).collect();
        let norm = centered.iter().map(|x| x * x).sum::<f64>().sqrt();
        let max_abs = col.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()));

        if norm <= CONSTANT_TOLERANCE * (1.0 + max_abs) {
            return Err(BreakError::DegenerateFit(format!(
                "regressor {} is constant",
                j
            )));
        }

        means.push(mean);
        norms.push(norm);
        z.push(centered.into_iter().map(|x| x / norm).collect());
    }

    let (beta, sse) = householder_solve(z, yc).ok_or_else(|| {
        BreakError::DegenerateFit("design matrix is collinear".into())
    })?;

    let coefficients: Vec<f64> = beta.iter().zip(&norms).map(|(b, s)| b / s).collect();
    let intercept = mean_y
        - coefficients
            .iter()
            .zip(&means)
            .map(|(c, m)| c * m)
            .sum::<f64>();

    Ok(OlsFit {
        coefficients,
        intercept,
        sse,
        n_obs: n,
    })
}

/// Least squares `min ||A @ x - b||` by Householder QR.
///
/// `a` holds the columns of A. Returns the solution and the residual sum of
/// squares, or `None` when a column is (numerically) a combination of the
/// ones before it.
fn householder_solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<(Vec<f64>, f64)> {
    let k = a.len();
    let n = b.len();
    if k == 0 || k >= n {
        return None;
    }

    let mut diag = vec![0.0; k];
    for j in 0..k {
        let norm = a[j][j..].iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm <= RANK_TOLERANCE {
            return None;
        }

        // Reflect a[j][j..] onto alpha * e1, choosing the sign that avoids cancellation
        let alpha = if a[j][j] > 0.0 { -norm } else { norm };
        let mut v = a[j][j..].to_vec();
        v[0] -= alpha;
        let vtv: f64 = v.iter().map(|x| x * x).sum();

        for col in a.iter_mut().skip(j + 1) {
            reflect(&v, vtv, &mut col[j..]);
        }
        reflect(&v, vtv, &mut b[j..]);
        diag[j] = alpha;
    }

    // Back substitution: R @ x = (Q' @ b)[..k], with R above the diagonal in a
    let mut x = vec![0.0; k];
    for i in (0..k).rev() {
        let mut sum = b[i];
        for j in (i + 1)..k {
            sum -= a[j][i] * x[j];
        }
        x[i] = sum / diag[i];
    }

    // The trailing part of Q' @ b is the residual in the rotated basis
    let sse = b[k..].iter().map(|r| r * r).sum();
    Some((x, sse))
}

/// Apply `I - 2 v v' / (v' v)` to `x` in place.
fn reflect(v: &[f64], vtv: f64, x: &mut [f64]) {
    let scale = 2.0 * v.iter().zip(x.iter()).map(|(a, b)| a * b).sum::<f64>() / vtv;
    for (xi, vi) in x.iter_mut().zip(v) {
        *xi -= scale * vi;
    }
}
