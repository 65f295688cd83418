//! Ordinary least squares.
//!
//! The analysis code repeatedly solves small regressions:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! - linear trend (`price ~ 1 + t`)
//! - the ADF regression (`Δy_t ~ 1 + y_{t-1} + Δy_{t-1} + ... + Δy_{t-p}`)
//! - KPSS detrending (`y_t ~ 1 + t`)
//!
//! We solve β with SVD (robust for tall, nearly collinear designs) and only
//! form `(XᵀX)⁻¹` when coefficient standard errors are needed.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Result of an OLS fit with the quantities needed for inference.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub beta: DVector<f64>,
    pub residuals: DVector<f64>,
    /// Sum of squared residuals.
    pub ssr: f64,
    /// Number of observations.
    pub nobs: usize,
    /// Standard error of each coefficient (`None` when `(XᵀX)` is singular
    /// or there are no residual degrees of freedom).
    pub std_errors: Option<Vec<f64>>,
}

impl OlsFit {
    /// t-statistic for coefficient `idx`.
    pub fn t_stat(&self, idx: usize) -> Option<f64> {
        let se = self.std_errors.as_ref()?.get(idx).copied()?;
        if se > 0.0 && se.is_finite() {
            Some(self.beta[idx] / se)
        } else {
            None
        }
    }

    /// Gaussian log-likelihood at the ML variance estimate.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion, counting every regressor.
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.beta.len() as f64
    }
}

/// Fit `y ~ X` and compute residuals plus coefficient standard errors.
pub fn ols_fit(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<OlsFit> {
    let (nobs, k) = x.shape();
    if nobs == 0 || nobs != y.len() || nobs < k {
        return None;
    }

    let beta = solve_least_squares(x, y)?;
    let residuals = y - x * &beta;
    let ssr = residuals.iter().map(|r| r * r).sum::<f64>();

    let std_errors = if nobs > k {
        let sigma2 = ssr / (nobs - k) as f64;
        (x.transpose() * x)
            .try_inverse()
            .map(|inv| (0..k).map(|i| (sigma2 * inv[(i, i)]).max(0.0).sqrt()).collect())
    } else {
        None
    };

    Some(OlsFit {
        beta,
        residuals,
        ssr,
        nobs,
        std_errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn ols_fit_reports_standard_errors() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [1.1, 2.9, 5.2, 7.1, 8.8];
        let mut data = Vec::new();
        for &x in &xs {
            data.push(1.0);
            data.push(x);
        }
        let x = DMatrix::from_row_slice(5, 2, &data);
        let y = DVector::from_row_slice(&ys);

        let fit = ols_fit(&x, &y).unwrap();
        assert!((fit.beta[1] - 1.96).abs() < 1e-9);
        let se = fit.std_errors.as_ref().unwrap();
        assert!(se.iter().all(|v| v.is_finite() && *v > 0.0));
        assert!(fit.t_stat(1).unwrap() > 10.0);
        assert!(fit.aic().is_finite());
    }

    #[test]
    fn ols_fit_rejects_underdetermined() {
        let x = DMatrix::from_row_slice(1, 2, &[1.0, 0.0]);
        let y = DVector::from_row_slice(&[1.0]);
        assert!(ols_fit(&x, &y).is_none());
    }
}
