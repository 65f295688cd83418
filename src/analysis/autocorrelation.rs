//! ACF / PACF and the Ljung-Box portmanteau test.

use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::error::AppError;
use crate::math::stats;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Autocorrelation {
    /// Lags `0..=lags`.
    pub acf: Vec<f64>,
    /// Lags `0..=lags`, adjusted Yule-Walker.
    pub pacf: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LjungBox {
    pub statistic: f64,
    pub p_value: f64,
    pub lags: usize,
}

pub fn autocorrelation_analysis(values: &[f64], lags: usize) -> Result<Autocorrelation, AppError> {
    let n = values.len();
    if lags == 0 {
        return Err(AppError::new(2, "Number of lags must be positive."));
    }
    if n < 2 * (lags + 1) {
        return Err(AppError::new(
            2,
            format!("Too many lags ({lags}) for {n} observations; need lags < n / 2."),
        ));
    }

    let acf = acf(values, lags);
    let pacf = pacf_from_acf(&acf_adjusted(values, lags));
    Ok(Autocorrelation { acf, pacf })
}

/// Sample autocorrelation with the biased (`n`) denominator.
///
/// Constant input has no defined correlation; every lag after 0 is reported as 0.
pub fn acf(values: &[f64], lags: usize) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let lags = lags.min(n - 1);
    let m = stats::mean(values).unwrap_or(0.0);
    let denom: f64 = values.iter().map(|v| (v - m).powi(2)).sum();

    (0..=lags)
        .map(|k| {
            if k == 0 {
                return 1.0;
            }
            if denom == 0.0 {
                return 0.0;
            }
            let num: f64 = values[k..]
                .iter()
                .zip(&values[..n - k])
                .map(|(a, b)| (a - m) * (b - m))
                .sum();
            num / denom
        })
        .collect()
}

/// Autocorrelation from autocovariances with the `n - k` denominator.
///
/// Feeding this to `pacf_from_acf` gives the adjusted Yule-Walker PACF.
fn acf_adjusted(values: &[f64], lags: usize) -> Vec<f64> {
    let n = values.len();
    acf(values, lags)
        .into_iter()
        .enumerate()
        .map(|(k, r)| r * n as f64 / (n - k) as f64)
        .collect()
}

/// Durbin-Levinson recursion on an autocorrelation sequence.
///
/// Solves the Yule-Walker equations for every order up to `acf.len() - 1`.
pub fn pacf_from_acf(acf: &[f64]) -> Vec<f64> {
    if acf.is_empty() {
        return Vec::new();
    }
    let max_lag = acf.len() - 1;
    let mut out = vec![0.0; max_lag + 1];
    out[0] = 1.0;
    if max_lag == 0 {
        return out;
    }

    let mut phi_prev = vec![0.0; max_lag + 1];
    let mut phi = vec![0.0; max_lag + 1];
    phi_prev[1] = acf[1];
    out[1] = acf[1];

    for k in 2..=max_lag {
        let num = acf[k] - (1..k).map(|j| phi_prev[j] * acf[k - j]).sum::<f64>();
        let den = 1.0 - (1..k).map(|j| phi_prev[j] * acf[j]).sum::<f64>();
        if den.abs() < 1e-12 {
            break;
        }
        let pkk = num / den;
        phi[k] = pkk;
        for j in 1..k {
            phi[j] = phi_prev[j] - pkk * phi_prev[k - j];
        }
        out[k] = pkk;
        phi_prev[..=k].copy_from_slice(&phi[..=k]);
    }
    out
}

/// `Q = n (n + 2) Σ ρ_k² / (n - k)` for `k = 1..=lags`, compared with χ²(lags).
pub fn ljung_box(values: &[f64], lags: usize) -> Option<LjungBox> {
    let n = values.len();
    if lags == 0 || n <= lags {
        return None;
    }
    let rho = acf(values, lags);
    let nf = n as f64;
    let q = nf
        * (nf + 2.0)
        * rho
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, r)| r * r / (nf - k as f64))
            .sum::<f64>();

    let chi2 = ChiSquared::new(lags as f64).ok()?;
    Some(LjungBox {
        statistic: q,
        p_value: chi2.sf(q),
        lags,
    })
}
