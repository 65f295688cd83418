//! Unit-root (ADF) and stationarity (KPSS) tests.
//!
//! The two tests have opposite null hypotheses:
//!
//! - ADF, H0: unit root. Small p-value → stationary.
//! - KPSS, H0: trend stationary. Large p-value → stationary.
//!
//! ADF uses a constant-only regression with AIC lag selection and MacKinnon
//! (2010) response surfaces; KPSS uses constant + trend and the Hobijn et al.
//! (1998) automatic bandwidth.

use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{info, warn};

use crate::error::AppError;
use crate::math::{OlsFit, ols_fit};

const MIN_OBSERVATIONS: usize = 10;

// MacKinnon (2010) "c" surface for one variable: b0 + b1/n + b2/n^2 + b3/n^3.
const ADF_CRIT_1: [f64; 4] = [-3.43035, -6.5393, -16.786, -79.433];
const ADF_CRIT_5: [f64; 4] = [-2.86154, -2.8903, -4.234, -40.04];
const ADF_CRIT_10: [f64; 4] = [-2.56677, -1.5384, -2.809, 0.0];

// MacKinnon (1994) approximate p-value polynomials, constant only.
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALLP: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGEP: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

// KPSS critical values with trend (Kwiatkowski et al. 1992, table 1).
const KPSS_CRIT: [f64; 4] = [0.119, 0.146, 0.176, 0.216];
const KPSS_PVALS: [f64; 4] = [0.10, 0.05, 0.025, 0.01];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdfCriticalValues {
    #[serde(rename = "1%")]
    pub one: f64,
    #[serde(rename = "5%")]
    pub five: f64,
    #[serde(rename = "10%")]
    pub ten: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpssCriticalValues {
    #[serde(rename = "10%")]
    pub ten: f64,
    #[serde(rename = "5%")]
    pub five: f64,
    #[serde(rename = "2.5%")]
    pub two_half: f64,
    #[serde(rename = "1%")]
    pub one: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdfResult {
    pub test_statistic: f64,
    pub p_value: f64,
    pub used_lag: usize,
    pub nobs: usize,
    pub critical_values: AdfCriticalValues,
    pub is_stationary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpssResult {
    pub test_statistic: f64,
    /// Interpolated from the table; clamped to `[0.01, 0.10]`.
    pub p_value: f64,
    pub lags: usize,
    pub critical_values: KpssCriticalValues,
    pub is_stationary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationarityReport {
    pub adf: Option<AdfResult>,
    pub kpss: Option<KpssResult>,
    pub conclusion: String,
}

pub fn test_stationarity(values: &[f64], alpha: f64) -> Result<StationarityReport, AppError> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(AppError::new(
            2,
            format!("Alpha must be between 0 and 1, got {alpha}"),
        ));
    }
    let clean: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if clean.len() < MIN_OBSERVATIONS {
        return Err(AppError::new(
            3,
            format!(
                "Insufficient data for stationarity testing: {} observations (minimum {MIN_OBSERVATIONS} required)",
                clean.len()
            ),
        ));
    }

    let adf = match adf_test(&clean, alpha) {
        Ok(r) => Some(r),
        Err(err) => {
            warn!(error = %err, "ADF test failed");
            None
        }
    };
    let kpss = match kpss_test(&clean, alpha) {
        Ok(r) => Some(r),
        Err(err) => {
            warn!(error = %err, "KPSS test failed");
            None
        }
    };

    let conclusion = match (&adf, &kpss) {
        (Some(a), Some(k)) => match (a.is_stationary, k.is_stationary) {
            (true, true) => "Stationary",
            (false, false) => "Non-stationary",
            _ => "Inconclusive - conflicting results",
        },
        _ => "Unable to determine",
    }
    .to_string();

    info!(conclusion = %conclusion, "stationarity test completed");
    Ok(StationarityReport { adf, kpss, conclusion })
}

/// Augmented Dickey-Fuller test with a constant and AIC lag selection.
pub fn adf_test(values: &[f64], alpha: f64) -> Result<AdfResult, AppError> {
    let n = values.len();
    let upper = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    // One trend term (the constant).
    let max_lag = upper.min((n / 2).saturating_sub(2));
    let diff: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();

    // Every candidate lag is scored on the sample implied by `max_lag`.
    let mut best: Option<(f64, usize)> = None;
    for lag in 0..=max_lag {
        let Some(fit) = adf_regression(values, &diff, max_lag, lag) else {
            continue;
        };
        let aic = fit.aic();
        if best.is_none_or(|(b, _)| aic < b) {
            best = Some((aic, lag));
        }
    }
    let (_, used_lag) = best.ok_or_else(|| AppError::new(4, "ADF regression could not be solved."))?;

    let fit = adf_regression(values, &diff, used_lag, used_lag)
        .ok_or_else(|| AppError::new(4, "ADF regression could not be solved."))?;
    let stat = fit
        .t_stat(1)
        .ok_or_else(|| AppError::new(4, "ADF statistic is undefined (zero variance)."))?;

    let p_value = mackinnon_p(stat)?;
    let nobs = fit.nobs;
    Ok(AdfResult {
        test_statistic: stat,
        p_value,
        used_lag,
        nobs,
        critical_values: AdfCriticalValues {
            one: mackinnon_crit(&ADF_CRIT_1, nobs),
            five: mackinnon_crit(&ADF_CRIT_5, nobs),
            ten: mackinnon_crit(&ADF_CRIT_10, nobs),
        },
        is_stationary: p_value < alpha,
    })
}

/// `Δy_t ~ 1 + y_{t-1} + Δy_{t-1} + ... + Δy_{t-lag}` on the rows a `sample_lag` model can use.
fn adf_regression(values: &[f64], diff: &[f64], sample_lag: usize, lag: usize) -> Option<OlsFit> {
    let rows = diff.len().checked_sub(sample_lag)?;
    let cols = 2 + lag;
    if rows <= cols {
        return None;
    }

    let mut x = DMatrix::zeros(rows, cols);
    let mut y = DVector::zeros(rows);
    for r in 0..rows {
        // Index into `diff` of the dependent observation.
        let t = sample_lag + r;
        y[r] = diff[t];
        x[(r, 0)] = 1.0;
        x[(r, 1)] = values[t];
        for j in 1..=lag {
            x[(r, 1 + j)] = diff[t - j];
        }
    }
    ols_fit(&x, &y)
}

fn mackinnon_crit(coef: &[f64; 4], nobs: usize) -> f64 {
    let n = nobs as f64;
    coef[0] + coef[1] / n + coef[2] / (n * n) + coef[3] / (n * n * n)
}

/// Approximate asymptotic p-value of the ADF statistic.
pub fn mackinnon_p(stat: f64) -> Result<f64, AppError> {
    if stat > TAU_MAX {
        return Ok(1.0);
    }
    if stat < TAU_MIN {
        return Ok(0.0);
    }
    let coef: &[f64] = if stat <= TAU_STAR { &TAU_SMALLP } else { &TAU_LARGEP };
    let z = coef.iter().rev().fold(0.0, |acc, c| acc * stat + c);

    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Normal distribution error: {e}")))?;
    Ok(normal.cdf(z))
}

/// KPSS test around a linear trend with automatic lag selection.
pub fn kpss_test(values: &[f64], alpha: f64) -> Result<KpssResult, AppError> {
    let n = values.len();
    let mut data = Vec::with_capacity(n * 2);
    for t in 0..n {
        data.push(1.0);
        data.push((t + 1) as f64);
    }
    let x = DMatrix::from_row_slice(n, 2, &data);
    let y = DVector::from_column_slice(values);
    let fit = ols_fit(&x, &y).ok_or_else(|| AppError::new(4, "KPSS detrending failed."))?;
    let resid: Vec<f64> = fit.residuals.iter().copied().collect();

    let lags = kpss_autolag(&resid).min(n - 1);

    let nf = n as f64;
    let mut cumsum = 0.0;
    let eta = resid
        .iter()
        .map(|r| {
            cumsum += r;
            cumsum * cumsum
        })
        .sum::<f64>()
        / (nf * nf);

    let mut s_hat: f64 = resid.iter().map(|r| r * r).sum();
    for i in 1..=lags {
        s_hat += 2.0 * lagged_product(&resid, i) * (1.0 - i as f64 / (lags as f64 + 1.0));
    }
    s_hat /= nf;
    if s_hat <= 0.0 || !s_hat.is_finite() {
        return Err(AppError::new(4, "KPSS long-run variance is not positive."));
    }

    let stat = eta / s_hat;
    let p_value = interp_clamped(stat, &KPSS_CRIT, &KPSS_PVALS);
    Ok(KpssResult {
        test_statistic: stat,
        p_value,
        lags,
        critical_values: KpssCriticalValues {
            ten: KPSS_CRIT[0],
            five: KPSS_CRIT[1],
            two_half: KPSS_CRIT[2],
            one: KPSS_CRIT[3],
        },
        is_stationary: p_value > alpha,
    })
}

/// Σ r_t r_{t-i}
fn lagged_product(resid: &[f64], i: usize) -> f64 {
    resid[i..].iter().zip(&resid[..resid.len() - i]).map(|(a, b)| a * b).sum()
}

/// Hobijn, Franses & Ooms (1998) data-dependent bandwidth.
fn kpss_autolag(resid: &[f64]) -> usize {
    let n = resid.len();
    let nf = n as f64;
    let covlags = nf.powf(2.0 / 9.0) as usize;

    let mut s0 = resid.iter().map(|r| r * r).sum::<f64>() / nf;
    let mut s1 = 0.0;
    for i in 1..=covlags.min(n.saturating_sub(1)) {
        let prod = lagged_product(resid, i) / (nf / 2.0);
        s0 += prod;
        s1 += i as f64 * prod;
    }
    if s0 == 0.0 {
        return 0;
    }
    let s_hat = s1 / s0;
    let gamma = 1.1447 * (s_hat * s_hat).powf(1.0 / 3.0);
    (gamma * nf.powf(1.0 / 3.0)).max(0.0) as usize
}

/// Piecewise-linear interpolation with end clamping; `xs` must be increasing.
fn interp_clamped(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    if x <= xs[0] {
        return ys[0];
    }
    let last = xs.len() - 1;
    if x >= xs[last] {
        return ys[last];
    }
    let i = xs.partition_point(|v| *v <= x);
    let (x0, x1) = (xs[i - 1], xs[i]);
    let (y0, y1) = (ys[i - 1], ys[i]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}
