//! Sample statistics over plain `f64` slices.
//!
//! Conventions follow the usual data-frame defaults so numbers line up with
//! notebook output:
//! - variance / std use the sample (n - 1) denominator
//! - quantiles interpolate linearly between order statistics
//! - skewness is the adjusted Fisher-Pearson coefficient
//! - kurtosis is bias-corrected excess kurtosis
//!
//! Degenerate inputs (too few observations) yield `None` instead of NaN.

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn variance(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss = values.iter().map(|v| (v - m).powi(2)).sum::<f64>();
    Some(ss / (n - 1) as f64)
}

pub fn std_dev(values: &[f64]) -> Option<f64> {
    variance(values).map(f64::sqrt)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Quantile `q ∈ [0, 1]` with linear interpolation between order statistics.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn skewness(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let m = mean(values)?;
    let nf = n as f64;
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / nf;
    let m3 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / nf;
    if m2 <= f64::EPSILON {
        return Some(0.0);
    }
    let g1 = m3 / m2.powf(1.5);
    Some(g1 * (nf * (nf - 1.0)).sqrt() / (nf - 2.0))
}

pub fn excess_kurtosis(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 4 {
        return None;
    }
    let m = mean(values)?;
    let nf = n as f64;
    let s2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>();
    let s4 = values.iter().map(|v| (v - m).powi(4)).sum::<f64>();
    if s2 <= f64::EPSILON {
        return Some(0.0);
    }
    let a = (nf + 1.0) * nf * (nf - 1.0) * s4 / ((nf - 2.0) * (nf - 3.0) * s2 * s2);
    let b = 3.0 * (nf - 1.0).powi(2) / ((nf - 2.0) * (nf - 3.0));
    Some(a - b)
}

/// Trailing rolling mean. The first `window - 1` entries are `None`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, mean)
}

/// Trailing rolling sample standard deviation. The first `window - 1` entries are `None`.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, std_dev)
}

fn rolling(values: &[f64], window: usize, f: fn(&[f64]) -> Option<f64>) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                f(&values[i + 1 - window..=i])
            }
        })
        .collect()
}

/// Simple returns `p_t / p_{t-1} - 1` (length `n - 1`).
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

/// Log returns `ln(p_t / p_{t-1})`, skipping non-positive prices.
pub fn log_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter(|w| w[0] > 0.0 && w[1] > 0.0)
        .map(|w| (w[1] / w[0]).ln())
        .collect()
}

/// Keep only the present values of an optional series.
pub fn present(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}
