//! Moving averages, linear trend and classical additive decomposition.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use tracing::{info, warn};

use crate::domain::PriceSeries;
use crate::error::AppError;
use crate::math::stats;

/// Decomposition needs more than two years of daily data.
const DECOMPOSITION_MIN_LEN: usize = 730;
const MAX_SEASONAL_PERIOD: usize = 365;

/// Least squares line over the observation index `0..n`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Two-sided p-value for `slope == 0`; `None` with fewer than 3 points.
    pub p_value: Option<f64>,
    pub std_err: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decomposition {
    pub period: usize,
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendAnalysis {
    pub window: usize,
    pub moving_average: Vec<Option<f64>>,
    pub moving_average_long: Vec<Option<f64>>,
    pub linear_trend: LinearTrend,
    pub decomposition: Option<Decomposition>,
}

pub fn trend_analysis(series: &PriceSeries, window: usize) -> Result<TrendAnalysis, AppError> {
    if window == 0 {
        return Err(AppError::new(2, format!("Window must be positive, got {window}")));
    }
    if window > series.len() {
        return Err(AppError::new(
            2,
            format!("Window ({window}) exceeds data length ({})", series.len()),
        ));
    }

    let prices = series.prices();
    let linear_trend = linear_regression(&prices)
        .ok_or_else(|| AppError::new(3, "Insufficient data for linear trend."))?;

    let n = prices.len();
    let decomposition = if n > DECOMPOSITION_MIN_LEN && n > 2 * window {
        let period = MAX_SEASONAL_PERIOD.min(n / 2);
        match seasonal_decompose(&prices, period) {
            Ok(d) => Some(d),
            Err(err) => {
                warn!(error = %err, "decomposition failed");
                None
            }
        }
    } else {
        info!(observations = n, "series too short for decomposition");
        None
    };

    Ok(TrendAnalysis {
        window,
        moving_average: stats::rolling_mean(&prices, window),
        moving_average_long: stats::rolling_mean(&prices, window * 2),
        linear_trend,
        decomposition,
    })
}

/// Simple regression of `y` on `0..n`.
pub fn linear_regression(y: &[f64]) -> Option<LinearTrend> {
    let n = y.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let x_mean = (nf - 1.0) / 2.0;
    let y_mean = stats::mean(y)?;

    let mut ssxm = 0.0;
    let mut ssym = 0.0;
    let mut ssxym = 0.0;
    for (i, v) in y.iter().enumerate() {
        let dx = i as f64 - x_mean;
        let dy = v - y_mean;
        ssxm += dx * dx;
        ssym += dy * dy;
        ssxym += dx * dy;
    }

    let slope = ssxym / ssxm;
    let intercept = y_mean - slope * x_mean;
    let r = if ssym == 0.0 {
        0.0
    } else {
        (ssxym / (ssxm * ssym).sqrt()).clamp(-1.0, 1.0)
    };

    let (p_value, std_err) = if n > 2 {
        let df = nf - 2.0;
        let std_err = ((1.0 - r * r) * ssym / ssxm / df).max(0.0).sqrt();
        let t = r * (df / ((1.0 - r) * (1.0 + r))).sqrt();
        let p = StudentsT::new(0.0, 1.0, df)
            .ok()
            .map(|dist| if t.is_finite() { 2.0 * dist.sf(t.abs()) } else { 0.0 });
        (p, Some(std_err))
    } else {
        (None, None)
    };

    Some(LinearTrend {
        slope,
        intercept,
        r_squared: r * r,
        p_value,
        std_err,
    })
}

/// Classical additive decomposition with a centred moving-average trend.
pub fn seasonal_decompose(values: &[f64], period: usize) -> Result<Decomposition, AppError> {
    let n = values.len();
    if period < 2 {
        return Err(AppError::new(2, "Seasonal period must be at least 2."));
    }
    if n < 2 * period {
        return Err(AppError::new(
            3,
            format!("Decomposition needs {} observations, got {n}", 2 * period),
        ));
    }

    // Even periods use the 2 x m centred filter.
    let filter: Vec<f64> = if period % 2 == 0 {
        let mut f = vec![1.0 / period as f64; period + 1];
        f[0] = 0.5 / period as f64;
        f[period] = 0.5 / period as f64;
        f
    } else {
        vec![1.0 / period as f64; period]
    };
    let half = filter.len() / 2;

    let trend: Vec<Option<f64>> = (0..n)
        .map(|t| {
            if t < half || t + half >= n {
                return None;
            }
            Some(
                filter
                    .iter()
                    .enumerate()
                    .map(|(j, w)| w * values[t + j - half])
                    .sum(),
            )
        })
        .collect();

    let detrended: Vec<Option<f64>> = values
        .iter()
        .zip(&trend)
        .map(|(v, t)| t.map(|t| v - t))
        .collect();

    let mut averages: Vec<f64> = (0..period)
        .map(|i| {
            let slot: Vec<f64> = detrended.iter().skip(i).step_by(period).flatten().copied().collect();
            stats::mean(&slot).unwrap_or(0.0)
        })
        .collect();
    let centre = stats::mean(&averages).unwrap_or(0.0);
    for a in &mut averages {
        *a -= centre;
    }

    let seasonal: Vec<f64> = (0..n).map(|t| averages[t % period]).collect();
    let residual = detrended
        .iter()
        .zip(&seasonal)
        .map(|(d, s)| d.map(|d| d - s))
        .collect();

    Ok(Decomposition {
        period,
        trend,
        seasonal,
        residual,
    })
}
