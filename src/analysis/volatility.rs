//! Return volatility and a volatility-clustering (ARCH) check.

use serde::Serialize;

use crate::analysis::autocorrelation::ljung_box;
use crate::domain::PriceSeries;
use crate::error::AppError;
use crate::math::stats;

pub const TRADING_DAYS: f64 = 252.0;
const ARCH_LAGS: usize = 10;
const ARCH_SIGNIFICANCE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolatilityStats {
    /// Standard deviation of simple returns.
    pub mean_volatility: Option<f64>,
    pub annualized_volatility: Option<f64>,
    pub max_volatility: Option<f64>,
    pub min_volatility: Option<f64>,
    pub volatility_of_volatility: Option<f64>,
}

/// Ljung-Box on squared returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchTest {
    pub ljung_box_statistic: f64,
    pub p_value: f64,
    pub has_arch_effects: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolatilityAnalysis {
    pub window: usize,
    pub returns: Vec<f64>,
    pub log_returns: Vec<f64>,
    pub rolling_volatility: Vec<Option<f64>>,
    pub rolling_volatility_annualized: Vec<Option<f64>>,
    pub stats: VolatilityStats,
    pub arch_test: Option<ArchTest>,
}

pub fn volatility_analysis(series: &PriceSeries, window: usize) -> Result<VolatilityAnalysis, AppError> {
    if window == 0 {
        return Err(AppError::new(2, format!("Window must be positive, got {window}")));
    }
    if series.len() < 2 {
        return Err(AppError::new(3, "Need at least two prices to compute returns."));
    }

    let prices = series.prices();
    let returns = stats::pct_change(&prices);
    let log_returns = stats::log_returns(&prices);

    let annualize = TRADING_DAYS.sqrt();
    let rolling_volatility = stats::rolling_std(&returns, window);
    let rolling_volatility_annualized = rolling_volatility
        .iter()
        .map(|v| v.map(|v| v * annualize))
        .collect();

    let rolling_present = stats::present(&rolling_volatility);
    let return_std = stats::std_dev(&returns);
    let vol_stats = VolatilityStats {
        mean_volatility: return_std,
        annualized_volatility: return_std.map(|v| v * annualize),
        max_volatility: stats::max(&rolling_present),
        min_volatility: stats::min(&rolling_present),
        volatility_of_volatility: stats::std_dev(&rolling_present),
    };

    let squared: Vec<f64> = returns.iter().map(|r| r * r).collect();
    let arch_test = ljung_box(&squared, ARCH_LAGS).map(|lb| ArchTest {
        ljung_box_statistic: lb.statistic,
        p_value: lb.p_value,
        has_arch_effects: lb.p_value < ARCH_SIGNIFICANCE,
    });

    Ok(VolatilityAnalysis {
        window,
        returns,
        log_returns,
        rolling_volatility,
        rolling_volatility_annualized,
        stats: vol_stats,
        arch_test,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PricePoint;
    use chrono::{Duration, NaiveDate};

    fn series(prices: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        PriceSeries::new(
            prices
                .iter()
                .enumerate()
                .map(|(i, p)| PricePoint { date: start + Duration::days(i as i64), price: *p })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn returns_and_rolling_windows_line_up() {
        let s = series(&[100.0, 110.0, 99.0, 108.9, 98.01]);
        let v = volatility_analysis(&s, 2).unwrap();
        assert_eq!(v.returns.len(), 4);
        assert_eq!(v.log_returns.len(), 4);
        assert_eq!(v.rolling_volatility[0], None);
        assert!(v.rolling_volatility[1].is_some());

        let ratio = v.rolling_volatility_annualized[1].unwrap() / v.rolling_volatility[1].unwrap();
        assert!((ratio - TRADING_DAYS.sqrt()).abs() < 1e-9);
        assert!(v.stats.max_volatility >= v.stats.min_volatility);
        // Too few squared returns for a 10-lag test.
        assert!(v.arch_test.is_none());
    }

    #[test]
    fn clustered_volatility_is_detected() {
        // Calm and turbulent regimes alternate in blocks of 50 days.
        let mut prices = vec![100.0];
        for i in 0..600 {
            let amp = if (i / 50) % 2 == 0 { 0.001 } else { 0.05 };
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            let last = *prices.last().unwrap();
            prices.push(last * (1.0 + sign * amp));
        }
        let v = volatility_analysis(&series(&prices), 20).unwrap();
        let arch = v.arch_test.unwrap();
        assert!(arch.has_arch_effects);
        assert!(v.stats.volatility_of_volatility.unwrap() > 0.0);
    }

    #[test]
    fn invalid_input_is_rejected() {
        let s = series(&[1.0]);
        assert_eq!(volatility_analysis(&s, 5).unwrap_err().exit_code(), 3);
        let s = series(&[1.0, 2.0]);
        assert_eq!(volatility_analysis(&s, 0).unwrap_err().exit_code(), 2);
    }
}
