//! Descriptive statistics per period and the summary served by `/api/statistics`.

use serde::Serialize;

use crate::domain::{Period, PriceSeries};
use crate::error::AppError;
use crate::math::stats;

/// Moments and range of the price over one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodStats {
    pub period: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub var: Option<f64>,
    pub skew: Option<f64>,
    pub kurtosis: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Price summary for a (filtered) series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceStatistics {
    pub mean: f64,
    pub median: f64,
    /// `None` (JSON `null`) for a single observation.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// Statistics for each period, or one `full_period` row when no periods are given.
///
/// A period without observations yields `count = 0` and empty metrics.
pub fn descriptive_statistics(
    series: &PriceSeries,
    periods: Option<&[Period]>,
) -> Result<Vec<PeriodStats>, AppError> {
    if series.is_empty() {
        return Err(AppError::new(3, "Input series is empty."));
    }

    let rows = match periods {
        Some(periods) if !periods.is_empty() => periods
            .iter()
            .map(|p| {
                let prices: Vec<f64> = series.between(p.start, p.end).iter().map(|pt| pt.price).collect();
                period_stats(&p.name, &prices)
            })
            .collect(),
        _ => vec![period_stats("full_period", &series.prices())],
    };
    Ok(rows)
}

fn period_stats(name: &str, prices: &[f64]) -> PeriodStats {
    PeriodStats {
        period: name.to_string(),
        count: prices.len(),
        mean: stats::mean(prices),
        std: stats::std_dev(prices),
        var: stats::variance(prices),
        skew: stats::skewness(prices),
        kurtosis: stats::excess_kurtosis(prices),
        min: stats::min(prices),
        max: stats::max(prices),
    }
}

pub fn price_statistics(series: &PriceSeries) -> Result<PriceStatistics, AppError> {
    let prices = series.prices();
    let (Some(mean), Some(median), Some(min), Some(max)) = (
        stats::mean(&prices),
        stats::median(&prices),
        stats::min(&prices),
        stats::max(&prices),
    ) else {
        return Err(AppError::new(3, "Cannot compute statistics of an empty series."));
    };

    Ok(PriceStatistics {
        mean,
        median,
        std: stats::std_dev(&prices),
        min,
        max,
        count: prices.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PricePoint;
    use chrono::NaiveDate;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, m, day).unwrap()
    }

    fn series() -> PriceSeries {
        let prices = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        PriceSeries::new(
            prices
                .iter()
                .enumerate()
                .map(|(i, p)| PricePoint { date: d(1, i as u32 + 1), price: *p })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn full_period_by_default() {
        let rows = descriptive_statistics(&series(), None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].period, "full_period");
        assert_eq!(rows[0].count, 8);
        assert_eq!(rows[0].mean, Some(5.0));
        assert!((rows[0].var.unwrap() - 32.0 / 7.0).abs() < 1e-12);
        assert!(rows[0].skew.unwrap() > 0.0);
    }

    #[test]
    fn periods_are_inclusive_and_may_be_empty() {
        let periods = vec![
            Period { name: "early".into(), start: d(1, 1), end: d(1, 4) },
            Period { name: "later".into(), start: d(6, 1), end: d(6, 30) },
        ];
        let rows = descriptive_statistics(&series(), Some(&periods)).unwrap();
        assert_eq!(rows[0].count, 4);
        assert_eq!(rows[0].max, Some(4.0));
        assert_eq!(rows[1].count, 0);
        assert_eq!(rows[1].mean, None);
    }

    #[test]
    fn price_statistics_match_series() {
        let s = price_statistics(&series()).unwrap();
        assert_eq!(s.count, 8);
        assert_eq!(s.median, 4.5);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 9.0);

        let single = PriceSeries::new(vec![PricePoint { date: d(1, 1), price: 3.0 }]).unwrap();
        assert_eq!(price_statistics(&single).unwrap().std, None);
        assert!(price_statistics(&PriceSeries::default()).is_err());
    }
}
