//! Data-quality report and gap handling for raw price observations.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{MissingStrategy, PricePoint, PriceSeries, RawPrices};
use crate::error::AppError;
use crate::math::stats;

/// Summary of what the loader produced, before any cleaning.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub total_observations: usize,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub missing_values: usize,
    pub missing_pct: f64,
    pub duplicate_dates: usize,
    pub outliers: OutlierReport,
    pub skipped_rows: usize,
}

/// IQR fences and the number of prices outside them.
#[derive(Debug, Clone, Serialize)]
pub struct OutlierReport {
    pub count: usize,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
}

pub fn validate_data(raw: &RawPrices) -> Result<ValidationReport, AppError> {
    if raw.is_empty() {
        return Err(AppError::new(3, "Cannot validate an empty price dataset."));
    }

    let dates: Vec<NaiveDate> = raw.observations.iter().map(|o| o.date).collect();
    let min_date = dates.iter().copied().min().unwrap_or_default();
    let max_date = dates.iter().copied().max().unwrap_or_default();

    let mut seen = HashSet::with_capacity(dates.len());
    let duplicate_dates = dates.iter().filter(|d| !seen.insert(**d)).count();

    let missing_values = raw.missing_count();
    let missing_pct = missing_values as f64 / raw.len() as f64 * 100.0;

    let prices: Vec<f64> = raw.observations.iter().filter_map(|o| o.price).collect();
    let outliers = iqr_outliers(&prices);

    let report = ValidationReport {
        total_observations: raw.len(),
        min_date,
        max_date,
        missing_values,
        missing_pct,
        duplicate_dates,
        outliers,
        skipped_rows: raw.row_errors.len(),
    };

    info!(
        observations = report.total_observations,
        missing = report.missing_values,
        duplicates = report.duplicate_dates,
        outliers = report.outliers.count,
        "validated price data"
    );
    Ok(report)
}

fn iqr_outliers(prices: &[f64]) -> OutlierReport {
    let (Some(q1), Some(q3)) = (stats::quantile(prices, 0.25), stats::quantile(prices, 0.75)) else {
        return OutlierReport {
            count: 0,
            lower_bound: None,
            upper_bound: None,
        };
    };

    let iqr = q3 - q1;
    if iqr == 0.0 {
        warn!("IQR is zero; outlier detection skipped");
        return OutlierReport {
            count: 0,
            lower_bound: Some(q1),
            upper_bound: Some(q3),
        };
    }

    let lower = q1 - 1.5 * iqr;
    let upper = q3 + 1.5 * iqr;
    OutlierReport {
        count: prices.iter().filter(|p| **p < lower || **p > upper).count(),
        lower_bound: Some(lower),
        upper_bound: Some(upper),
    }
}

/// Fill or drop gaps and produce a clean, strictly increasing series.
///
/// Duplicate dates keep the last observation in file order.
pub fn preprocess(raw: &RawPrices, strategy: MissingStrategy) -> Result<PriceSeries, AppError> {
    let mut by_date: BTreeMap<NaiveDate, Option<f64>> = BTreeMap::new();
    for obs in &raw.observations {
        by_date.insert(obs.date, obs.price);
    }
    let rows: Vec<(NaiveDate, Option<f64>)> = by_date.into_iter().collect();

    let filled: Vec<(NaiveDate, Option<f64>)> = match strategy {
        MissingStrategy::Drop => rows,
        MissingStrategy::ForwardFill => forward_fill(rows),
        MissingStrategy::BackwardFill => {
            let mut rev = rows;
            rev.reverse();
            let mut out = forward_fill(rev);
            out.reverse();
            out
        }
        MissingStrategy::Interpolate => interpolate(rows),
    };

    let points: Vec<PricePoint> = filled
        .into_iter()
        .filter_map(|(date, price)| price.map(|price| PricePoint { date, price }))
        .collect();

    if points.is_empty() {
        return Err(AppError::new(3, "No price data left after preprocessing."));
    }
    let dropped = raw.len().saturating_sub(points.len());
    if dropped > 0 {
        info!(dropped, ?strategy, "dropped observations during preprocessing");
    }

    PriceSeries::new(points)
}

fn forward_fill(rows: Vec<(NaiveDate, Option<f64>)>) -> Vec<(NaiveDate, Option<f64>)> {
    let mut last = None;
    rows.into_iter()
        .map(|(date, price)| {
            if price.is_some() {
                last = price;
            }
            (date, price.or(last))
        })
        .collect()
}

fn interpolate(rows: Vec<(NaiveDate, Option<f64>)>) -> Vec<(NaiveDate, Option<f64>)> {
    let known: Vec<(NaiveDate, f64)> = rows
        .iter()
        .filter_map(|(d, p)| p.map(|p| (*d, p)))
        .collect();

    rows.into_iter()
        .map(|(date, price)| {
            if price.is_some() {
                return (date, price);
            }
            let idx = known.partition_point(|(d, _)| *d < date);
            if idx == 0 {
                return (date, None);
            }
            if idx == known.len() {
                return (date, Some(known[idx - 1].1));
            }
            let (d0, p0) = known[idx - 1];
            let (d1, p1) = known[idx];
            let span = (d1 - d0).num_days() as f64;
            let t = (date - d0).num_days() as f64 / span;
            (date, Some(p0 + (p1 - p0) * t))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawObservation;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 5, day).unwrap()
    }

    fn raw(prices: &[(u32, Option<f64>)]) -> RawPrices {
        RawPrices {
            observations: prices
                .iter()
                .map(|(day, price)| RawObservation { date: d(*day), price: *price })
                .collect(),
            row_errors: Vec::new(),
            rows_read: prices.len(),
        }
    }

    #[test]
    fn report_counts_missing_duplicates_and_outliers() {
        let mut obs: Vec<(u32, Option<f64>)> = (1..=9).map(|i| (i, Some(10.0 + i as f64 * 0.1))).collect();
        obs.push((10, Some(500.0)));
        obs.push((11, None));
        obs.push((11, Some(10.5)));
        let report = validate_data(&raw(&obs)).unwrap();
        assert_eq!(report.total_observations, 12);
        assert_eq!(report.missing_values, 1);
        assert_eq!(report.duplicate_dates, 1);
        assert_eq!(report.outliers.count, 1);
        assert_eq!(report.min_date, d(1));
        assert_eq!(report.max_date, d(11));
    }

    #[test]
    fn constant_prices_have_no_outliers() {
        let report = validate_data(&raw(&[(1, Some(5.0)), (2, Some(5.0)), (3, Some(5.0))])).unwrap();
        assert_eq!(report.outliers.count, 0);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(validate_data(&RawPrices::default()).is_err());
    }

    #[test]
    fn strategies_fill_or_drop_edges() {
        let r = raw(&[(1, None), (2, Some(10.0)), (3, None), (4, Some(14.0)), (6, None)]);

        let ff = preprocess(&r, MissingStrategy::ForwardFill).unwrap();
        assert_eq!(ff.prices(), vec![10.0, 10.0, 14.0, 14.0]);

        let bf = preprocess(&r, MissingStrategy::BackwardFill).unwrap();
        assert_eq!(bf.prices(), vec![10.0, 10.0, 14.0, 14.0]);
        assert_eq!(bf.first_date(), Some(d(1)));

        let li = preprocess(&r, MissingStrategy::Interpolate).unwrap();
        assert_eq!(li.prices(), vec![10.0, 12.0, 14.0, 14.0]);
        assert_eq!(li.first_date(), Some(d(2)));

        let dr = preprocess(&r, MissingStrategy::Drop).unwrap();
        assert_eq!(dr.len(), 2);
    }

    #[test]
    fn interpolate_carries_last_price_into_trailing_gap() {
        let r = raw(&[(1, Some(10.0)), (2, None), (3, Some(14.0)), (4, None)]);
        let s = preprocess(&r, MissingStrategy::Interpolate).unwrap();
        assert_eq!(s.dates(), vec![d(1), d(2), d(3), d(4)]);
        assert_eq!(s.prices(), vec![10.0, 12.0, 14.0, 14.0]);
    }

    #[test]
    fn duplicates_keep_last_row() {
        let r = raw(&[(2, Some(1.0)), (1, Some(0.5)), (2, Some(2.0))]);
        let s = preprocess(&r, MissingStrategy::Drop).unwrap();
        assert_eq!(s.dates(), vec![d(1), d(2)]);
        assert_eq!(s.prices(), vec![0.5, 2.0]);
    }

    #[test]
    fn all_missing_is_an_error() {
        let r = raw(&[(1, None), (2, None)]);
        assert!(preprocess(&r, MissingStrategy::ForwardFill).is_err());
    }
}
