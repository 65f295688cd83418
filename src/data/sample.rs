//! Synthetic Brent-like sample data.
//!
//! Used when no price or event file can be loaded, and by `brent sample` to
//! write fixture files. Generation is fully determined by the seed.

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Event, PricePoint, PriceSeries};
use crate::error::AppError;

/// Starting price of the synthetic series.
const START_PRICE: f64 = 20.0;
/// Mean daily return of the random walk.
const DRIFT: f64 = 0.0005;
/// Daily return volatility.
const DAILY_VOL: f64 = 0.015;

pub const DEFAULT_SEED: u64 = 42;

fn sample_start() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2000, 1, 1)
}

fn sample_end() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2024, 12, 31)
}

/// Daily multiplicative random walk from 2000-01-01 to 2024-12-31.
pub fn generate_sample_prices(seed: u64) -> Result<PriceSeries, AppError> {
    let (Some(start), Some(end)) = (sample_start(), sample_end()) else {
        return Err(AppError::new(4, "Invalid sample date range."));
    };

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(DRIFT, DAILY_VOL)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let days = (end - start).num_days() as usize + 1;
    let mut points = Vec::with_capacity(days);
    let mut price = START_PRICE;
    for i in 0..days {
        if i > 0 {
            price *= 1.0 + normal.sample(&mut rng);
        }
        points.push(PricePoint {
            date: start + Duration::days(i as i64),
            price,
        });
    }

    PriceSeries::new(points)
}

/// Reference events used when no event file is available.
pub fn sample_events() -> Vec<Event> {
    let rows = [
        ((2008, 9, 15), "Economic", "Lehman Brothers collapse", "Demand Shock", "Very High"),
        ((2014, 11, 27), "OPEC", "OPEC decides not to cut production", "Supply Shock", "High"),
        ((2020, 3, 9), "Economic", "COVID-19 pandemic impact", "Demand Shock", "Very High"),
        ((2022, 2, 24), "Geopolitical", "Russia-Ukraine conflict", "Supply Shock", "Very High"),
    ];

    rows.into_iter()
        .filter_map(|((y, m, d), kind, description, impact, severity)| {
            Some(Event {
                event_date: NaiveDate::from_ymd_opt(y, m, d)?,
                event_type: Some(kind.to_string()),
                event_description: Some(description.to_string()),
                impact_type: Some(impact.to_string()),
                severity: Some(severity.to_string()),
                source_notes: None,
            })
        })
        .collect()
}
