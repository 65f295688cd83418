//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the analysis code
//! - returned directly from the HTTP API
//! - exported to CSV

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Sampling frequency applied after loading a price file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum Frequency {
    /// Keep every observation.
    #[default]
    #[serde(rename = "D")]
    #[value(name = "D", alias = "d")]
    Daily,
    /// Last observation of each week (weeks end on Sunday).
    #[serde(rename = "W")]
    #[value(name = "W", alias = "w")]
    Weekly,
    /// Last observation of each calendar month.
    #[serde(rename = "M")]
    #[value(name = "M", alias = "m")]
    Monthly,
}

/// How gaps (missing prices) are handled when building a `PriceSeries`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MissingStrategy {
    /// Carry the previous price forward. A leading gap is dropped.
    #[default]
    ForwardFill,
    /// Carry the next price backward. A trailing gap is dropped.
    BackwardFill,
    /// Linear interpolation in calendar days between the neighbours.
    /// A leading gap is dropped; a trailing gap takes the last known price.
    Interpolate,
    /// Drop every missing observation.
    Drop,
}

/// A single cleaned observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// A raw observation as read from the CSV (price may be missing).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawObservation {
    pub date: NaiveDate,
    pub price: Option<f64>,
}

/// A row-level problem encountered while reading a CSV.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Price observations in file order, before preprocessing.
#[derive(Debug, Clone, Default)]
pub struct RawPrices {
    pub observations: Vec<RawObservation>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl RawPrices {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.observations.iter().filter(|o| o.price.is_none()).count()
    }
}

/// Price series keyed by trading date.
///
/// Invariant: dates are strictly increasing and every price is finite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, sorting by date. Duplicate dates and non-finite prices are rejected.
    pub fn new(mut points: Vec<PricePoint>) -> Result<Self, AppError> {
        if let Some(bad) = points.iter().find(|p| !p.price.is_finite()) {
            return Err(AppError::new(
                2,
                format!("Non-finite price on {}.", bad.date),
            ));
        }
        points.sort_by_key(|p| p.date);
        if let Some(w) = points.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(AppError::new(
                2,
                format!("Duplicate price date {}.", w[0].date),
            ));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Observations with `start <= date <= end`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> &[PricePoint] {
        if start > end {
            return &[];
        }
        let lo = self.points.partition_point(|p| p.date < start);
        let hi = self.points.partition_point(|p| p.date <= end);
        &self.points[lo..hi]
    }

    /// Sub-series restricted to a (possibly open-ended) date range.
    pub fn slice(&self, range: &DateRange) -> PriceSeries {
        let lo = match range.start {
            Some(start) => self.points.partition_point(|p| p.date < start),
            None => 0,
        };
        let hi = match range.end {
            Some(end) => self.points.partition_point(|p| p.date <= end),
            None => self.points.len(),
        };
        let points = if lo < hi { self.points[lo..hi].to_vec() } else { Vec::new() };
        PriceSeries { points }
    }
}

/// A curated market event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_date: NaiveDate,
    pub event_type: Option<String>,
    pub event_description: Option<String>,
    pub impact_type: Option<String>,
    pub severity: Option<String>,
    pub source_notes: Option<String>,
}

/// Price movement around an event. Every metric is optional because the
/// window may hold no (or one-sided) price data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventImpact {
    pub nearest_date: Option<NaiveDate>,
    pub nearest_price: Option<f64>,
    pub price_before: Option<f64>,
    pub price_after: Option<f64>,
    pub price_change: Option<f64>,
    pub price_change_pct: Option<f64>,
    pub max_price_window: Option<f64>,
    pub min_price_window: Option<f64>,
    pub volatility_window: Option<f64>,
    /// Number of price observations inside the event window.
    pub observations: usize,
}

/// An event joined with the price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedEvent {
    #[serde(flatten)]
    pub event: Event,
    #[serde(flatten)]
    pub impact: EventImpact,
}

impl AlignedEvent {
    pub fn unaligned(event: Event) -> Self {
        Self {
            event,
            impact: EventImpact::default(),
        }
    }
}

impl AsRef<Event> for Event {
    fn as_ref(&self) -> &Event {
        self
    }
}

impl AsRef<Event> for AlignedEvent {
    fn as_ref(&self) -> &Event {
        &self.event
    }
}

/// Inclusive, possibly open-ended date range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }
}

/// Selection applied to a request: date range plus categorical event filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub range: DateRange,
    pub event_type: Option<String>,
    pub impact_type: Option<String>,
    pub severity: Option<String>,
}

/// A named sub-period for descriptive statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Where a dataset part came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Synthetic,
}

impl DataSource {
    pub fn label(&self) -> &'static str {
        match self {
            DataSource::File(_) => "file",
            DataSource::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Synthetic => write!(f, "synthetic sample"),
        }
    }
}
