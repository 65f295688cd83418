//! The `brent analyze` workflow:
//! load -> validate -> preprocess -> EDA -> event integration.
//!
//! Price loading and preprocessing must succeed. Event loading and every later
//! step are independent; a failing step is logged and recorded in
//! `AnalysisRun::failures` and the rest of the run continues.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::analysis::{
    Autocorrelation, PeriodStats, StationarityReport, TrendAnalysis, VolatilityAnalysis,
    autocorrelation_analysis, descriptive_statistics, test_stationarity, trend_analysis,
    volatility_analysis,
};
use crate::data::{ValidationReport, generate_sample_prices, preprocess, sample_events, validate_data};
use crate::domain::{
    AlignedEvent, DataSource, DateRange, Event, Frequency, MissingStrategy, PriceSeries, RawObservation,
    RawPrices,
};
use crate::error::AppError;
use crate::events::{ImpactRow, align_events_with_prices, calculate_event_impact_statistics};
use crate::io::ingest::{PriceLoadOptions, load_event_csv, load_price_csv, resample};

/// Lags for the ACF/PACF section, capped by the series length.
const MAX_ACF_LAGS: usize = 40;

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub prices: Option<PathBuf>,
    pub events: Option<PathBuf>,
    pub range: DateRange,
    pub frequency: Frequency,
    pub missing: MissingStrategy,
    pub window: usize,
    pub alpha: f64,
    pub event_window: i64,
    pub seed: u64,
}

/// A pipeline step that failed without aborting the run.
#[derive(Debug, Clone)]
pub struct StepFailure {
    pub step: &'static str,
    pub message: String,
}

/// All computed outputs of a single `brent analyze` run.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub price_source: DataSource,
    pub event_source: DataSource,
    pub validation: Option<ValidationReport>,
    pub series: PriceSeries,
    pub descriptive: Option<Vec<PeriodStats>>,
    pub trend: Option<TrendAnalysis>,
    pub stationarity: Option<StationarityReport>,
    pub volatility: Option<VolatilityAnalysis>,
    pub autocorrelation: Option<Autocorrelation>,
    pub events: Vec<Event>,
    pub aligned: Vec<AlignedEvent>,
    pub impact: Vec<ImpactRow>,
    pub failures: Vec<StepFailure>,
}

pub fn run_analysis(config: &AnalysisConfig) -> Result<AnalysisRun, AppError> {
    // 1) Load.
    let (raw, price_source) = load_raw_prices(config)?;
    let mut failures = Vec::new();
    // Without events the run continues; alignment and impact are skipped.
    let (events, event_source) = match &config.events {
        Some(path) => (
            step(&mut failures, "load events", load_event_csv(path)).unwrap_or_default(),
            DataSource::File(path.clone()),
        ),
        None => (sample_events(), DataSource::Synthetic),
    };
    info!(
        observations = raw.len(),
        events = events.len(),
        price_source = %price_source,
        event_source = %event_source,
        "inputs loaded"
    );

    // 2) Validate.
    let validation = step(&mut failures, "validate", validate_data(&raw));

    // 3) Preprocess. Nothing downstream works without a clean series.
    let series = preprocess(&raw, config.missing)?;

    // 4) EDA.
    let prices = series.prices();
    let descriptive = step(&mut failures, "descriptive", descriptive_statistics(&series, None));
    let trend = step(&mut failures, "trend", trend_analysis(&series, config.window));
    let stationarity = step(&mut failures, "stationarity", test_stationarity(&prices, config.alpha));
    let volatility = step(&mut failures, "volatility", volatility_analysis(&series, config.window));
    let lags = MAX_ACF_LAGS.min((prices.len() / 2).saturating_sub(1));
    let autocorrelation = step(&mut failures, "autocorrelation", autocorrelation_analysis(&prices, lags));

    // 5) Events.
    let (aligned, impact) = if events.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        let aligned = step(
            &mut failures,
            "event alignment",
            align_events_with_prices(&series, &events, config.event_window),
        )
        .unwrap_or_else(|| events.iter().cloned().map(AlignedEvent::unaligned).collect());
        let impact = calculate_event_impact_statistics(&aligned);
        (aligned, impact)
    };

    Ok(AnalysisRun {
        price_source,
        event_source,
        validation,
        series,
        descriptive,
        trend,
        stationarity,
        volatility,
        autocorrelation,
        events,
        aligned,
        impact,
        failures,
    })
}

/// The given file, or the synthetic series put through the same range and resampling.
fn load_raw_prices(config: &AnalysisConfig) -> Result<(RawPrices, DataSource), AppError> {
    if let Some(path) = &config.prices {
        let options = PriceLoadOptions {
            range: config.range,
            frequency: config.frequency,
        };
        return Ok((load_price_csv(path, &options)?, DataSource::File(path.clone())));
    }

    info!(seed = config.seed, "no price file given, using synthetic prices");
    let sample = generate_sample_prices(config.seed)?;
    let in_range: Vec<RawObservation> = sample
        .points()
        .iter()
        .filter(|p| config.range.contains(p.date))
        .map(|p| RawObservation {
            date: p.date,
            price: Some(p.price),
        })
        .collect();
    if in_range.is_empty() {
        return Err(AppError::new(3, "No data remaining after date filtering"));
    }

    let observations = resample(in_range, config.frequency);
    let raw = RawPrices {
        rows_read: observations.len(),
        observations,
        row_errors: Vec::new(),
    };
    Ok((raw, DataSource::Synthetic))
}

fn step<T>(failures: &mut Vec<StepFailure>, name: &'static str, result: Result<T, AppError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(step = name, error = %err, "analysis step failed");
            failures.push(StepFailure {
                step: name,
                message: err.message().to_string(),
            });
            None
        }
    }
}
