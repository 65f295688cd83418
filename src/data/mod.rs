//! Dataset assembly: price/event files with a synthetic fallback.
//!
//! The server loads everything once at startup. Each data part tries a list
//! of candidate paths in order; if none of them yields usable data, the
//! synthetic sample is used instead so the process always has something to
//! serve.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::{AlignedEvent, DataSource, Event, MissingStrategy, PriceSeries};
use crate::io::ingest::{PriceLoadOptions, load_event_csv, load_price_csv};

pub mod quality;
pub mod sample;

pub use quality::{OutlierReport, ValidationReport, preprocess, validate_data};
pub use sample::{DEFAULT_SEED, generate_sample_prices, sample_events};

pub const PRICE_FILE: &str = "brent_prices.csv";
pub const EVENT_FILE: &str = "oil_market_events.csv";
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Where to look for data and how to align it.
#[derive(Debug, Clone)]
pub struct DataOptions {
    pub data_dir: PathBuf,
    pub price_csv: Option<PathBuf>,
    pub events_csv: Option<PathBuf>,
    pub window_days: i64,
    pub seed: u64,
}

impl Default for DataOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/raw"),
            price_csv: None,
            events_csv: None,
            window_days: DEFAULT_WINDOW_DAYS,
            seed: DEFAULT_SEED,
        }
    }
}

impl DataOptions {
    pub fn price_candidates(&self) -> Vec<PathBuf> {
        candidates(self.price_csv.as_deref(), &self.data_dir, PRICE_FILE)
    }

    pub fn event_candidates(&self) -> Vec<PathBuf> {
        candidates(self.events_csv.as_deref(), &self.data_dir, EVENT_FILE)
    }
}

/// Explicit path if given, otherwise the data dir and the usual relative spots.
fn candidates(explicit: Option<&Path>, data_dir: &Path, file: &str) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }
    let mut out = vec![
        data_dir.join(file),
        Path::new("data/raw").join(file),
        Path::new("../data/raw").join(file),
    ];
    out.dedup();
    out
}

/// Everything the API serves. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub prices: Option<PriceSeries>,
    pub events: Option<Vec<Event>>,
    pub aligned: Vec<AlignedEvent>,
    pub price_source: Option<DataSource>,
    pub event_source: Option<DataSource>,
    pub window_days: i64,
}

impl Dataset {
    /// Assemble a dataset from already-loaded parts and align the events.
    pub fn from_parts(
        prices: PriceSeries,
        price_source: DataSource,
        events: Vec<Event>,
        event_source: DataSource,
        window_days: i64,
    ) -> Self {
        let aligned = match crate::events::align_events_with_prices(&prices, &events, window_days) {
            Ok(aligned) => aligned,
            Err(err) => {
                warn!(error = %err, "failed to align events with prices");
                events.iter().cloned().map(AlignedEvent::unaligned).collect()
            }
        };

        Self {
            prices: Some(prices),
            events: Some(events),
            aligned,
            price_source: Some(price_source),
            event_source: Some(event_source),
            window_days,
        }
    }
}

/// Load prices and events, falling back to synthetic data. Never fails.
pub fn load_dataset(options: &DataOptions) -> Dataset {
    let (prices, price_source) = load_prices_or_sample(options);
    let (events, event_source) = load_events_or_sample(options);

    info!(
        prices = prices.len(),
        price_source = %price_source,
        events = events.len(),
        event_source = %event_source,
        "data loaded"
    );

    Dataset::from_parts(prices, price_source, events, event_source, options.window_days)
}

fn load_prices_or_sample(options: &DataOptions) -> (PriceSeries, DataSource) {
    for path in options.price_candidates() {
        if !path.exists() {
            continue;
        }
        let loaded = load_price_csv(&path, &PriceLoadOptions::default())
            .and_then(|raw| preprocess(&raw, MissingStrategy::ForwardFill));
        match loaded {
            Ok(series) => {
                info!(path = %path.display(), "loaded price data");
                return (series, DataSource::File(path));
            }
            Err(err) => warn!(path = %path.display(), error = %err, "failed to load price data"),
        }
    }

    info!("no price data file found, creating sample data");
    match generate_sample_prices(options.seed) {
        Ok(series) => (series, DataSource::Synthetic),
        Err(err) => {
            // Only reachable with a broken distribution; keep a minimal series.
            warn!(error = %err, "sample generation failed");
            (PriceSeries::default(), DataSource::Synthetic)
        }
    }
}

fn load_events_or_sample(options: &DataOptions) -> (Vec<Event>, DataSource) {
    for path in options.event_candidates() {
        if !path.exists() {
            continue;
        }
        match load_event_csv(&path) {
            Ok(events) => {
                info!(path = %path.display(), "loaded event data");
                return (events, DataSource::File(path));
            }
            Err(err) => warn!(path = %path.display(), error = %err, "failed to load event data"),
        }
    }

    info!("no event data file found, creating sample events");
    (sample_events(), DataSource::Synthetic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_is_the_only_candidate() {
        let opts = DataOptions {
            price_csv: Some(PathBuf::from("/tmp/x.csv")),
            ..DataOptions::default()
        };
        assert_eq!(opts.price_candidates(), vec![PathBuf::from("/tmp/x.csv")]);
    }

    #[test]
    fn default_candidates_are_deduplicated() {
        let opts = DataOptions::default();
        let c = opts.event_candidates();
        assert_eq!(c[0], PathBuf::from("data/raw").join(EVENT_FILE));
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn missing_files_fall_back_to_sample_data() {
        let dir = tempfile::tempdir().unwrap();
        let opts = DataOptions {
            price_csv: Some(dir.path().join("nope.csv")),
            events_csv: Some(dir.path().join("nope_events.csv")),
            ..DataOptions::default()
        };
        let ds = load_dataset(&opts);
        assert_eq!(ds.price_source, Some(DataSource::Synthetic));
        assert_eq!(ds.event_source, Some(DataSource::Synthetic));
        assert!(!ds.prices.unwrap().is_empty());
        assert_eq!(ds.events.unwrap().len(), 4);
        assert_eq!(ds.aligned.len(), 4);
        assert!(ds.aligned.iter().all(|a| a.impact.nearest_price.is_some()));
    }

    #[test]
    fn unreadable_file_falls_back_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "Date,Price\nnot-a-date,1\n").unwrap();
        let opts = DataOptions {
            price_csv: Some(path),
            ..DataOptions::default()
        };
        let (series, source) = load_prices_or_sample(&opts);
        assert_eq!(source, DataSource::Synthetic);
        assert!(!series.is_empty());
    }
}
