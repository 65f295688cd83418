//! CSV ingest for price and event files.
//!
//! This module turns loosely formatted exports into typed observations:
//!
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness, no network fallback)
//! - **Separation of concerns**: gap filling and statistics live elsewhere
//!
//! Price files look like `Date,Price`; event files like
//! `event_date,event_type,event_description,impact_type,severity,source_notes`.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate};
use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::{DateRange, Event, Frequency, RawObservation, RawPrices, RowError};
use crate::error::AppError;

/// Options applied while loading a price file.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceLoadOptions {
    pub range: DateRange,
    pub frequency: Frequency,
}

/// Load raw price observations from a `Date,Price` CSV.
///
/// The date column is `date` if present, otherwise the first column; the
/// price column is `price` if present, otherwise the second column.
pub fn load_price_csv(path: &Path, options: &PriceLoadOptions) -> Result<RawPrices, AppError> {
    if !path.exists() {
        return Err(AppError::new(2, format!("File not found: {}", path.display())));
    }
    info!(path = %path.display(), "loading price data");

    let (headers, mut reader) = open_csv(path)?;
    if headers.len() < 2 {
        return Err(AppError::new(
            2,
            format!(
                "Price file '{}' needs a date and a price column.",
                path.display()
            ),
        ));
    }

    let header_map = build_header_map(&headers);
    let date_idx = header_map.get("date").copied().unwrap_or(0);
    let price_idx = header_map
        .get("price")
        .copied()
        .unwrap_or(if date_idx == 1 { 0 } else { 1 });

    let mut observations = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header and CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let date = match record.get(date_idx).map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => match parse_date(raw) {
                Ok(d) => d,
                Err(e) => {
                    row_errors.push(RowError { line, message: e });
                    continue;
                }
            },
            None => {
                row_errors.push(RowError {
                    line,
                    message: "Missing date value.".to_string(),
                });
                continue;
            }
        };

        let price = parse_opt_f64(record.get(price_idx).map(str::trim));
        observations.push(RawObservation { date, price });
    }

    if observations.is_empty() {
        return Err(AppError::new(
            3,
            format!("Loaded price file is empty: {}", path.display()),
        ));
    }

    if !row_errors.is_empty() {
        warn!(
            path = %path.display(),
            skipped = row_errors.len(),
            "skipped price rows with unreadable dates"
        );
    }

    let observations: Vec<RawObservation> = observations
        .into_iter()
        .filter(|o| options.range.contains(o.date))
        .collect();
    if observations.is_empty() {
        return Err(AppError::new(3, "No data remaining after date filtering"));
    }

    let observations = resample(observations, options.frequency);
    info!(observations = observations.len(), "loaded price observations");

    Ok(RawPrices {
        observations,
        row_errors,
        rows_read,
    })
}

/// Load market events. Only `event_date` is required.
pub fn load_event_csv(path: &Path) -> Result<Vec<Event>, AppError> {
    if !path.exists() {
        return Err(AppError::new(
            2,
            format!("Event data file not found: {}", path.display()),
        ));
    }
    info!(path = %path.display(), "loading event data");

    let (headers, mut reader) = open_csv(path)?;
    let header_map = build_header_map(&headers);
    if !header_map.contains_key("event_date") {
        return Err(AppError::new(2, "Missing required columns: event_date"));
    }

    let mut events = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(line, error = %e, "skipping unreadable event row");
                continue;
            }
        };

        let event_date = match get_required(&record, &header_map, "event_date").and_then(parse_date) {
            Ok(d) => d,
            Err(e) => {
                warn!(line, error = %e, "skipping event row");
                continue;
            }
        };

        events.push(Event {
            event_date,
            event_type: get_optional(&record, &header_map, "event_type").map(str::to_string),
            event_description: get_optional(&record, &header_map, "event_description")
                .map(str::to_string),
            impact_type: get_optional(&record, &header_map, "impact_type").map(str::to_string),
            severity: get_optional(&record, &header_map, "severity").map(str::to_string),
            source_notes: get_optional(&record, &header_map, "source_notes").map(str::to_string),
        });
    }

    if events.is_empty() {
        return Err(AppError::new(
            3,
            format!("Event data file is empty: {}", path.display()),
        ));
    }

    info!(events = events.len(), "loaded events");
    Ok(events)
}

/// Keep the last non-missing observation per week (ending Sunday) or month.
///
/// Buckets are labelled with their period-end date. Buckets without any
/// observation are not emitted.
pub fn resample(observations: Vec<RawObservation>, frequency: Frequency) -> Vec<RawObservation> {
    if frequency == Frequency::Daily {
        return observations;
    }

    let mut sorted = observations;
    sorted.sort_by_key(|o| o.date);

    let mut buckets: BTreeMap<NaiveDate, Option<f64>> = BTreeMap::new();
    for obs in sorted {
        let label = period_end(obs.date, frequency);
        let slot = buckets.entry(label).or_insert(None);
        if obs.price.is_some() {
            *slot = obs.price;
        }
    }

    buckets
        .into_iter()
        .map(|(date, price)| RawObservation { date, price })
        .collect()
}

fn period_end(date: NaiveDate, frequency: Frequency) -> NaiveDate {
    match frequency {
        Frequency::Daily => date,
        Frequency::Weekly => {
            let to_sunday = 6 - date.weekday().num_days_from_monday() as i64;
            date + Duration::days(to_sunday)
        }
        Frequency::Monthly => {
            let (y, m) = if date.month() == 12 {
                (date.year() + 1, 1)
            } else {
                (date.year(), date.month() + 1)
            };
            NaiveDate::from_ymd_opt(y, m, 1)
                .and_then(|first| first.pred_opt())
                .unwrap_or(date)
        }
    }
}

fn open_csv(path: &Path) -> Result<(StringRecord, csv::Reader<File>), AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AppError::new(
            3,
            format!("File is empty: {}", path.display()),
        ));
    }

    Ok((headers, reader))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for duplicated headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Layouts tried in order. Slash dates are month-first, as in US price exports.
const DATE_FORMATS: [&str; 7] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%b-%y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Parse a date in one of the accepted layouts.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    if let Some(d) = try_formats(s) {
        return Ok(d);
    }
    // Tolerate a time component such as "2020-01-02 00:00:00" or "2020-01-02T00:00:00".
    if let Some(day) = s.split(['T', ' ']).next().filter(|day| *day != s) {
        if let Some(d) = try_formats(day) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, MM/DD/YYYY, DD-Mon-YY, Mon DD, YYYY."
    ))
}

fn try_formats(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let s = s?;
    let v = s.replace(',', "").parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
