//! CSV exports.
//!
//! Price and event exports use the same layout the loader reads, so a
//! written file can be fed straight back into `load_price_csv` /
//! `load_event_csv`.

use std::fs::File;
use std::path::Path;

use csv::Writer;
use tracing::info;

use crate::domain::{AlignedEvent, Event, PriceSeries};
use crate::error::AppError;

/// Write a `Date,Price` CSV.
pub fn write_price_csv(path: &Path, series: &PriceSeries) -> Result<(), AppError> {
    let mut wtr = create_writer(path)?;
    write_row(&mut wtr, ["Date", "Price"])?;
    for p in series.points() {
        write_row(&mut wtr, [p.date.to_string(), p.price.to_string()])?;
    }
    finish(wtr, path, series.len())
}

/// Write an event CSV with the loader's column names.
pub fn write_event_csv(path: &Path, events: &[Event]) -> Result<(), AppError> {
    let mut wtr = create_writer(path)?;
    write_row(
        &mut wtr,
        [
            "event_date",
            "event_type",
            "event_description",
            "impact_type",
            "severity",
            "source_notes",
        ],
    )?;
    for e in events {
        write_row(&mut wtr, event_fields(e))?;
    }
    finish(wtr, path, events.len())
}

/// Write events together with their price-window metrics.
pub fn write_aligned_events_csv(path: &Path, aligned: &[AlignedEvent]) -> Result<(), AppError> {
    let mut wtr = create_writer(path)?;
    write_row(
        &mut wtr,
        [
            "event_date",
            "event_type",
            "event_description",
            "impact_type",
            "severity",
            "source_notes",
            "nearest_date",
            "nearest_price",
            "price_before",
            "price_after",
            "price_change",
            "price_change_pct",
            "max_price_window",
            "min_price_window",
            "volatility_window",
            "observations",
        ],
    )?;

    for a in aligned {
        let i = &a.impact;
        let mut row: Vec<String> = event_fields(&a.event).to_vec();
        row.push(i.nearest_date.map(|d| d.to_string()).unwrap_or_default());
        for v in [
            i.nearest_price,
            i.price_before,
            i.price_after,
            i.price_change,
            i.price_change_pct,
            i.max_price_window,
            i.min_price_window,
            i.volatility_window,
        ] {
            row.push(fmt_opt(v));
        }
        row.push(i.observations.to_string());
        write_row(&mut wtr, row)?;
    }
    finish(wtr, path, aligned.len())
}

fn event_fields(e: &Event) -> [String; 6] {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    [
        e.event_date.to_string(),
        opt(&e.event_type),
        opt(&e.event_description),
        opt(&e.impact_type),
        opt(&e.severity),
        opt(&e.source_notes),
    ]
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.6}")).unwrap_or_default()
}

fn create_writer(path: &Path) -> Result<Writer<File>, AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::new(2, format!("Failed to create directory '{}': {e}", parent.display()))
        })?;
    }
    Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))
}

fn write_row<I, T>(wtr: &mut Writer<File>, row: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    wtr.write_record(row)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))
}

fn finish(mut wtr: Writer<File>, path: &Path, rows: usize) -> Result<(), AppError> {
    wtr.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    info!(path = %path.display(), rows, "wrote CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventImpact, PricePoint};
    use chrono::NaiveDate;

    #[test]
    fn aligned_export_quotes_commas_and_blanks_missing_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("aligned.csv");
        let event = Event {
            event_date: NaiveDate::from_ymd_opt(2020, 3, 9).unwrap(),
            event_type: Some("Pandemic".into()),
            event_description: Some("Demand shock, lockdowns".into()),
            impact_type: None,
            severity: Some("Critical".into()),
            source_notes: None,
        };
        let aligned = vec![AlignedEvent {
            event,
            impact: EventImpact {
                price_change_pct: Some(-12.5),
                observations: 3,
                ..EventImpact::default()
            },
        }];
        write_aligned_events_csv(&path, &aligned).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("event_date,event_type"));
        let row = lines.next().unwrap();
        assert!(row.contains("\"Demand shock, lockdowns\""));
        assert!(row.contains("-12.500000"));
        assert!(row.ends_with(",3"));
    }

    #[test]
    fn price_export_has_loader_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        let series = PriceSeries::new(vec![PricePoint {
            date: NaiveDate::from_ymd_opt(2021, 1, 4).unwrap(),
            price: 51.09,
        }])
        .unwrap();
        write_price_csv(&path, &series).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Date,Price\n2021-01-04,51.09\n");
    }
}
