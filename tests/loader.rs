use std::fs;

use chrono::NaiveDate;

use brent_breaks::data::{DataOptions, generate_sample_prices, load_dataset, preprocess, sample_events};
use brent_breaks::domain::{DataSource, DateRange, Frequency, MissingStrategy};
use brent_breaks::events::filter_by_date;
use brent_breaks::io::export::{write_event_csv, write_price_csv};
use brent_breaks::io::ingest::{PriceLoadOptions, load_event_csv, load_price_csv};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn price_csv_round_trip_keeps_every_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prices.csv");
    let series = generate_sample_prices(3).unwrap();
    write_price_csv(&path, &series).unwrap();

    let raw = load_price_csv(&path, &PriceLoadOptions::default()).unwrap();
    assert_eq!(raw.len(), series.len());
    assert!(raw.row_errors.is_empty());

    let loaded = preprocess(&raw, MissingStrategy::ForwardFill).unwrap();
    assert_eq!(loaded.len(), series.len());
    assert_eq!(loaded.first_date(), series.first_date());
    assert_eq!(loaded.prices(), series.prices());

    // Re-filtering after load matches filtering at load time.
    let range = DateRange::new(Some(date(2010, 1, 1)), Some(date(2010, 12, 31)));
    let at_load = load_price_csv(
        &path,
        &PriceLoadOptions {
            range,
            frequency: Frequency::Daily,
        },
    )
    .unwrap();
    assert_eq!(at_load.len(), loaded.slice(&range).len());
    assert_eq!(at_load.len(), 365);
}

#[test]
fn event_csv_round_trip_keeps_every_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.csv");
    let events = sample_events();
    write_event_csv(&path, &events).unwrap();

    let loaded = load_event_csv(&path).unwrap();
    assert_eq!(loaded, events);

    let range = DateRange::new(Some(date(2010, 1, 1)), None);
    assert_eq!(
        filter_by_date(&loaded, &range).len(),
        filter_by_date(&events, &range).len()
    );
}

#[test]
fn messy_price_file_reports_skipped_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prices.csv");
    fs::write(
        &path,
        "Date,Price\n2020-01-01,60.5\n2020-01-02,\nnot-a-date,61\n2020-01-03,\"1,062.0\"\n",
    )
    .unwrap();

    let raw = load_price_csv(&path, &PriceLoadOptions::default()).unwrap();
    assert_eq!(raw.len(), 3);
    assert_eq!(raw.missing_count(), 1);
    assert_eq!(raw.row_errors.len(), 1);

    let series = preprocess(&raw, MissingStrategy::ForwardFill).unwrap();
    assert_eq!(series.prices(), vec![60.5, 60.5, 1062.0]);
}

#[test]
fn brent_export_date_layouts_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let prices = dir.path().join("brent_prices.csv");
    fs::write(
        &prices,
        "Date,Price\n20-May-87,18.63\n21-May-87,18.45\n01/02/2020,66.25\n\"Apr 22, 2020\",13.77\n",
    )
    .unwrap();

    let raw = load_price_csv(&prices, &PriceLoadOptions::default()).unwrap();
    assert!(raw.row_errors.is_empty());
    let series = preprocess(&raw, MissingStrategy::Drop).unwrap();
    assert_eq!(
        series.dates(),
        vec![date(1987, 5, 20), date(1987, 5, 21), date(2020, 1, 2), date(2020, 4, 22)]
    );
    assert_eq!(series.prices(), vec![18.63, 18.45, 66.25, 13.77]);

    let options = DataOptions {
        price_csv: Some(prices.clone()),
        events_csv: Some(dir.path().join("absent_events.csv")),
        ..DataOptions::default()
    };
    let dataset = load_dataset(&options);
    assert_eq!(dataset.price_source, Some(DataSource::File(prices)));
    assert_eq!(dataset.prices.map(|p| p.len()), Some(4));
}

#[test]
fn missing_files_fall_back_to_synthetic_data() {
    let dir = tempfile::tempdir().unwrap();
    let options = DataOptions {
        data_dir: dir.path().to_path_buf(),
        price_csv: Some(dir.path().join("absent_prices.csv")),
        events_csv: Some(dir.path().join("absent_events.csv")),
        ..DataOptions::default()
    };

    let dataset = load_dataset(&options);
    assert_eq!(dataset.price_source, Some(DataSource::Synthetic));
    assert_eq!(dataset.event_source, Some(DataSource::Synthetic));
    assert!(dataset.prices.as_ref().is_some_and(|p| !p.is_empty()));
    assert!(dataset.events.as_ref().is_some_and(|e| !e.is_empty()));
    assert_eq!(dataset.aligned.len(), sample_events().len());
}

#[test]
fn unreadable_file_falls_back_too() {
    let dir = tempfile::tempdir().unwrap();
    let prices = dir.path().join("prices.csv");
    fs::write(&prices, "only_one_column\n1\n").unwrap();

    let options = DataOptions {
        price_csv: Some(prices),
        events_csv: Some(dir.path().join("absent_events.csv")),
        ..DataOptions::default()
    };
    let dataset = load_dataset(&options);
    assert_eq!(dataset.price_source, Some(DataSource::Synthetic));
}
