use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, NaiveDate};
use serde_json::Value;
use tower::ServiceExt;

use brent_breaks::api::{AppState, router};
use brent_breaks::data::Dataset;
use brent_breaks::domain::{DataSource, Event, PricePoint, PriceSeries};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn event(d: NaiveDate, kind: &str, impact: &str, severity: &str) -> Event {
    Event {
        event_date: d,
        event_type: Some(kind.to_string()),
        event_description: Some(format!("{kind} event")),
        impact_type: Some(impact.to_string()),
        severity: Some(severity.to_string()),
        source_notes: None,
    }
}

/// 200 daily prices from 2020-01-01 on a gentle uptrend with a wobble.
fn dataset() -> Dataset {
    let start = date(2020, 1, 1);
    let points = (0..200)
        .map(|i| PricePoint {
            date: start + Duration::days(i),
            price: 50.0 + 0.1 * i as f64 + if i % 2 == 0 { 0.5 } else { -0.5 },
        })
        .collect();
    let prices = PriceSeries::new(points).unwrap();
    let events = vec![
        event(date(2020, 2, 15), "OPEC", "Supply Shock", "High"),
        event(date(2020, 4, 1), "Economic", "Demand Shock", "Very High"),
        event(date(2020, 6, 1), "OPEC", "Supply Shock", "Medium"),
    ];
    Dataset::from_parts(prices, DataSource::Synthetic, events, DataSource::Synthetic, 10)
}

async fn get(dataset: Dataset, uri: &str) -> (StatusCode, Value) {
    let app = router(AppState::new(dataset), None);
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn assert_error(body: &Value, status: StatusCode, error_type: &str) {
    assert_eq!(body["error_type"], error_type);
    assert_eq!(body["status_code"], status.as_u16());
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn health_reports_loaded_parts() {
    let (status, body) = get(dataset(), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["price_data_loaded"], true);
    assert_eq!(body["event_data_loaded"], true);
    assert_eq!(body["price_source"], "synthetic");

    let (_, body) = get(Dataset::default(), "/api/health").await;
    assert_eq!(body["price_data_loaded"], false);
    assert!(body["event_source"].is_null());
}

#[tokio::test]
async fn price_data_stays_inside_requested_range() {
    let (status, body) = get(dataset(), "/api/price-data?start_date=2020-02-01&end_date=2020-02-29").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["status_code"], 200);

    let data = &body["data"];
    assert_eq!(data["count"], 29);
    assert_eq!(data["min_date"], "2020-02-01");
    assert_eq!(data["max_date"], "2020-02-29");
    for d in data["dates"].as_array().unwrap() {
        let d = d.as_str().unwrap();
        assert!(("2020-02-01"..="2020-02-29").contains(&d), "{d} out of range");
    }
    assert_eq!(data["prices"].as_array().unwrap().len(), 29);
}

#[tokio::test]
async fn blank_dates_mean_full_range() {
    let (status, body) = get(dataset(), "/api/price-data?start_date=&end_date=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 200);
}

#[tokio::test]
async fn bad_dates_are_validation_errors() {
    let (status, body) = get(dataset(), "/api/price-data?start_date=2020/01/01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, status, "ValidationError");
    assert_eq!(
        body["error"],
        "Invalid start_date format '2020/01/01'. Expected YYYY-MM-DD format"
    );

    let (status, body) = get(dataset(), "/api/statistics?start_date=2020-03-01&end_date=2020-02-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, status, "ValidationError");

    let (status, body) = get(dataset(), "/api/price-data?start_date=2030-01-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Filtered price data is empty");
}

#[tokio::test]
async fn missing_data_is_unavailable() {
    for uri in ["/api/price-data", "/api/events", "/api/event-filters", "/api/event-impact", "/api/analysis"] {
        let (status, body) = get(Dataset::default(), uri).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        assert_error(&body, status, "DataUnavailableError");
    }
}

#[tokio::test]
async fn statistics_summarise_the_slice() {
    let (status, body) = get(dataset(), "/api/statistics?start_date=2020-01-01&end_date=2020-01-02").await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["count"], 2);
    assert!((data["min"].as_f64().unwrap() - 49.6).abs() < 1e-9);
    assert_eq!(data["max"], 50.5);

    let (_, body) = get(dataset(), "/api/statistics?start_date=2020-01-01&end_date=2020-01-01").await;
    assert!(body["data"]["std"].is_null());
}

#[tokio::test]
async fn event_filters_return_only_matches() {
    let (status, body) = get(dataset(), "/api/events?event_type=OPEC").await;
    assert_eq!(status, StatusCode::OK);
    let events = body["data"]["events"].as_array().unwrap();
    assert_eq!(body["data"]["count"], 2);
    assert!(events.iter().all(|e| e["event_type"] == "OPEC"));

    let (_, body) = get(dataset(), "/api/events?impact_type=Supply%20Shock&severity=High").await;
    let events = body["data"]["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["event_date"], "2020-02-15");

    let (_, body) = get(dataset(), "/api/events?start_date=2020-03-01").await;
    assert_eq!(body["data"]["count"], 2);
}

#[tokio::test]
async fn unknown_filter_value_lists_allowed_values() {
    let (status, body) = get(dataset(), "/api/events?event_type=Geopolitical").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Invalid event_type 'Geopolitical'. Allowed values: Economic, OPEC"
    );

    // Allowed values come from the date-filtered events.
    let (status, _) = get(dataset(), "/api/events?start_date=2020-05-01&event_type=Economic").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn filter_options_are_sorted() {
    let (_, body) = get(dataset(), "/api/event-filters").await;
    let data = &body["data"];
    assert_eq!(data["event_types"], serde_json::json!(["Economic", "OPEC"]));
    assert_eq!(data["impact_types"], serde_json::json!(["Demand Shock", "Supply Shock"]));
    assert_eq!(data["severities"], serde_json::json!(["High", "Medium", "Very High"]));
}

#[tokio::test]
async fn events_carry_window_metrics() {
    let (status, body) = get(dataset(), "/api/events-with-prices?event_type=Economic").await;
    assert_eq!(status, StatusCode::OK);
    let e = &body["data"]["events"][0];
    assert_eq!(e["event_date"], "2020-04-01");
    assert_eq!(e["nearest_date"], "2020-04-01");
    assert!(e["price_before"].as_f64().unwrap() < e["price_after"].as_f64().unwrap());
    assert!(e["price_change_pct"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn impact_rows_start_with_overall() {
    let (status, body) = get(dataset(), "/api/event-impact").await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"]["rows"].as_array().unwrap();
    let categories: Vec<&str> = rows.iter().map(|r| r["category"].as_str().unwrap()).collect();
    assert_eq!(
        categories,
        vec![
            "Overall",
            "Type: OPEC",
            "Type: Economic",
            "Impact: Supply Shock",
            "Impact: Demand Shock"
        ]
    );
    assert_eq!(rows[0]["count"], 3);
}

#[tokio::test]
async fn analysis_bundles_the_eda_results() {
    let (status, body) = get(dataset(), "/api/analysis?window=20&alpha=0.05").await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["descriptive"]["period"], "full_period");
    assert_eq!(data["descriptive"]["count"], 200);
    assert!(data["linear_trend"]["slope"].as_f64().unwrap() > 0.0);
    assert!(data["stationarity"]["conclusion"].is_string());
    assert_eq!(data["volatility"]["window"], 20);

    let (status, body) = get(dataset(), "/api/analysis?alpha=2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, status, "ValidationError");

    let (status, _) = get(dataset(), "/api/analysis?window=500").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_routes_use_the_error_envelope() {
    let (status, body) = get(dataset(), "/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, status, "NotFoundError");
}
