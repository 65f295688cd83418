//! Price-window metrics around each event.
//!
//! For an event on day `d` and a window of `w` calendar days:
//!
//! - the window is `[d - w, d + w]` (inclusive)
//! - `price_before` is the mean over `[d - w, d)`, `price_after` over `(d, d + w]`
//! - change, % change, window max/min and sample std are only filled when
//!   both sides of the event have prices
//! - the nearest observation is reported whenever the window is non-empty
//!
//! Events are independent, so they are evaluated in parallel.

use chrono::Duration;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::domain::{AlignedEvent, Event, EventImpact, PricePoint, PriceSeries};
use crate::error::AppError;
use crate::math::stats;

pub fn align_events_with_prices(
    series: &PriceSeries,
    events: &[Event],
    window_days: i64,
) -> Result<Vec<AlignedEvent>, AppError> {
    if window_days <= 0 {
        return Err(AppError::new(
            2,
            format!("window_days must be positive, got {window_days}"),
        ));
    }
    if series.is_empty() {
        return Err(AppError::new(3, "Price series is empty."));
    }
    if events.is_empty() {
        return Err(AppError::new(3, "Event list is empty."));
    }

    let window = Duration::days(window_days);
    let aligned: Vec<AlignedEvent> = events
        .par_iter()
        .map(|event| AlignedEvent {
            event: event.clone(),
            impact: event_impact(series, event, window),
        })
        .collect();

    let complete = aligned
        .iter()
        .filter(|a| a.impact.price_change.is_some())
        .count();
    info!(
        aligned = complete,
        total = aligned.len(),
        window_days,
        "aligned events with prices"
    );
    Ok(aligned)
}

fn event_impact(series: &PriceSeries, event: &Event, window: Duration) -> EventImpact {
    let d = event.event_date;
    let in_window = series.between(d - window, d + window);
    if in_window.is_empty() {
        warn!(event_date = %d, "no price data found for event");
        return EventImpact::default();
    }

    let nearest = nearest_point(in_window, event);
    let mut impact = EventImpact {
        nearest_date: Some(nearest.date),
        nearest_price: Some(nearest.price),
        observations: in_window.len(),
        ..EventImpact::default()
    };

    let before: Vec<f64> = in_window.iter().filter(|p| p.date < d).map(|p| p.price).collect();
    let after: Vec<f64> = in_window.iter().filter(|p| p.date > d).map(|p| p.price).collect();

    let (Some(price_before), Some(price_after)) = (stats::mean(&before), stats::mean(&after)) else {
        warn!(event_date = %d, "insufficient price data before/after event");
        return impact;
    };

    let window_prices: Vec<f64> = in_window.iter().map(|p| p.price).collect();
    impact.price_before = Some(price_before);
    impact.price_after = Some(price_after);
    impact.price_change = Some(price_after - price_before);
    if price_before != 0.0 {
        impact.price_change_pct = Some((price_after - price_before) / price_before * 100.0);
    }
    impact.max_price_window = stats::max(&window_prices);
    impact.min_price_window = stats::min(&window_prices);
    impact.volatility_window = stats::std_dev(&window_prices);
    impact
}

/// Closest observation to the event date; ties go to the earlier date.
fn nearest_point<'a>(window: &'a [PricePoint], event: &Event) -> &'a PricePoint {
    let mut best = &window[0];
    let mut best_gap = (best.date - event.event_date).num_days().abs();
    for p in &window[1..] {
        let gap = (p.date - event.event_date).num_days().abs();
        if gap < best_gap {
            best = p;
            best_gap = gap;
        }
    }
    best
}
