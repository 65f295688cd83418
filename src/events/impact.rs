//! Event grouping and summary statistics of event impacts.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{AlignedEvent, Event};
use crate::math::stats;

/// Summary of `price_change_pct` for one group of events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactRow {
    pub category: String,
    /// Number of events in the group, including ones without a % change.
    pub count: usize,
    pub mean_price_change_pct: Option<f64>,
    pub median_price_change_pct: Option<f64>,
    pub std_price_change_pct: Option<f64>,
    pub max_price_change_pct: Option<f64>,
    pub min_price_change_pct: Option<f64>,
}

/// Group events by type, and by impact type under an `impact_` prefix.
///
/// Events without the respective field are not grouped.
pub fn categorize_events<T>(events: &[T]) -> BTreeMap<String, Vec<T>>
where
    T: AsRef<Event> + Clone,
{
    let mut out: BTreeMap<String, Vec<T>> = BTreeMap::new();
    for item in events {
        let e = item.as_ref();
        if let Some(t) = &e.event_type {
            out.entry(t.clone()).or_default().push(item.clone());
        }
        if let Some(i) = &e.impact_type {
            out.entry(format!("impact_{i}")).or_default().push(item.clone());
        }
    }
    out
}

/// `Overall`, then `Type: <t>` and `Impact: <i>` rows in order of first appearance.
pub fn calculate_event_impact_statistics(aligned: &[AlignedEvent]) -> Vec<ImpactRow> {
    let mut rows = vec![impact_row("Overall".to_string(), aligned.iter())];

    for t in first_appearance(aligned, |e| e.event_type.as_deref()) {
        let group = aligned.iter().filter(|a| a.event.event_type.as_deref() == Some(t));
        rows.push(impact_row(format!("Type: {t}"), group));
    }
    for i in first_appearance(aligned, |e| e.impact_type.as_deref()) {
        let group = aligned.iter().filter(|a| a.event.impact_type.as_deref() == Some(i));
        rows.push(impact_row(format!("Impact: {i}"), group));
    }
    rows
}

fn first_appearance<'a>(
    aligned: &'a [AlignedEvent],
    key: impl Fn(&'a Event) -> Option<&'a str>,
) -> Vec<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for a in aligned {
        if let Some(k) = key(&a.event) {
            if !seen.contains(&k) {
                seen.push(k);
            }
        }
    }
    seen
}

fn impact_row<'a>(category: String, group: impl Iterator<Item = &'a AlignedEvent>) -> ImpactRow {
    let mut count = 0;
    let mut pct = Vec::new();
    for a in group {
        count += 1;
        if let Some(v) = a.impact.price_change_pct {
            pct.push(v);
        }
    }

    ImpactRow {
        category,
        count,
        mean_price_change_pct: stats::mean(&pct),
        median_price_change_pct: stats::median(&pct),
        std_price_change_pct: stats::std_dev(&pct),
        max_price_change_pct: stats::max(&pct),
        min_price_change_pct: stats::min(&pct),
    }
}
