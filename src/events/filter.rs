//! Date and categorical selection of events.
//!
//! Works on anything that exposes an `Event` (plain events and aligned
//! events), so `/api/events` and `/api/events-with-prices` share one path.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::{DateRange, Event, FilterCriteria};
use crate::error::AppError;

/// Distinct categorical values present in a set of events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub event_types: Vec<String>,
    pub impact_types: Vec<String>,
    pub severities: Vec<String>,
}

/// Sorted, de-duplicated filter values.
pub fn available_filters<T: AsRef<Event>>(events: &[T]) -> FilterOptions {
    let mut types = BTreeSet::new();
    let mut impacts = BTreeSet::new();
    let mut severities = BTreeSet::new();
    for item in events {
        let e = item.as_ref();
        types.extend(e.event_type.iter().cloned());
        impacts.extend(e.impact_type.iter().cloned());
        severities.extend(e.severity.iter().cloned());
    }
    FilterOptions {
        event_types: types.into_iter().collect(),
        impact_types: impacts.into_iter().collect(),
        severities: severities.into_iter().collect(),
    }
}

pub fn filter_by_date<T: AsRef<Event> + Clone>(events: &[T], range: &DateRange) -> Vec<T> {
    events
        .iter()
        .filter(|e| range.contains(e.as_ref().event_date))
        .cloned()
        .collect()
}

/// Date filter first, then each categorical filter.
///
/// A categorical value must exist among the date-filtered events; otherwise
/// this is an input error listing the allowed values.
pub fn filter_events<T: AsRef<Event> + Clone>(
    events: &[T],
    criteria: &FilterCriteria,
) -> Result<Vec<T>, AppError> {
    let mut selected = filter_by_date(events, &criteria.range);
    let allowed = available_filters(&selected);

    if let Some(v) = criteria.event_type.as_deref() {
        check_allowed("event_type", v, &allowed.event_types)?;
        selected.retain(|e| e.as_ref().event_type.as_deref() == Some(v));
    }
    if let Some(v) = criteria.impact_type.as_deref() {
        check_allowed("impact_type", v, &allowed.impact_types)?;
        selected.retain(|e| e.as_ref().impact_type.as_deref() == Some(v));
    }
    if let Some(v) = criteria.severity.as_deref() {
        check_allowed("severity", v, &allowed.severities)?;
        selected.retain(|e| e.as_ref().severity.as_deref() == Some(v));
    }
    Ok(selected)
}

fn check_allowed(name: &str, value: &str, allowed: &[String]) -> Result<(), AppError> {
    if allowed.iter().any(|a| a == value) {
        return Ok(());
    }
    Err(AppError::new(
        2,
        format!(
            "Invalid {name} '{value}'. Allowed values: {}",
            allowed.join(", ")
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ev(day: u32, kind: &str, impact: &str, severity: &str) -> Event {
        Event {
            event_date: NaiveDate::from_ymd_opt(2019, 6, day).unwrap(),
            event_type: Some(kind.into()),
            event_description: None,
            impact_type: Some(impact.into()),
            severity: Some(severity.into()),
            source_notes: None,
        }
    }

    fn sample() -> Vec<Event> {
        vec![
            ev(1, "OPEC", "Supply Shock", "High"),
            ev(10, "Geopolitical", "Supply Shock", "Very High"),
            ev(20, "Economic", "Demand Shock", "High"),
        ]
    }

    #[test]
    fn options_are_sorted_and_unique() {
        let opts = available_filters(&sample());
        assert_eq!(opts.event_types, vec!["Economic", "Geopolitical", "OPEC"]);
        assert_eq!(opts.impact_types, vec!["Demand Shock", "Supply Shock"]);
        assert_eq!(opts.severities, vec!["High", "Very High"]);
    }

    #[test]
    fn categorical_filters_only_return_matches() {
        let criteria = FilterCriteria {
            impact_type: Some("Supply Shock".into()),
            severity: Some("High".into()),
            ..FilterCriteria::default()
        };
        let out = filter_events(&sample(), &criteria).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].event_type.as_deref(), Some("OPEC"));
    }

    #[test]
    fn values_outside_the_date_range_are_rejected() {
        let criteria = FilterCriteria {
            range: DateRange::new(NaiveDate::from_ymd_opt(2019, 6, 5), None),
            event_type: Some("OPEC".into()),
            ..FilterCriteria::default()
        };
        let err = filter_events(&sample(), &criteria).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.message(),
            "Invalid event_type 'OPEC'. Allowed values: Economic, Geopolitical"
        );
    }

    #[test]
    fn date_filter_is_inclusive() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2019, 6, 10),
            NaiveDate::from_ymd_opt(2019, 6, 20),
        );
        assert_eq!(filter_by_date(&sample(), &range).len(), 2);
    }
}
