use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

use crate::api::dto::{AlignedEventList, ApiResponse, EventList, EventQuery, ImpactTable};
use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::api::validate::{non_empty, parse_date_range};
use crate::domain::FilterCriteria;
use crate::events::{FilterOptions, available_filters, calculate_event_impact_statistics, filter_events};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/events", get(list_events))
        .route("/api/event-filters", get(event_filters))
        .route("/api/events-with-prices", get(events_with_prices))
        .route("/api/event-impact", get(event_impact))
}

fn criteria(q: &EventQuery) -> Result<FilterCriteria, ApiError> {
    Ok(FilterCriteria {
        range: parse_date_range(q.start_date.as_deref(), q.end_date.as_deref())?,
        event_type: non_empty(q.event_type.as_deref()).map(str::to_string),
        impact_type: non_empty(q.impact_type.as_deref()).map(str::to_string),
        severity: non_empty(q.severity.as_deref()).map(str::to_string),
    })
}

/// GET /api/events?start_date=&end_date=&event_type=&impact_type=&severity=
async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(q): Query<EventQuery>,
) -> Result<Json<ApiResponse<EventList>>, ApiError> {
    let events = state.events()?;
    let selected = filter_events(events, &criteria(&q)?)?;
    Ok(Json(ApiResponse::success(EventList {
        count: selected.len(),
        events: selected,
    })))
}

/// GET /api/event-filters
async fn event_filters(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<FilterOptions>>, ApiError> {
    let events = state.events()?;
    Ok(Json(ApiResponse::success(available_filters(events))))
}

/// GET /api/events-with-prices: same filters as /api/events, plus window metrics.
async fn events_with_prices(
    State(state): State<Arc<AppState>>,
    Query(q): Query<EventQuery>,
) -> Result<Json<ApiResponse<AlignedEventList>>, ApiError> {
    let aligned = state.aligned()?;
    let selected = filter_events(aligned, &criteria(&q)?)?;
    Ok(Json(ApiResponse::success(AlignedEventList {
        count: selected.len(),
        events: selected,
    })))
}

/// GET /api/event-impact
async fn event_impact(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ImpactTable>>, ApiError> {
    let aligned = state.aligned()?;
    Ok(Json(ApiResponse::success(ImpactTable {
        rows: calculate_event_impact_statistics(aligned),
    })))
}
