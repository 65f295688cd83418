use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

use crate::analysis::{PriceStatistics, price_statistics};
use crate::api::dto::{ApiResponse, DateQuery, PriceData};
use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::api::validate::parse_date_range;
use crate::domain::PriceSeries;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/price-data", get(price_data))
        .route("/api/statistics", get(statistics))
}

/// Validated date slice of the loaded prices; empty slices are a client error.
pub(crate) fn filtered_prices(
    state: &AppState,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<PriceSeries, ApiError> {
    let prices = state.prices()?;
    let range = parse_date_range(start, end)?;
    let filtered = prices.slice(&range);
    if filtered.is_empty() {
        return Err(ApiError::Validation("Filtered price data is empty".to_string()));
    }
    Ok(filtered)
}

/// GET /api/price-data?start_date=&end_date=
async fn price_data(
    State(state): State<Arc<AppState>>,
    Query(q): Query<DateQuery>,
) -> Result<Json<ApiResponse<PriceData>>, ApiError> {
    let series = filtered_prices(&state, q.start_date.as_deref(), q.end_date.as_deref())?;
    let (Some(min_date), Some(max_date)) = (series.first_date(), series.last_date()) else {
        return Err(ApiError::Internal("non-empty series without bounds".to_string()));
    };

    Ok(Json(ApiResponse::success(PriceData {
        dates: series.dates(),
        prices: series.prices(),
        min_date,
        max_date,
        count: series.len(),
    })))
}

/// GET /api/statistics?start_date=&end_date=
async fn statistics(
    State(state): State<Arc<AppState>>,
    Query(q): Query<DateQuery>,
) -> Result<Json<ApiResponse<PriceStatistics>>, ApiError> {
    let series = filtered_prices(&state, q.start_date.as_deref(), q.end_date.as_deref())?;
    let stats = price_statistics(&series)
        .map_err(|e| ApiError::Calculation(format!("statistics: {}", e.message())))?;
    Ok(Json(ApiResponse::success(stats)))
}
