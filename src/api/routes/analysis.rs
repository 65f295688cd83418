use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

use crate::analysis::{descriptive_statistics, linear_regression, test_stationarity, volatility_analysis};
use crate::api::dto::{AnalysisQuery, AnalysisSummary, ApiResponse, VolatilitySummary};
use crate::api::error::ApiError;
use crate::api::routes::prices::filtered_prices;
use crate::api::state::AppState;
use crate::api::validate::{parse_alpha, parse_window};
use crate::domain::PriceSeries;

const DEFAULT_WINDOW: usize = 30;
const DEFAULT_ALPHA: f64 = 0.05;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/analysis", get(analysis))
}

/// GET /api/analysis?start_date=&end_date=&window=&alpha=
async fn analysis(
    State(state): State<Arc<AppState>>,
    Query(q): Query<AnalysisQuery>,
) -> Result<Json<ApiResponse<AnalysisSummary>>, ApiError> {
    let window = parse_window(q.window.as_deref(), DEFAULT_WINDOW)?;
    let alpha = parse_alpha(q.alpha.as_deref(), DEFAULT_ALPHA)?;
    let series = filtered_prices(&state, q.start_date.as_deref(), q.end_date.as_deref())?;

    // ADF lag search over the full history is CPU-bound.
    let summary = tokio::task::spawn_blocking(move || summarize(&series, window, alpha)).await??;
    Ok(Json(ApiResponse::success(summary)))
}

fn summarize(series: &PriceSeries, window: usize, alpha: f64) -> Result<AnalysisSummary, ApiError> {
    let (Some(start_date), Some(end_date)) = (series.first_date(), series.last_date()) else {
        return Err(ApiError::Validation("Filtered price data is empty".to_string()));
    };
    if window > series.len() {
        return Err(ApiError::Validation(format!(
            "Window {window} exceeds the {} observations in range",
            series.len()
        )));
    }

    let prices = series.prices();
    let descriptive = descriptive_statistics(series, None)?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::Calculation("descriptive statistics returned no rows".to_string()))?;
    let stationarity = test_stationarity(&prices, alpha)?;
    let volatility = volatility_analysis(series, window)?;

    Ok(AnalysisSummary {
        start_date,
        end_date,
        descriptive,
        linear_trend: linear_regression(&prices),
        stationarity,
        volatility: VolatilitySummary {
            window: volatility.window,
            stats: volatility.stats,
            arch_test: volatility.arch_test,
        },
    })
}
