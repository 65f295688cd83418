use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/health", get(health))
}

/// GET /api/health: liveness plus which dataset parts are loaded. Not enveloped.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let dataset = &state.dataset;
    Json(HealthResponse {
        status: "healthy",
        price_data_loaded: state.prices().is_ok(),
        event_data_loaded: state.events().is_ok(),
        price_source: dataset.price_source.as_ref().map(|s| s.label()),
        event_source: dataset.event_source.as_ref().map(|s| s.label()),
    })
}
