pub mod analysis;
pub mod events;
pub mod prices;
pub mod system;

use axum::Router;
use std::sync::Arc;

use crate::api::state::AppState;

/// Assemble the API router.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(system::routes())
        .merge(prices::routes())
        .merge(events::routes())
        .merge(analysis::routes())
}
