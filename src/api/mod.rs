//! HTTP API over the loaded dataset.

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::AppError;

pub use error::ApiError;
pub use state::AppState;

/// Full application router: API routes, optional static frontend, CORS and tracing.
pub fn router(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    let api = routes::api_router();
    let app = match static_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "serving static frontend");
            api.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true))
        }
        None => api.fallback(not_found),
    };

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn not_found(uri: axum::http::Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: &ServerConfig, state: Arc<AppState>) -> Result<(), AppError> {
    let app = router(state, config.static_dir.as_deref());
    let addr = config.addr();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::new(2, format!("Failed to bind {addr}: {e}")))?;
    info!("listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::new(1, format!("Server error: {e}")))?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
