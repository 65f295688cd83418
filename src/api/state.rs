use std::sync::Arc;

use crate::api::error::ApiError;
use crate::data::Dataset;
use crate::domain::{AlignedEvent, Event, PriceSeries};

/// Shared application state, passed to all route handlers via `axum::extract::State`.
///
/// Built once at startup and never mutated.
#[derive(Debug)]
pub struct AppState {
    pub dataset: Dataset,
}

impl AppState {
    pub fn new(dataset: Dataset) -> Arc<Self> {
        Arc::new(Self { dataset })
    }

    pub fn prices(&self) -> Result<&PriceSeries, ApiError> {
        self.dataset
            .prices
            .as_ref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                ApiError::DataUnavailable(
                    "Price data is not available. Please ensure data files are loaded.".to_string(),
                )
            })
    }

    pub fn events(&self) -> Result<&[Event], ApiError> {
        self.dataset
            .events
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or_else(event_data_unavailable)
    }

    /// Aligned events; unavailable whenever the events themselves are.
    pub fn aligned(&self) -> Result<&[AlignedEvent], ApiError> {
        self.events()?;
        Ok(&self.dataset.aligned)
    }
}

fn event_data_unavailable() -> ApiError {
    ApiError::DataUnavailable(
        "Event data is not available. Please ensure data files are loaded.".to_string(),
    )
}
