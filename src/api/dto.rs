//! Query parameters and response bodies.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analysis::{ArchTest, LinearTrend, PeriodStats, StationarityReport, VolatilityStats};
use crate::domain::{AlignedEvent, Event};
use crate::events::ImpactRow;

/// Every parameter arrives as a string so bad values produce our own
/// validation envelope instead of the extractor's rejection.
#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub event_type: Option<String>,
    pub impact_type: Option<String>,
    pub severity: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub window: Option<String>,
    pub alpha: Option<String>,
}

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: &'static str,
    pub status_code: u16,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data,
            status: "success",
            status_code: 200,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub price_data_loaded: bool,
    pub event_data_loaded: bool,
    pub price_source: Option<&'static str>,
    pub event_source: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct PriceData {
    pub dates: Vec<NaiveDate>,
    pub prices: Vec<f64>,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct EventList {
    pub events: Vec<Event>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct AlignedEventList {
    pub events: Vec<AlignedEvent>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ImpactTable {
    pub rows: Vec<ImpactRow>,
}

#[derive(Debug, Serialize)]
pub struct VolatilitySummary {
    pub window: usize,
    pub stats: VolatilityStats,
    pub arch_test: Option<ArchTest>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub descriptive: PeriodStats,
    pub linear_trend: Option<LinearTrend>,
    pub stationarity: StationarityReport,
    pub volatility: VolatilitySummary,
}
