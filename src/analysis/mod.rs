//! Exploratory analysis of the price series.
//!
//! Every entry point takes a cleaned `PriceSeries` (or plain values) and returns
//! a serialisable result, so the same structs back the CLI report and the
//! `/api/analysis` endpoint.

pub mod autocorrelation;
pub mod descriptive;
pub mod stationarity;
pub mod trend;
pub mod volatility;

pub use autocorrelation::{Autocorrelation, LjungBox, autocorrelation_analysis, ljung_box};
pub use descriptive::{PeriodStats, PriceStatistics, descriptive_statistics, price_statistics};
pub use stationarity::{AdfResult, KpssResult, StationarityReport, test_stationarity};
pub use trend::{Decomposition, LinearTrend, TrendAnalysis, linear_regression, trend_analysis};
pub use volatility::{ArchTest, VolatilityAnalysis, VolatilityStats, volatility_analysis};
