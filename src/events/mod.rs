//! Event integration: joining market events with the price series.
//!
//! - window metrics per event (`align`)
//! - grouping and impact summaries (`impact`)
//! - date / categorical selection shared by the CLI and the API (`filter`)

pub mod align;
pub mod filter;
pub mod impact;

pub use align::align_events_with_prices;
pub use filter::{FilterOptions, available_filters, filter_by_date, filter_events};
pub use impact::{ImpactRow, calculate_event_impact_statistics, categorize_events};
