//! Terminal reports for `brent analyze`.
//!
//! Formatting lives here so the analysis code only produces data.

pub mod format;

pub use format::{format_analysis_report, format_event_groups, format_events_table, format_impact_table};
