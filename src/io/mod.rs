//! Input/output helpers.
//!
//! - CSV ingest for prices and events (`ingest`)
//! - CSV exports in the same layouts (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
