//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - loader configuration enums (`Frequency`, `MissingStrategy`)
//! - the validated price series (`PriceSeries`) and its raw form (`RawPrices`)
//! - market events and their price alignment (`Event`, `AlignedEvent`)
//! - request-level selection (`DateRange`, `FilterCriteria`)

pub mod types;

pub use types::*;
