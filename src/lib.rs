//! `brent-breaks` library crate.
//!
//! The binary (`brent`) is a thin wrapper around this library so that:
//!
//! - the loader, analysis and API are testable without spawning processes
//! - the router can be driven in-process by integration tests

pub mod analysis;
pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod events;
pub mod io;
pub mod math;
pub mod report;
