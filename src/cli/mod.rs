//! Command-line parsing for the Brent price dashboard.
//!
//! Parsing and dispatch stay separate: this module only declares arguments,
//! `crate::app` decides what to do with them.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{Frequency, MissingStrategy};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "brent", version, about = "Brent crude price and event analysis backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the data and serve the JSON API (default).
    Serve(ServeArgs),
    /// Run the analysis pipeline once and print a report.
    Analyze(AnalyzeArgs),
    /// Write the synthetic price and event datasets as CSV.
    Sample(SampleArgs),
}

/// Server options. Anything left unset comes from `BRENT_*` variables.
#[derive(Debug, Args, Clone, Default)]
pub struct ServeArgs {
    /// Address to bind.
    #[arg(long)]
    pub bind: Option<String>,

    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Price CSV (Date, Price columns).
    #[arg(long)]
    pub prices: Option<PathBuf>,

    /// Event CSV (event_date, event_type, ... columns).
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Directory searched for the default data files.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Half-width in days of the window around each event.
    #[arg(long)]
    pub window_days: Option<i64>,

    /// Serve a built frontend from this directory.
    #[arg(long)]
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    /// Price CSV. Synthetic prices are used when absent.
    #[arg(long)]
    pub prices: Option<PathBuf>,

    /// Event CSV. Built-in events are used when absent; an unreadable file skips the event steps.
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// First date to keep (YYYY-MM-DD).
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last date to keep (YYYY-MM-DD).
    #[arg(long)]
    pub end: Option<NaiveDate>,

    #[arg(long, value_enum, default_value_t = Frequency::Daily)]
    pub frequency: Frequency,

    /// How to fill missing prices.
    #[arg(long, value_enum, default_value_t = MissingStrategy::ForwardFill)]
    pub missing: MissingStrategy,

    /// Rolling window (observations) for trend and volatility.
    #[arg(long, default_value_t = 30)]
    pub window: usize,

    /// Significance level for the stationarity tests.
    #[arg(long, default_value_t = 0.05)]
    pub alpha: f64,

    /// Half-width in days of the window around each event.
    #[arg(long, default_value_t = 30)]
    pub event_window: i64,

    /// Seed for the synthetic fallback.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Write aligned events (with window metrics) to this CSV.
    #[arg(long)]
    pub export_events: Option<PathBuf>,

    /// Write the cleaned price series to this CSV.
    #[arg(long)]
    pub export_prices: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    #[arg(long, default_value = "data/raw/brent_prices.csv")]
    pub prices_out: PathBuf,

    #[arg(long, default_value = "data/raw/oil_market_events.csv")]
    pub events_out: PathBuf,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_flags_parse() {
        let cli = Cli::parse_from([
            "brent", "analyze", "--start", "2020-01-01", "--frequency", "W", "--missing", "interpolate",
            "--window", "10",
        ]);
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(args.frequency, Frequency::Weekly);
        assert_eq!(args.missing, MissingStrategy::Interpolate);
        assert_eq!(args.window, 10);
        assert_eq!(args.event_window, 30);
    }

    #[test]
    fn serve_flags_are_optional() {
        let cli = Cli::parse_from(["brent", "serve", "--port", "8080"]);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, Some(8080));
        assert!(args.bind.is_none());
    }
}
