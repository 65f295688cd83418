//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the real main that:
//! - parses CLI arguments
//! - loads the dataset and serves the API
//! - runs the one-shot analysis pipeline and prints its report
//! - writes the synthetic datasets

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::cli::{AnalyzeArgs, Command, SampleArgs, ServeArgs};
use crate::config::ServerConfig;
use crate::data::{generate_sample_prices, load_dataset, sample_events};
use crate::domain::DateRange;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `brent` binary.
pub fn run() -> Result<(), AppError> {
    init_tracing();

    // `brent` and `brent --port 8080` behave like `brent serve ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Serve(args) => handle_serve(args),
        Command::Analyze(args) => handle_analyze(args),
        Command::Sample(args) => handle_sample(args),
    }
}

/// Logs go to stderr so reports on stdout stay clean. `RUST_LOG` overrides the level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_serve(args: ServeArgs) -> Result<(), AppError> {
    let config = server_config_from_args(ServerConfig::from_env(), args);
    if config.window_days <= 0 {
        return Err(AppError::new(
            2,
            format!("window_days must be positive, got {}", config.window_days),
        ));
    }

    let dataset = load_dataset(&config.data_options());
    let state = AppState::new(dataset);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::new(1, format!("Failed to start async runtime: {e}")))?;
    runtime.block_on(crate::api::serve(&config, state))
}

/// CLI flags win over environment values.
pub fn server_config_from_args(mut config: ServerConfig, args: ServeArgs) -> ServerConfig {
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if args.prices.is_some() {
        config.price_csv = args.prices;
    }
    if args.events.is_some() {
        config.events_csv = args.events;
    }
    if let Some(w) = args.window_days {
        config.window_days = w;
    }
    if args.static_dir.is_some() {
        config.static_dir = args.static_dir;
    }
    config
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = analysis_config_from_args(&args)?;
    let run = pipeline::run_analysis(&config)?;

    println!("{}", crate::report::format_analysis_report(&run));

    if let Some(path) = &args.export_events {
        crate::io::export::write_aligned_events_csv(path, &run.aligned)?;
    }
    if let Some(path) = &args.export_prices {
        crate::io::export::write_price_csv(path, &run.series)?;
    }
    Ok(())
}

pub fn analysis_config_from_args(args: &AnalyzeArgs) -> Result<pipeline::AnalysisConfig, AppError> {
    if let (Some(start), Some(end)) = (args.start, args.end) {
        if start > end {
            return Err(AppError::new(
                2,
                format!("start date ({start}) must be less than or equal to end date ({end})"),
            ));
        }
    }
    if !(args.alpha > 0.0 && args.alpha < 1.0) {
        return Err(AppError::new(2, format!("alpha must be in (0, 1), got {}", args.alpha)));
    }
    if args.window == 0 {
        return Err(AppError::new(2, "window must be positive"));
    }
    if args.event_window <= 0 {
        return Err(AppError::new(
            2,
            format!("event window must be positive, got {}", args.event_window),
        ));
    }

    Ok(pipeline::AnalysisConfig {
        prices: args.prices.clone(),
        events: args.events.clone(),
        range: DateRange::new(args.start, args.end),
        frequency: args.frequency,
        missing: args.missing,
        window: args.window,
        alpha: args.alpha,
        event_window: args.event_window,
        seed: args.seed,
    })
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let prices = generate_sample_prices(args.seed)?;
    let events = sample_events();
    crate::io::export::write_price_csv(&args.prices_out, &prices)?;
    crate::io::export::write_event_csv(&args.events_out, &events)?;
    info!(
        prices = prices.len(),
        events = events.len(),
        "sample data written"
    );
    Ok(())
}

/// Rewrite argv so `brent` defaults to `brent serve`.
///
/// Rules:
/// - `brent`                         -> `brent serve`
/// - `brent --port 8080 ...`         -> `brent serve --port 8080 ...`
/// - `brent --help/--version/-h`     -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("serve".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "serve".to_string());
    }
    argv
}
