use std::env;
use std::path::PathBuf;

use crate::data::{DEFAULT_SEED, DEFAULT_WINDOW_DAYS, DataOptions};

/// Server configuration derived from environment variables (and `.env`).
///
/// CLI flags are applied on top by the caller.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Explicit price file; skips the default search locations.
    pub price_csv: Option<PathBuf>,
    /// Explicit event file; skips the default search locations.
    pub events_csv: Option<PathBuf>,
    pub window_days: i64,
    pub sample_seed: u64,
    /// Built frontend to serve as the router fallback.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 5000,
            data_dir: PathBuf::from("data/raw"),
            price_csv: None,
            events_csv: None,
            window_days: DEFAULT_WINDOW_DAYS,
            sample_seed: DEFAULT_SEED,
            static_dir: None,
        }
    }
}

fn env_opt(name: &str) -> Option<String> {
    clean(env::var(name).ok())
}

fn clean(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    clean(value).and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn parse_positive_i64(value: Option<String>, default: i64) -> i64 {
    clean(value)
        .and_then(|s| s.parse().ok())
        .filter(|v: &i64| *v > 0)
        .unwrap_or(default)
}

fn env_str(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.to_string())
}

fn env_u16(name: &str, default: u16) -> u16 {
    parse_or(env_opt(name), default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    parse_or(env_opt(name), default)
}

fn env_positive_i64(name: &str, default: i64) -> i64 {
    parse_positive_i64(env_opt(name), default)
}

fn env_path(name: &str) -> Option<PathBuf> {
    env_opt(name).map(PathBuf::from)
}

impl ServerConfig {
    /// Read `BRENT_*` variables. Unparsable numbers fall back to defaults.
    pub fn from_env() -> Self {
        // A missing .env file is normal.
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Self {
            bind: env_str("BRENT_BIND", &defaults.bind),
            port: env_u16("BRENT_PORT", defaults.port),
            data_dir: env_path("BRENT_DATA_DIR").unwrap_or(defaults.data_dir),
            price_csv: env_path("BRENT_PRICE_CSV"),
            events_csv: env_path("BRENT_EVENTS_CSV"),
            window_days: env_positive_i64("BRENT_WINDOW_DAYS", defaults.window_days),
            sample_seed: env_u64("BRENT_SAMPLE_SEED", defaults.sample_seed),
            static_dir: env_path("BRENT_STATIC_DIR"),
        }
    }

    pub fn data_options(&self) -> DataOptions {
        DataOptions {
            data_dir: self.data_dir.clone(),
            price_csv: self.price_csv.clone(),
            events_csv: self.events_csv.clone(),
            window_days: self.window_days,
            seed: self.sample_seed,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
