//! Structured logging setup for mcpforge
//!
//! Logs go to stderr so that command results on stdout stay machine-readable.
//! The subscriber is installed once per process; later calls are ignored.
//!
//! # Example
//!
//! ```no_run
//! use mcpforge::util::logging;
//! use tracing::{info, warn};
//!
//! logging::init_from_env();
//!
//! info!(root = "/srv/units", "Scan started");
//! warn!(unit = "weather-mcp", "Entrypoint override not present");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Crate target the configured level applies to when `RUST_LOG` is unset
const LOG_TARGET: &str = "mcpforge";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// JSON lines instead of human-readable output
    pub use_json: bool,

    /// Include the module target (e.g., mcpforge::discovery) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,

    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: false,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON output with full metadata, for log collectors
    pub fn json(level: Level) -> Self {
        Self {
            level,
            use_json: true,
            include_target: true,
            include_location: true,
            include_thread_ids: true,
        }
    }

    /// Filter for this configuration: `RUST_LOG` wins when set
    pub fn filter(&self) -> EnvFilter {
        if env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(format!(
                "{}={}",
                LOG_TARGET,
                self.level.as_str().to_lowercase()
            ))
        }
    }
}

/// Case-insensitive level name, `None` when unknown
pub fn try_parse_level(level_str: &str) -> Option<Level> {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Like [`try_parse_level`], falling back to INFO
pub fn parse_level(level_str: &str) -> Level {
    try_parse_level(level_str).unwrap_or_else(|| {
        eprintln!(
            "Invalid log level '{}', defaulting to info. Valid levels: trace, debug, info, warn, error",
            level_str
        );
        Level::INFO
    })
}

pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.filter();

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        }
    });
}

/// Reads `MCPFORGE_LOG_LEVEL` and `MCPFORGE_LOG_JSON`
pub fn config_from_env() -> LoggingConfig {
    let level = env::var("MCPFORGE_LOG_LEVEL")
        .map(|v| parse_level(&v))
        .unwrap_or(Level::INFO);
    let use_json = env::var("MCPFORGE_LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    if use_json {
        LoggingConfig::json(level)
    } else {
        LoggingConfig::with_level(level)
    }
}

pub fn init_from_env() {
    init_logging(config_from_env());
}
