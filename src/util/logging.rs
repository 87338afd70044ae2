//! Structured logging setup
//!
//! Initializes a `tracing` subscriber once per process. Output is either a
//! compact console format or JSON lines, filtered by `RUST_LOG` when set and by
//! the configured level otherwise.
//!
//! ```no_run
//! use repolift::util::logging;
//!
//! logging::init_from_env();
//! tracing::info!(repository = "/scratch/shop", "Analyzing repository");
//! ```

use crate::config::{ConfigSource, EnvConfigSource};
use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,

    /// Emit JSON lines instead of console output
    pub use_json: bool,

    /// Include the module target (e.g. repolift::detection) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
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

    /// Level from `REPOLIFT_LOG_LEVEL` (default info) and JSON output from
    /// `REPOLIFT_LOG_JSON`
    pub fn from_source(source: &dyn ConfigSource) -> Self {
        let level = source
            .get("REPOLIFT_LOG_LEVEL")
            .map(|level| parse_level(&level))
            .unwrap_or(Level::INFO);
        let use_json = source
            .get("REPOLIFT_LOG_JSON")
            .and_then(|v| v.trim().parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            level,
            use_json,
            ..Default::default()
        }
    }

    /// JSON output with source locations, for log shipping
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
        }
    }
}

/// Parses a log level, falling back to INFO for unknown values
pub fn parse_level(level_str: &str) -> Level {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn build_filter(level: Level) -> EnvFilter {
    if env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }

    let directive = format!("repolift={}", level);
    match directive.parse() {
        Ok(directive) => EnvFilter::new("warn").add_directive(directive),
        Err(_) => EnvFilter::new("info"),
    }
}

/// Initializes the logging system; later calls are ignored
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Reads `REPOLIFT_LOG_LEVEL` and `REPOLIFT_LOG_JSON`
pub fn init_from_env() {
    init_logging(LoggingConfig::from_source(&EnvConfigSource));
}
