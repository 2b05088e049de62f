//! Structured logging setup for dockstrap
//!
//! Logs go to stderr through a `tracing-subscriber` registry so that stdout
//! stays reserved for reports and generated content. `RUST_LOG` takes
//! precedence over the configured level when it is set.
//!
//! # Example
//!
//! ```no_run
//! use dockstrap::util::logging::{self, LoggingConfig};
//! use tracing::Level;
//!
//! logging::init_logging(LoggingConfig::with_level(Level::DEBUG));
//!
//! tracing::info!(dependency = "docker", "Probing dependency");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Emit JSON records instead of human-oriented lines
    pub use_json: bool,

    /// Include the module target (e.g., dockstrap::install) in logs
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
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

    /// Resolves the effective level from command-line flags
    ///
    /// Precedence: explicit `--log-level`, then `-v`/`-q`, then the
    /// configured fallback (usually `DOCKSTRAP_LOG_LEVEL`).
    pub fn resolve(explicit: Option<&str>, verbose: bool, quiet: bool, fallback: &str) -> Self {
        let level = if let Some(level_str) = explicit {
            parse_level_or_default(level_str)
        } else if verbose {
            Level::DEBUG
        } else if quiet {
            Level::ERROR
        } else {
            parse_level_or_default(fallback)
        };

        let use_json = env::var("DOCKSTRAP_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            level,
            use_json,
            ..Default::default()
        }
    }
}

/// Parses a log level from a string (case-insensitive)
///
/// ```
/// use dockstrap::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Some(Level::DEBUG));
/// assert_eq!(parse_level("WARN"), Some(Level::WARN));
/// assert_eq!(parse_level("loud"), None);
/// ```
pub fn parse_level(level_str: &str) -> Option<Level> {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

fn parse_level_or_default(level_str: &str) -> Level {
    parse_level(level_str).unwrap_or_else(|| {
        eprintln!(
            "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
            level_str
        );
        Level::INFO
    })
}

/// Initializes the logging system; later calls are ignored
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();

        if env::var("RUST_LOG").is_err() {
            if let Ok(directive) = format!("dockstrap={}", config.level).parse() {
                filter = filter.add_directive(directive);
            }
        }

        let registry = tracing_subscriber::registry().with(filter);

        if config.use_json {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(config.include_target)
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(config.include_target)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}
