//! Structured logging setup
//!
//! JSON or pretty output on stderr/stdout via `tracing`, with the level and
//! format taken from CLI arguments first and the configuration file second.
//! The append-only request log is separate; see [`crate::audit`].

use tracing_subscriber::{fmt::time::ChronoLocal, EnvFilter};

use crate::config::Config;
use crate::error::Result;

/// Log level enum values as strings for configuration
pub mod level {
    pub const TRACE: &str = "trace";
    pub const DEBUG: &str = "debug";
    pub const INFO: &str = "info";
    pub const WARN: &str = "warn";
    pub const ERROR: &str = "error";
}

/// Log format enum values as strings for configuration
pub mod format {
    pub const JSON: &str = "json";
    pub const PRETTY: &str = "pretty";
}

/// Initialize the global tracing subscriber.
///
/// Precedence: CLI overrides, then the configuration file, then defaults.
pub fn init(
    log_level_override: Option<&str>,
    log_format_override: Option<&str>,
    config: Option<&Config>,
) -> Result<()> {
    let log_level = if let Some(level) = log_level_override {
        level
    } else if let Some(config) = config {
        &config.logging.level
    } else {
        level::INFO
    };

    let log_format = if let Some(fmt) = log_format_override {
        fmt
    } else if let Some(config) = config {
        &config.logging.format
    } else {
        format::PRETTY
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let timer = ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string());

    match log_format {
        format::JSON => {
            tracing_subscriber::fmt()
                .json()
                .with_timer(timer)
                .with_env_filter(env_filter)
                .with_target(false)
                .with_current_span(true)
                .with_span_list(false)
                .init();
        }
        format::PRETTY => {
            tracing_subscriber::fmt()
                .pretty()
                .with_timer(timer)
                .with_env_filter(env_filter)
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .init();
        }
        _ => {
            // Unknown formats fall back to the standard formatter
            tracing_subscriber::fmt()
                .with_timer(timer)
                .with_env_filter(env_filter)
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .init();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_constants() {
        assert_eq!(level::TRACE, "trace");
        assert_eq!(level::DEBUG, "debug");
        assert_eq!(level::INFO, "info");
        assert_eq!(level::WARN, "warn");
        assert_eq!(level::ERROR, "error");
    }

    #[test]
    fn test_format_constants() {
        assert_eq!(format::JSON, "json");
        assert_eq!(format::PRETTY, "pretty");
    }
}
