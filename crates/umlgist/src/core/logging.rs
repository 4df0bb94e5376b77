//! Logging infrastructure for diagram analysis
//!
//! Structured logging through the `tracing` crate. Native builds install a
//! `tracing-subscriber` registry; browser builds log to the console through
//! `tracing-wasm`.
//!
//! # Usage
//!
//! ```rust,no_run
//! use umlgist::core::logging::init_logging;
//!
//! // Defaults: env vars, then info level and compact format
//! init_logging(None, None)?;
//!
//! // Explicit level and format
//! init_logging(Some("debug"), Some("pretty"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Log Formats
//!
//! - `compact`: Single-line format without targets, good for the CLI
//! - `pretty`: Multi-line format with source locations, good for development
//! - `json`: One JSON object per event, good for log aggregation
//!
//! # Environment Variables
//!
//! - `UMLGIST_LOG_LEVEL`: level or filter directive (trace|debug|info|warn|error|off)
//! - `UMLGIST_LOG_FORMAT`: compact|pretty|json
//! - `RUST_LOG`: standard `tracing-subscriber` filter, wins over the level
//!
//! # Filtering Logs
//!
//! The pipeline stages log under their module paths, so they can be
//! filtered individually:
//!
//! ```bash
//! # Analyzer internals only
//! RUST_LOG="umlgist::semantic::analyzer=debug" umlgist summarize -i diagram.hyl
//!
//! # Everything at info, the sketch engine at trace
//! RUST_LOG="info,umlgist::plugins::sketch=trace" umlgist summarize -i diagram.hyl
//! ```

use std::str::FromStr;

#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

#[cfg(target_arch = "wasm32")]
use tracing_wasm::WASMLayerConfig;

const LEVEL_ENV: &str = "UMLGIST_LOG_LEVEL";
const FORMAT_ENV: &str = "UMLGIST_LOG_FORMAT";

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Compact single-line format
    #[default]
    Compact,
    /// Pretty multi-line format with colors
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// Get all valid format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Pick an explicit setting, else the first set environment variable
fn setting(explicit: Option<&str>, env_keys: &[&str]) -> Option<String> {
    explicit
        .map(str::to_string)
        .or_else(|| env_keys.iter().find_map(|key| std::env::var(key).ok()))
}

/// Initialize the tracing subscriber with the given log level and format
///
/// `level` falls back to `UMLGIST_LOG_LEVEL`, then `RUST_LOG`, then `info`.
/// `format` falls back to `UMLGIST_LOG_FORMAT`, then `compact`.
///
/// Returns an error for an unknown format, or when a global subscriber is
/// already installed.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = match setting(format, &[FORMAT_ENV]) {
        Some(name) => {
            LogFormat::from_str(&name).map_err(|e| format!("Invalid log format: {}", e))?
        }
        None => LogFormat::default(),
    };

    #[cfg(target_arch = "wasm32")]
    {
        // tracing-wasm 0.1 has no level filter; the browser console filters instead
        let _ = (level, format);
        tracing_wasm::set_as_global_default_with_config(WASMLayerConfig::default());
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let level = setting(level, &[LEVEL_ENV, "RUST_LOG"]).unwrap_or_else(|| "info".to_string());
        let filter = if level == "off" {
            EnvFilter::new("off")
        } else {
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&level))
                .unwrap_or_else(|_| EnvFilter::new("info"))
        };

        let layer = match format {
            LogFormat::Compact => fmt::Layer::default()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .with_span_events(FmtSpan::NONE)
                .boxed(),
            LogFormat::Pretty => fmt::Layer::default()
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::ACTIVE)
                .pretty()
                .boxed(),
            LogFormat::Json => fmt::Layer::default()
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::CLOSE)
                .json()
                .boxed(),
        };

        Registry::default().with(filter).with(layer).try_init()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str("compact").unwrap(), LogFormat::Compact);
        assert_eq!(LogFormat::from_str("Pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
        assert!(LogFormat::from_str("xml").is_err());
    }

    #[test]
    fn test_explicit_setting_wins() {
        assert_eq!(
            setting(Some("debug"), &["UMLGIST_TEST_UNSET_VARIABLE"]),
            Some("debug".to_string())
        );
        assert_eq!(setting(None, &["UMLGIST_TEST_UNSET_VARIABLE"]), None);
    }
}
