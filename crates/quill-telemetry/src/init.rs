//! Subscriber installation and logging configuration.
//!
//! # Design
//! - Centralises logging setup (fmt or JSON) with a single entry point.
//! - `RUST_LOG` wins over the configured level when it parses.
//! - Records the build SHA once to avoid inconsistencies across modules.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, TelemetryError};

/// Default logging target when `RUST_LOG` is not provided.
pub const DEFAULT_LOG_LEVEL: &str = "info";

static BUILD_SHA: OnceCell<String> = OnceCell::new();

/// Configure and install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the configured level is not a valid filter directive or
/// if the tracing subscriber cannot be installed (for example, because another
/// subscriber has already been set globally).
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    // A second initialisation keeps the first SHA.
    let _ = BUILD_SHA.set(config.build_sha.to_string());

    let filter = build_env_filter(config.level)?;
    let installed = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_thread_ids(false),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_thread_ids(false))
            .try_init(),
    };
    installed.map_err(|source| TelemetryError::SubscriberInstall { source })?;

    tracing::debug!(build_sha = build_sha(), format = config.format.as_str(), "logging initialised");
    Ok(())
}

/// Access the build SHA recorded during logging initialisation.
#[must_use]
pub fn build_sha() -> &'static str {
    BUILD_SHA.get().map_or("dev", String::as_str)
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Log level string (e.g., `info`, `quill_settings=debug`).
    pub level: &'a str,
    /// Output format selection for the tracing subscriber.
    pub format: LogFormat,
    /// Build identifier recorded in structured logs.
    pub build_sha: &'a str,
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            format: LogFormat::infer(),
            build_sha: build_sha(),
        }
    }
}

/// Available output formats for the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Emit logs as structured JSON objects.
    Json,
    /// Emit human-readable, pretty-printed logs.
    Pretty,
}

impl LogFormat {
    /// Choose a sensible default for the current build.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }

    /// Parse a format name, returning `None` for unrecognised values.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }

    /// Canonical name of the format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
        }
    }
}

/// Convenience helper for deriving the log format from configuration maps.
///
/// Unrecognised names fall back to [`LogFormat::infer`].
#[must_use]
pub fn log_format_from_config(config: Option<&serde_json::Value>) -> Option<LogFormat> {
    config
        .and_then(|value| value.get("log_format"))
        .and_then(serde_json::Value::as_str)
        .map(|value| LogFormat::parse(value).unwrap_or_else(LogFormat::infer))
}

fn build_env_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|source| TelemetryError::InvalidFilter {
        directive: level.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn log_format_from_config_parses_variants() {
        let json_config = json!({"log_format": "json"});
        assert_eq!(log_format_from_config(Some(&json_config)), Some(LogFormat::Json));

        let pretty_config = json!({"log_format": "Pretty"});
        assert_eq!(
            log_format_from_config(Some(&pretty_config)),
            Some(LogFormat::Pretty)
        );

        let inferred = log_format_from_config(Some(&json!({"log_format": "unknown"})));
        assert_eq!(inferred, Some(LogFormat::infer()));

        assert!(log_format_from_config(None).is_none());
        assert!(log_format_from_config(Some(&json!({}))).is_none());
    }

    #[test]
    fn log_format_round_trips_through_serde() {
        let parsed: LogFormat = serde_json::from_str("\"json\"").expect("parse format");
        assert_eq!(parsed, LogFormat::Json);
        assert_eq!(LogFormat::Pretty.as_str(), "pretty");
    }

    #[test]
    fn build_sha_defaults_to_dev() {
        assert!(!build_sha().is_empty());
    }

    #[test]
    fn init_logging_installs_subscriber_once() {
        let first = LoggingConfig {
            level: "info",
            format: LogFormat::Pretty,
            build_sha: "4f2c9e1",
        };
        let second = LoggingConfig {
            build_sha: "b71d03a",
            ..first.clone()
        };
        let _ = init_logging(&first);
        assert!(matches!(
            init_logging(&second),
            Err(TelemetryError::SubscriberInstall { .. })
        ));
        assert_eq!(build_sha(), "4f2c9e1");
    }
}
