//! Error types for configuration loading.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file")]
    ReadFile {
        /// Path that failed to load.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The configuration file was not valid JSON for the config model.
    #[error("failed to parse configuration file")]
    ParseFile {
        /// Path that failed to parse.
        path: PathBuf,
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Section that failed validation.
        section: &'static str,
        /// Field that failed validation.
        field: &'static str,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
