//! Typed configuration models.
//!
//! # Design
//! - Every section defaults so an absent file yields a usable config.
//! - Unknown keys are rejected to surface typos early.

use std::collections::BTreeMap;

use quill_telemetry::{LogFormat, LoggingConfig};
use serde::{Deserialize, Serialize};

use crate::defaults::DEFAULT_LOG_LEVEL;

/// Named feature toggles; unlisted flags are disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureFlags(BTreeMap<String, bool>);

impl FeatureFlags {
    /// Empty flag set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Whether `name` is switched on.
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }

    /// Switch `name` on or off.
    pub fn set(&mut self, name: impl Into<String>, enabled: bool) {
        self.0.insert(name.into(), enabled);
    }

    /// Builder variant of [`set`](Self::set) that enables `name`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>) -> Self {
        self.set(name, true);
        self
    }

    /// Names of enabled flags, in name order.
    #[must_use]
    pub fn enabled(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for FeatureFlags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(|name| (name.into(), true)).collect())
    }
}

/// Logging section of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// Level or filter directive handed to the subscriber.
    pub level: String,
    /// Output format; inferred from the build profile when absent.
    pub format: Option<LogFormat>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: None,
        }
    }
}

impl LoggingSettings {
    /// Subscriber configuration borrowing from these settings.
    #[must_use]
    pub fn to_logging_config<'a>(&'a self, build_sha: &'a str) -> LoggingConfig<'a> {
        LoggingConfig {
            level: &self.level,
            format: self.format.unwrap_or_else(LogFormat::infer),
            build_sha,
        }
    }
}

/// Root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuillConfig {
    /// Feature toggles consulted by the views.
    pub features: FeatureFlags,
    /// Logging configuration.
    pub logging: LoggingSettings,
}
