//! Flag names and environment keys.
//!
//! # Design
//! - Centralize names so views and loaders agree on spelling.

/// Enables the taxonomy management section of the Writing form.
pub const FLAG_SITE_SETTINGS_CATEGORIES: &str = "manage/site-settings/categories";
/// Enables the Press This bookmarklet sections.
pub const FLAG_PRESS_THIS: &str = "press-this";

/// Path of an optional JSON configuration file.
pub const ENV_CONFIG_PATH: &str = "QUILL_CONFIG_PATH";
/// Comma-separated feature overrides; a leading `-` disables the flag.
pub const ENV_FEATURES: &str = "QUILL_FEATURES";
/// Log level or filter directive override.
pub const ENV_LOG_LEVEL: &str = "QUILL_LOG_LEVEL";
/// Log format override (`json` or `pretty`).
pub const ENV_LOG_FORMAT: &str = "QUILL_LOG_FORMAT";

pub(crate) const DEFAULT_LOG_LEVEL: &str = quill_telemetry::DEFAULT_LOG_LEVEL;
