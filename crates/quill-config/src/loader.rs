//! Configuration loading from files and the environment.
//!
//! # Design
//! - The file is optional; environment overrides are applied on top.
//! - Environment access goes through a lookup function so callers and tests
//!   can supply their own source.

use std::fs;
use std::path::{Path, PathBuf};

use quill_telemetry::LogFormat;
use tracing::{debug, info};

use crate::defaults::{ENV_CONFIG_PATH, ENV_FEATURES, ENV_LOG_FORMAT, ENV_LOG_LEVEL};
use crate::error::{ConfigError, ConfigResult};
use crate::model::QuillConfig;

/// Load configuration from the process environment.
///
/// # Errors
///
/// Propagates [`load_with`] errors.
pub fn load_from_env() -> ConfigResult<QuillConfig> {
    load_with(|key| std::env::var(key).ok())
}

/// Load configuration using `lookup` as the environment.
///
/// Reads the file named by `QUILL_CONFIG_PATH` when set, then applies the
/// remaining overrides.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed, or when an
/// override is malformed.
pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<QuillConfig> {
    let mut config = match lookup(ENV_CONFIG_PATH).filter(|path| !path.trim().is_empty()) {
        Some(path) => load_from_path(Path::new(path.trim()))?,
        None => QuillConfig::default(),
    };
    apply_env_overrides(&mut config, lookup)?;
    info!(
        features = config.features.enabled().len(),
        level = %config.logging.level,
        "configuration loaded"
    );
    Ok(config)
}

/// Parse a JSON configuration file.
///
/// # Errors
///
/// Returns [`ConfigError::ReadFile`] or [`ConfigError::ParseFile`].
pub fn load_from_path(path: &Path) -> ConfigResult<QuillConfig> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: PathBuf::from(path),
        source,
    })?;
    let config = serde_json::from_str(&raw).map_err(|source| ConfigError::ParseFile {
        path: PathBuf::from(path),
        source,
    })?;
    debug!(path = %path.display(), "configuration file parsed");
    Ok(config)
}

/// Overlay environment overrides onto `config`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for malformed feature lists, empty
/// log levels, or unknown log formats.
pub fn apply_env_overrides(
    config: &mut QuillConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ConfigResult<()> {
    if let Some(raw) = lookup(ENV_FEATURES) {
        for (name, enabled) in parse_feature_overrides(&raw)? {
            config.features.set(name, enabled);
        }
    }

    if let Some(level) = lookup(ENV_LOG_LEVEL) {
        let level = level.trim();
        if level.is_empty() {
            return Err(ConfigError::InvalidField {
                section: "logging",
                field: "level",
                value: None,
                reason: "empty log level",
            });
        }
        config.logging.level = level.to_string();
    }

    if let Some(format) = lookup(ENV_LOG_FORMAT) {
        let parsed = LogFormat::parse(&format).ok_or_else(|| ConfigError::InvalidField {
            section: "logging",
            field: "format",
            value: Some(format.clone()),
            reason: "expected json or pretty",
        })?;
        config.logging.format = Some(parsed);
    }
    Ok(())
}

/// Parse a comma-separated feature list.
///
/// `name` enables a flag and `-name` disables it; blank entries are skipped.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when an entry has no flag name.
pub fn parse_feature_overrides(raw: &str) -> ConfigResult<Vec<(String, bool)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, enabled) = entry
                .strip_prefix('-')
                .map_or((entry, true), |name| (name.trim(), false));
            if name.is_empty() {
                return Err(ConfigError::InvalidField {
                    section: "features",
                    field: "QUILL_FEATURES",
                    value: Some(entry.to_string()),
                    reason: "empty flag name",
                });
            }
            Ok((name.to_string(), enabled))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{FLAG_PRESS_THIS, FLAG_SITE_SETTINGS_CATEGORIES};
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn feature_overrides_enable_and_disable() {
        let parsed = parse_feature_overrides(" press-this, -manage/site-settings/categories ,,")
            .expect("valid list");
        assert_eq!(
            parsed,
            vec![
                (FLAG_PRESS_THIS.to_string(), true),
                (FLAG_SITE_SETTINGS_CATEGORIES.to_string(), false),
            ]
        );
        assert!(parse_feature_overrides("").expect("empty list").is_empty());
    }

    #[test]
    fn bare_dash_is_rejected() {
        let err = parse_feature_overrides("press-this,-").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidField { section: "features", reason: "empty flag name", .. }
        ));
    }

    #[test]
    fn overrides_without_file_apply_to_defaults() {
        let config = load_with(env(&[
            (ENV_FEATURES, "press-this"),
            (ENV_LOG_LEVEL, "debug"),
            (ENV_LOG_FORMAT, "JSON"),
        ]))
        .expect("config loads");

        assert!(config.features.is_enabled(FLAG_PRESS_THIS));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, Some(LogFormat::Json));
    }

    #[test]
    fn malformed_logging_overrides_are_rejected() {
        let err = load_with(env(&[(ENV_LOG_FORMAT, "xml")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField { field: "format", .. }));

        let err = load_with(env(&[(ENV_LOG_LEVEL, "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField { field: "level", .. }));
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let err = load_with(env(&[(ENV_CONFIG_PATH, "/nonexistent/quill.json")])).unwrap_err();
        assert!(
            matches!(err, ConfigError::ReadFile { ref path, .. } if path.ends_with("quill.json"))
        );
    }
}
