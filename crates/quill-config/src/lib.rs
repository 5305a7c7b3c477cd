#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! File and environment backed configuration for Quill.
//!
//! Layout: `model.rs` (typed config models), `loader.rs` (file loading and
//! environment overrides), `defaults.rs` (flag names and environment keys).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;

pub use defaults::{
    ENV_CONFIG_PATH, ENV_FEATURES, ENV_LOG_FORMAT, ENV_LOG_LEVEL, FLAG_PRESS_THIS,
    FLAG_SITE_SETTINGS_CATEGORIES,
};
pub use error::{ConfigError, ConfigResult};
pub use loader::{
    apply_env_overrides, load_from_env, load_from_path, load_with, parse_feature_overrides,
};
pub use model::{FeatureFlags, LoggingSettings, QuillConfig};
