//! Configuration module.
//!
//! Handles loading, validating, and merging `camgal.toml`. User values are
//! merged on top of the stock defaults, so a config file only needs the keys
//! it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [library]
//! root = "library"          # Photo library directory
//! recent_window = 20        # Newest photos considered by "most recent"
//!
//! [derivation]
//! work_dir = ".camgal-work" # Where derived variants are written
//! format = "jpeg"           # "jpeg" or "png"
//!
//! [viewport]
//! width = 390.0             # Preview area, in points
//! height = 844.0
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::OutputFormat;
use crate::view::Viewport;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "camgal.toml";

/// Application configuration loaded from `camgal.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Photo library settings.
    pub library: LibraryConfig,
    /// Variant derivation settings.
    pub derivation: DerivationConfig,
    /// Preview area used for zoom bounds.
    pub viewport: ViewportConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.library.recent_window == 0 {
            return Err(ConfigError::Validation(
                "library.recent_window must be at least 1".into(),
            ));
        }
        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            return Err(ConfigError::Validation(
                "viewport.width and viewport.height must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LibraryConfig {
    pub root: PathBuf,
    pub recent_window: usize,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("library"),
            recent_window: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DerivationConfig {
    /// Directory receiving transform outputs. Files are removed when their
    /// variant set is released.
    pub work_dir: PathBuf,
    pub format: OutputFormat,
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from(".camgal-work"),
            format: OutputFormat::Jpeg,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 390.0,
            height: 844.0,
        }
    }
}

impl From<ViewportConfig> for Viewport {
    fn from(v: ViewportConfig) -> Self {
        Viewport {
            width: v.width,
            height: v.height,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(AppConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge user TOML text onto the stock defaults, then deserialize and validate.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let merged = merge_toml(stock_defaults_value()?, overlay);
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`.
///
/// A missing file is not an error when `required` is false: stock defaults
/// are returned instead.
pub fn load_config(path: &Path, required: bool) -> Result<AppConfig, ConfigError> {
    if !required && !path.exists() {
        return Ok(AppConfig::default());
    }
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Returns a fully-commented stock `camgal.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# camgal Configuration
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Photo library
# ---------------------------------------------------------------------------
[library]
# Directory holding captured photos. Created on first capture.
root = "library"

# How many of the newest photos are considered when picking the most recent.
recent_window = 20

# ---------------------------------------------------------------------------
# Variant derivation
# ---------------------------------------------------------------------------
[derivation]
# Derived variants are written here and deleted when no longer shown.
work_dir = ".camgal-work"

# Encoded format of variants: "jpeg" or "png" (png ignores compression).
format = "jpeg"

# ---------------------------------------------------------------------------
# Preview viewport (points), used to compute the fit-to-screen zoom
# ---------------------------------------------------------------------------
[viewport]
width = 390.0
height = 844.0
"##
}
