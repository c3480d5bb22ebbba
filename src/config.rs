//! Imaging configuration.
//!
//! Handles loading, validating and merging an `imaging.toml` file. A base
//! config (the stock defaults, or one supplied by the caller) is the bottom
//! layer; the file overrides only the keys it sets.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [canvas]
//! fill_color = [0, 0, 0]    # RGB behind letterbox margins
//!
//! [encoding]
//! jpeg_quality = 80         # 1-100, higher is better
//! png_compression = 0       # 0-9, higher is smaller
//!
//! [limits]
//! memory = 268435456        # Max decoded bytes per image (0 = no limit)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{FillColor, PngCompression, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE: &str = "imaging.toml";

/// Default decoded-image budget: 256 MiB.
pub const DEFAULT_MEMORY_LIMIT: u64 = 256 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Imaging configuration loaded from `imaging.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagingConfig {
    /// Canvas settings used when resizing.
    pub canvas: CanvasConfig,
    /// Encoder settings used when saving.
    pub encoding: EncodingConfig,
    /// Resource limits checked when opening.
    pub limits: LimitsConfig,
}

impl ImagingConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.encoding.jpeg_quality) {
            return Err(ConfigError::Validation(
                "encoding.jpeg_quality must be 1-100".into(),
            ));
        }
        if self.encoding.png_compression > 9 {
            return Err(ConfigError::Validation(
                "encoding.png_compression must be 0-9".into(),
            ));
        }
        Ok(())
    }

    pub fn fill_color(&self) -> FillColor {
        FillColor(self.canvas.fill_color)
    }

    pub fn jpeg_quality(&self) -> Quality {
        Quality::new(self.encoding.jpeg_quality)
    }

    pub fn png_compression(&self) -> PngCompression {
        PngCompression::new(self.encoding.png_compression)
    }

    /// The memory budget in bytes, or `None` when disabled.
    pub fn memory_limit(&self) -> Option<u64> {
        match self.limits.memory {
            0 => None,
            limit => Some(limit),
        }
    }
}

/// Canvas settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    /// RGB fill for canvas regions the source does not cover.
    pub fill_color: [u8; 3],
}

/// Encoder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    /// JPEG quality (1 = worst, 100 = best).
    pub jpeg_quality: u32,
    /// PNG compression level (0 = none, 9 = smallest).
    pub png_compression: u32,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 80,
            png_compression: 0,
        }
    }
}

/// Resource limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Largest decoded image, in bytes. `0` disables the check.
    pub memory: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            memory: DEFAULT_MEMORY_LIMIT,
        }
    }
}

// =============================================================================
// Config loading and validation
// =============================================================================

/// Load `imaging.toml` from `dir` on top of the stock defaults.
///
/// A missing file yields the defaults. Unknown keys and out-of-range values
/// are errors.
pub fn load_config(dir: &Path) -> Result<ImagingConfig, ConfigError> {
    load_config_over(&ImagingConfig::default(), dir)
}

/// Load `imaging.toml` from `dir` on top of `base`.
///
/// Keys set in the file replace the matching keys of `base`; every other key
/// keeps the caller's value, not the stock default. A missing file yields
/// `base` unchanged (after validation).
pub fn load_config_over(base: &ImagingConfig, dir: &Path) -> Result<ImagingConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        base.validate()?;
        return Ok(base.clone());
    }

    let file: toml::Value = toml::from_str(&fs::read_to_string(&path)?)?;
    let config: ImagingConfig = overlay_toml(toml::Value::try_from(base)?, file).try_into()?;
    config.validate()?;
    Ok(config)
}

/// Overlay `file` on `base`: tables merge key by key, any other value in
/// `file` replaces the one in `base`.
fn overlay_toml(base: toml::Value, file: toml::Value) -> toml::Value {
    match (base, file) {
        (toml::Value::Table(mut table), toml::Value::Table(overrides)) => {
            for (key, value) in overrides {
                let merged = match table.remove(&key) {
                    Some(current) => overlay_toml(current, value),
                    None => value,
                };
                table.insert(key, merged);
            }
            toml::Value::Table(table)
        }
        (_, file) => file,
    }
}

/// Returns a fully-commented stock `imaging.toml`.
pub fn stock_config_toml() -> &'static str {
    r##"# Imaging Configuration
# =====================
# All options are optional. Values shown are the defaults.

[canvas]
# RGB color painted behind letterbox margins when a resize pads instead of
# cropping. Ignored while alpha blending is on (margins stay transparent).
fill_color = [0, 0, 0]

[encoding]
# JPEG quality, 1 (smallest) to 100 (best).
jpeg_quality = 80
# PNG compression level, 0 (fastest) to 9 (smallest).
png_compression = 0

[limits]
# Largest decoded image in bytes (width * height * channels * bits / 8).
# Opening a bigger image fails. 0 disables the check.
memory = 268435456
"##
}
