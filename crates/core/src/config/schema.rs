//! Configuration schema definitions
//!
//! Every section is optional in the file; missing keys take the defaults
//! the tools use when run without a config.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub crop: CropConfig,

    #[serde(default)]
    pub resize: ResizeConfig,

    #[serde(default)]
    pub compress: CompressConfig,

    #[serde(default)]
    pub grayscale: GrayscaleConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigSchema {
    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        let crop = &self.crop;
        if !(crop.min_size.is_finite() && crop.min_size > 0.0) {
            return Err(Error::config_invalid(format!(
                "crop.min_size must be positive, got {}",
                crop.min_size
            )));
        }
        if !(crop.initial_fraction > 0.0 && crop.initial_fraction <= 1.0) {
            return Err(Error::config_invalid(format!(
                "crop.initial_fraction must be in (0, 1], got {}",
                crop.initial_fraction
            )));
        }
        if crop.max_output_pixels == 0 {
            return Err(Error::config_invalid("crop.max_output_pixels must be non-zero"));
        }
        check_quality("resize.quality", self.resize.quality, 1)?;
        check_quality("compress.quality", self.compress.quality, 10)?;
        check_quality("grayscale.quality", self.grayscale.quality, 1)?;
        Ok(())
    }
}

fn check_quality(key: &str, value: u8, min: u8) -> Result<()> {
    if value < min || value > 100 {
        return Err(Error::config_invalid(format!(
            "{} must be between {} and 100, got {}",
            key, min, value
        )));
    }
    Ok(())
}

/// Export format named in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatSetting {
    #[default]
    Lossless,
    Lossy,
}

/// Crop tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropConfig {
    /// Minimum crop edge, in display units
    #[serde(default = "default_min_size")]
    pub min_size: f64,

    /// Share of the shorter display edge used for the initial square
    #[serde(default = "default_initial_fraction")]
    pub initial_fraction: f64,

    /// Largest output the crop export will allocate, in pixels
    #[serde(default = "default_max_output_pixels")]
    pub max_output_pixels: u64,

    /// Default export format
    #[serde(default)]
    pub format: OutputFormatSetting,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            min_size: default_min_size(),
            initial_fraction: default_initial_fraction(),
            max_output_pixels: default_max_output_pixels(),
            format: OutputFormatSetting::default(),
        }
    }
}

fn default_min_size() -> f64 {
    50.0
}

fn default_initial_fraction() -> f64 {
    0.6
}

fn default_max_output_pixels() -> u64 {
    16_384 * 16_384
}

/// Resize tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResizeConfig {
    #[serde(default = "default_resize_width")]
    pub width: u32,

    #[serde(default = "default_resize_height")]
    pub height: u32,

    /// JPEG quality for resized output
    #[serde(default = "default_export_quality")]
    pub quality: u8,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            width: default_resize_width(),
            height: default_resize_height(),
            quality: default_export_quality(),
        }
    }
}

fn default_resize_width() -> u32 {
    800
}

fn default_resize_height() -> u32 {
    600
}

fn default_export_quality() -> u8 {
    90
}

/// Compression tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressConfig {
    #[serde(default = "default_compress_quality")]
    pub quality: u8,
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            quality: default_compress_quality(),
        }
    }
}

fn default_compress_quality() -> u8 {
    80
}

/// Black-and-white conversion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrayscaleConfig {
    /// JPEG quality for converted output
    #[serde(default = "default_export_quality")]
    pub quality: u8,
}

impl Default for GrayscaleConfig {
    fn default() -> Self {
        Self {
            quality: default_export_quality(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Include the event target in log lines
    #[serde(default)]
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            show_target: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let schema: ConfigSchema = toml::from_str("").unwrap();
        assert_eq!(schema.crop.initial_fraction, 0.6);
        assert_eq!(schema.resize.height, 600);
        assert_eq!(schema.compress.quality, 80);
        assert_eq!(schema.logging.level, "info");
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_validate_quality_ranges() {
        let mut schema = ConfigSchema::default();
        schema.compress.quality = 5;
        assert!(schema.validate().is_err());

        schema.compress.quality = 10;
        schema.resize.quality = 101;
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_grayscale_quality_is_independent() {
        let schema: ConfigSchema = toml::from_str("[resize]\nquality = 40\n").unwrap();
        assert_eq!(schema.resize.quality, 40);
        assert_eq!(schema.grayscale.quality, 90);

        let schema: ConfigSchema = toml::from_str("[grayscale]\nquality = 0\n").unwrap();
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_validate_min_size() {
        let mut schema = ConfigSchema::default();
        schema.crop.min_size = 0.0;
        assert!(schema.validate().is_err());
    }
}
