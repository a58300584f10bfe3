//! # Rectification Configuration
//!
//! This module provides a centralized configuration system for the
//! rectification pipeline. Every heuristic constant the stages rely on
//! (kernel sizes, Canny thresholds, the brightness factor, the tilt policy
//! breakpoints) is a named, overridable value here; the defaults reproduce
//! the reference numeric behavior exactly.

use crate::errors::{RectifyError, RectifyResult};
use serde::{Deserialize, Serialize};
use std::env;

// Default tunables for the pipeline stages.
pub const DEFAULT_BLUR_KERNEL: u32 = 15;
pub const DEFAULT_BOUNDARY_KERNEL: u32 = 11;
pub const DEFAULT_BOUNDARY_PASSES: u32 = 2;
pub const DEFAULT_CANNY_LOW: f32 = 75.0;
pub const DEFAULT_CANNY_HIGH: f32 = 200.0;
pub const DEFAULT_CLOSE_KERNEL: u32 = 3;
pub const DEFAULT_CLOSE_PASSES: u32 = 2;
pub const DEFAULT_SMALL_ANGLE_MAX: f32 = 5.0;
pub const DEFAULT_LARGE_ANGLE_MIN: f32 = 80.0;
pub const DEFAULT_ROI_MARGIN: f32 = 0.05;
pub const DEFAULT_BRIGHTNESS_FACTOR: f32 = 0.98;
pub const DEFAULT_ENHANCE_BLUR_KERNEL: u32 = 1;

/// Edge map construction settings (grayscale, blur, dilate, Canny).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeConfig {
    /// Gaussian smoothing kernel size in pixels (odd, sigma derived from it)
    pub blur_kernel: u32,
    /// Rectangular structuring element size used to thicken boundary edges
    pub boundary_kernel: u32,
    /// Number of dilation passes before edge detection
    pub boundary_passes: u32,
    /// Canny hysteresis low threshold
    pub canny_low: f32,
    /// Canny hysteresis high threshold
    pub canny_high: f32,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            blur_kernel: DEFAULT_BLUR_KERNEL,
            boundary_kernel: DEFAULT_BOUNDARY_KERNEL,
            boundary_passes: DEFAULT_BOUNDARY_PASSES,
            canny_low: DEFAULT_CANNY_LOW,
            canny_high: DEFAULT_CANNY_HIGH,
        }
    }
}

impl EdgeConfig {
    /// Validate edge map settings
    pub fn validate(&self) -> RectifyResult<()> {
        if self.blur_kernel == 0 || self.blur_kernel % 2 == 0 {
            return Err(RectifyError::Config(format!(
                "blur_kernel must be a positive odd number, got {}",
                self.blur_kernel
            )));
        }
        if self.boundary_kernel == 0 || self.boundary_kernel % 2 == 0 {
            return Err(RectifyError::Config(format!(
                "boundary_kernel must be a positive odd number, got {}",
                self.boundary_kernel
            )));
        }
        if self.boundary_passes == 0 {
            return Err(RectifyError::Config(
                "boundary_passes must be greater than 0".to_string(),
            ));
        }
        if self.canny_low <= 0.0 {
            return Err(RectifyError::Config(format!(
                "canny_low must be positive, got {}",
                self.canny_low
            )));
        }
        if self.canny_high <= self.canny_low {
            return Err(RectifyError::Config(format!(
                "canny_high ({}) must be greater than canny_low ({})",
                self.canny_high, self.canny_low
            )));
        }
        Ok(())
    }
}

/// Edge map binarization settings (mean threshold plus gap closing).
///
/// The threshold itself is not configurable: it is always recomputed as the
/// arithmetic mean of the edge map being binarized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinarizeConfig {
    /// Rectangular structuring element size used to close boundary gaps
    pub close_kernel: u32,
    /// Number of dilation passes applied to the thresholded mask
    pub close_passes: u32,
}

impl Default for BinarizeConfig {
    fn default() -> Self {
        Self {
            close_kernel: DEFAULT_CLOSE_KERNEL,
            close_passes: DEFAULT_CLOSE_PASSES,
        }
    }
}

impl BinarizeConfig {
    /// Validate binarization settings
    pub fn validate(&self) -> RectifyResult<()> {
        if self.close_kernel == 0 || self.close_kernel % 2 == 0 {
            return Err(RectifyError::Config(format!(
                "close_kernel must be a positive odd number, got {}",
                self.close_kernel
            )));
        }
        if self.close_passes == 0 {
            return Err(RectifyError::Config(
                "close_passes must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Tilt correction policy breakpoints.
///
/// Uniform angles in `[small_angle_max, large_angle_min)` are left uncorrected;
/// angles below `small_angle_max` are rotated by themselves; angles at or above
/// `large_angle_min` are rotated by `270 + angle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiltConfig {
    /// Upper bound (exclusive) of the "small tilt, rotate by itself" band
    pub small_angle_max: f32,
    /// Lower bound (inclusive) of the "near quarter-turn" band
    pub large_angle_min: f32,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            small_angle_max: DEFAULT_SMALL_ANGLE_MAX,
            large_angle_min: DEFAULT_LARGE_ANGLE_MIN,
        }
    }
}

impl TiltConfig {
    /// Validate tilt policy breakpoints
    pub fn validate(&self) -> RectifyResult<()> {
        if !(0.0..90.0).contains(&self.small_angle_max) {
            return Err(RectifyError::Config(format!(
                "small_angle_max must be in [0, 90), got {}",
                self.small_angle_max
            )));
        }
        if !(0.0..90.0).contains(&self.large_angle_min) {
            return Err(RectifyError::Config(format!(
                "large_angle_min must be in [0, 90), got {}",
                self.large_angle_min
            )));
        }
        if self.small_angle_max >= self.large_angle_min {
            return Err(RectifyError::Config(format!(
                "small_angle_max ({}) must be less than large_angle_min ({})",
                self.small_angle_max, self.large_angle_min
            )));
        }
        Ok(())
    }
}

/// Text enhancement settings (central-region threshold and final smoothing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhanceConfig {
    /// Fraction of width/height excluded on each side when sampling brightness
    pub roi_margin: f32,
    /// Factor applied to the region mean to obtain the binarization threshold
    pub brightness_factor: f32,
    /// Smoothing kernel applied before thresholding (1 means no smoothing)
    pub blur_kernel: u32,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            roi_margin: DEFAULT_ROI_MARGIN,
            brightness_factor: DEFAULT_BRIGHTNESS_FACTOR,
            blur_kernel: DEFAULT_ENHANCE_BLUR_KERNEL,
        }
    }
}

impl EnhanceConfig {
    /// Validate enhancement settings
    pub fn validate(&self) -> RectifyResult<()> {
        if !(0.0..0.5).contains(&self.roi_margin) {
            return Err(RectifyError::Config(format!(
                "roi_margin must be in [0, 0.5), got {}",
                self.roi_margin
            )));
        }
        if self.brightness_factor <= 0.0 || self.brightness_factor > 1.0 {
            return Err(RectifyError::Config(format!(
                "brightness_factor must be in (0, 1], got {}",
                self.brightness_factor
            )));
        }
        if self.blur_kernel == 0 || self.blur_kernel % 2 == 0 {
            return Err(RectifyError::Config(format!(
                "blur_kernel must be a positive odd number, got {}",
                self.blur_kernel
            )));
        }
        Ok(())
    }
}

/// Unified pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RectifyConfig {
    /// Edge map construction settings
    pub edge: EdgeConfig,
    /// Region binarization settings
    pub binarize: BinarizeConfig,
    /// Tilt correction policy
    pub tilt: TiltConfig,
    /// Text enhancement settings
    pub enhance: EnhanceConfig,
}

impl RectifyConfig {
    /// Load configuration from `RECTIFY_*` environment variables, falling back
    /// to the defaults for anything unset.
    pub fn from_env() -> RectifyResult<Self> {
        let mut config = Self::default();

        config.edge.blur_kernel = parse_env_var("RECTIFY_BLUR_KERNEL", config.edge.blur_kernel)?;
        config.edge.boundary_kernel =
            parse_env_var("RECTIFY_BOUNDARY_KERNEL", config.edge.boundary_kernel)?;
        config.edge.boundary_passes =
            parse_env_var("RECTIFY_BOUNDARY_PASSES", config.edge.boundary_passes)?;
        config.edge.canny_low = parse_env_var("RECTIFY_CANNY_LOW", config.edge.canny_low)?;
        config.edge.canny_high = parse_env_var("RECTIFY_CANNY_HIGH", config.edge.canny_high)?;

        config.binarize.close_kernel =
            parse_env_var("RECTIFY_CLOSE_KERNEL", config.binarize.close_kernel)?;
        config.binarize.close_passes =
            parse_env_var("RECTIFY_CLOSE_PASSES", config.binarize.close_passes)?;

        config.tilt.small_angle_max =
            parse_env_var("RECTIFY_SMALL_ANGLE_MAX", config.tilt.small_angle_max)?;
        config.tilt.large_angle_min =
            parse_env_var("RECTIFY_LARGE_ANGLE_MIN", config.tilt.large_angle_min)?;

        config.enhance.roi_margin = parse_env_var("RECTIFY_ROI_MARGIN", config.enhance.roi_margin)?;
        config.enhance.brightness_factor = parse_env_var(
            "RECTIFY_BRIGHTNESS_FACTOR",
            config.enhance.brightness_factor,
        )?;
        config.enhance.blur_kernel =
            parse_env_var("RECTIFY_ENHANCE_BLUR_KERNEL", config.enhance.blur_kernel)?;

        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> RectifyResult<()> {
        self.edge.validate()?;
        self.binarize.validate()?;
        self.tilt.validate()?;
        self.enhance.validate()?;
        Ok(())
    }

    /// Get a summary of the current configuration for logging
    pub fn summary(&self) -> String {
        format!(
            "Configuration: blur_kernel={}, boundary_kernel={}x{}, canny={}..{}, close_kernel={}x{}, tilt_band=[{}, {}), brightness_factor={}",
            self.edge.blur_kernel,
            self.edge.boundary_kernel,
            self.edge.boundary_passes,
            self.edge.canny_low,
            self.edge.canny_high,
            self.binarize.close_kernel,
            self.binarize.close_passes,
            self.tilt.small_angle_max,
            self.tilt.large_angle_min,
            self.enhance.brightness_factor
        )
    }
}

/// Read an environment variable and parse it, keeping `fallback` when unset.
fn parse_env_var<T: std::str::FromStr>(name: &str, fallback: T) -> RectifyResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| RectifyError::Config(format!("{} must be a valid number", name))),
        Err(_) => Ok(fallback),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RectifyConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_matches_reference_constants() {
        let config = RectifyConfig::default();
        assert_eq!(config.edge.blur_kernel, 15);
        assert_eq!(config.edge.boundary_kernel, 11);
        assert_eq!(config.edge.boundary_passes, 2);
        assert_eq!(config.edge.canny_low, 75.0);
        assert_eq!(config.edge.canny_high, 200.0);
        assert_eq!(config.binarize.close_kernel, 3);
        assert_eq!(config.binarize.close_passes, 2);
        assert_eq!(config.tilt.small_angle_max, 5.0);
        assert_eq!(config.tilt.large_angle_min, 80.0);
        assert_eq!(config.enhance.roi_margin, 0.05);
        assert_eq!(config.enhance.brightness_factor, 0.98);
        assert_eq!(config.enhance.blur_kernel, 1);
    }

    #[test]
    fn test_edge_config_validation() {
        let mut config = EdgeConfig::default();
        assert!(config.validate().is_ok());

        // Invalid: even kernel
        config.blur_kernel = 14;
        assert!(config.validate().is_err());
        config.blur_kernel = 15;

        // Invalid: zero kernel
        config.boundary_kernel = 0;
        assert!(config.validate().is_err());
        config.boundary_kernel = 11;

        // Invalid: zero passes
        config.boundary_passes = 0;
        assert!(config.validate().is_err());
        config.boundary_passes = 2;

        // Invalid: inverted Canny thresholds
        config.canny_high = 50.0;
        assert!(config.validate().is_err());
        config.canny_high = 200.0;

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_binarize_config_validation() {
        let mut config = BinarizeConfig::default();
        assert!(config.validate().is_ok());

        config.close_kernel = 4;
        assert!(config.validate().is_err());
        config.close_kernel = 3;

        config.close_passes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tilt_config_validation() {
        let mut config = TiltConfig::default();
        assert!(config.validate().is_ok());

        // Invalid: band inverted
        config.small_angle_max = 85.0;
        assert!(config.validate().is_err());
        config.small_angle_max = 5.0;

        // Invalid: out of the [0, 90) domain
        config.large_angle_min = 95.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_enhance_config_validation() {
        let mut config = EnhanceConfig::default();
        assert!(config.validate().is_ok());

        config.roi_margin = 0.6;
        assert!(config.validate().is_err());
        config.roi_margin = 0.05;

        config.brightness_factor = 0.0;
        assert!(config.validate().is_err());
        config.brightness_factor = 1.5;
        assert!(config.validate().is_err());
        config.brightness_factor = 0.98;

        config.blur_kernel = 2;
        assert!(config.validate().is_err());
    }
}
