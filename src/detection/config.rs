//! Motion detection configuration.
//!
//! All settings are fixed for the lifetime of a detector. The
//! background model is calibrated against these values, so changing
//! them mid-stream would invalidate the learned scene.

use serde::{Deserialize, Serialize};

/// Configuration for the motion detection pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Analysis width in pixels; frames are downscaled to this before
    /// classification.
    pub width: u32,
    /// Analysis height in pixels.
    pub height: u32,
    /// Background model history window in frames.
    pub history: u32,
    /// Squared-distance threshold for the foreground test, in units of
    /// per-pixel variance.
    pub var_threshold: f64,
    /// Mark darkened-background pixels as shadow instead of foreground.
    pub detect_shadows: bool,
    /// Side length of the smoothing kernel applied to the foreground
    /// mask (odd).
    pub blur_kernel: u32,
    /// Binarization threshold applied after smoothing. Shadow pixels
    /// sit below this, so they never contribute to regions.
    pub mask_threshold: u8,
    /// Number of 3x3 dilation passes applied to the binarized mask.
    pub dilate_iterations: u32,
    /// Minimum connected-region pixel area that counts as motion, in
    /// resized-pixel units.
    pub min_area: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            history: 200,
            var_threshold: 25.0,
            detect_shadows: true,
            blur_kernel: 5,
            mask_threshold: 200,
            dilate_iterations: 2,
            min_area: 800,
        }
    }
}

impl DetectionConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.history == 0 {
            return Err(ConfigError::InvalidHistory);
        }
        if self.var_threshold <= 0.0 {
            return Err(ConfigError::InvalidVarThreshold);
        }
        if self.blur_kernel == 0 || self.blur_kernel % 2 == 0 {
            return Err(ConfigError::InvalidBlurKernel);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid analysis dimensions")]
    InvalidDimensions,
    #[error("background history must be nonzero")]
    InvalidHistory,
    #[error("variance threshold must be positive")]
    InvalidVarThreshold,
    #[error("blur kernel must be odd and nonzero")]
    InvalidBlurKernel,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = DetectionConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_dimensions_invalid() {
        let mut config = DetectionConfig::default();
        config.height = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions)
        ));
    }

    #[test]
    fn test_even_blur_kernel_invalid() {
        let mut config = DetectionConfig::default();
        config.blur_kernel = 4;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBlurKernel)
        ));
    }
}
