//! Watcher and file configuration.
//!
//! All knobs ship with fixed defaults; a TOML file can override any
//! section.

use crate::detection::{ConfigError, DetectionConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Alarm state machine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmConfig {
    /// Minimum interval between successive alarm announcements, in
    /// seconds.
    pub cooldown_secs: f64,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self { cooldown_secs: 2.0 }
    }
}

impl AlarmConfig {
    /// Returns the cooldown as a [`Duration`].
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs_f64(self.cooldown_secs.max(0.0))
    }
}

/// Run-loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Backoff before retrying after a read that yielded no frame, in
    /// seconds.
    pub read_backoff_secs: f64,
    /// Metrics server port (0 to disable). Only used with the
    /// `metrics` feature.
    pub metrics_port: u16,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            read_backoff_secs: 0.5,
            metrics_port: 9090,
        }
    }
}

impl WatchConfig {
    /// Returns the read backoff as a [`Duration`].
    pub fn read_backoff(&self) -> Duration {
        Duration::from_secs_f64(self.read_backoff_secs.max(0.0))
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Motion detection pipeline settings.
    #[serde(default)]
    pub detection: DetectionConfig,
    /// Alarm state machine settings.
    #[serde(default)]
    pub alarm: AlarmConfig,
    /// Run-loop settings.
    #[serde(default)]
    pub watch: WatchConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: FileConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.detection.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cooldown() {
        let config = AlarmConfig::default();
        assert_eq!(config.cooldown(), Duration::from_secs(2));
    }

    #[test]
    fn test_default_backoff() {
        let config = WatchConfig::default();
        assert_eq!(config.read_backoff(), Duration::from_millis(500));
    }

    #[test]
    fn test_negative_cooldown_clamped() {
        let config = AlarmConfig {
            cooldown_secs: -1.0,
        };
        assert_eq!(config.cooldown(), Duration::ZERO);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: FileConfig = toml::from_str(
            r#"
            [alarm]
            cooldown_secs = 5.0
            "#,
        )
        .unwrap();

        assert_eq!(config.alarm.cooldown(), Duration::from_secs(5));
        assert_eq!(config.detection.min_area, 800);
        assert_eq!(config.watch.metrics_port, 9090);
    }

    #[test]
    fn test_detection_section_parses() {
        let config: FileConfig = toml::from_str(
            r#"
            [detection]
            width = 320
            height = 180
            history = 100
            var_threshold = 16.0
            detect_shadows = false
            blur_kernel = 3
            mask_threshold = 180
            dilate_iterations = 1
            min_area = 400
            "#,
        )
        .unwrap();

        assert_eq!(config.detection.width, 320);
        assert!(!config.detection.detect_shadows);
        assert!(config.detection.validate().is_ok());
    }
}
