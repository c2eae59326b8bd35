//! Device configuration
//!
//! All parameters that the firmware fixes at build time (sample rate, gain,
//! sampling duration, duty-cycle period, output file, debug flag) live in a
//! single `DeviceConfig` that is loaded once at startup and validated before
//! the first duty cycle. Two presets mirror the two shipped firmware builds:
//! the classification logger and the raw audio logger.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::storage::is_short_name;

/// Largest window the device will allocate (about 14 minutes at 20 kHz)
pub const MAX_SAMPLES_PER_WINDOW: usize = 1 << 24;

/// Complete device configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub sampling: SamplingConfig,
    pub schedule: ScheduleConfig,
    pub storage: StorageConfig,
    pub pipeline: PipelineConfig,
    /// Enables diagnostic output and wipes the log file on every boot
    pub debug: bool,
}

/// Microphone acquisition parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Sample rate in Hz
    pub sample_rate_hz: u32,
    /// Channel count (mono only)
    pub channels: u16,
    /// Microphone gain in device units, recorded alongside raw captures
    pub gain: u16,
    /// Length of one sampling window in milliseconds
    pub duration_ms: u64,
}

/// Duty-cycle timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// A new sampling window starts every `cycle_period_ms`
    pub cycle_period_ms: u64,
}

/// Removable storage parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Host directory standing in for the card
    pub root: PathBuf,
    /// Chip-select line of the card slot
    pub chip_select: u8,
    /// Log file path on the card, 8.3 name
    pub file_name: String,
}

/// What the duty cycle derives from each window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineMode {
    /// Spectral magnitudes + linear classifier, CSV prediction log
    Classify,
    /// Summary statistics only, CSV log
    Summary,
    /// Raw window samples, binary log
    Capture,
}

/// Feature pipeline parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub mode: PipelineMode,
    /// Number of leading window samples fed to the FFT
    #[serde(default = "default_fft_window_len")]
    pub fft_window_len: usize,
    /// Reproduce the 10000/0 min/max start bounds of older device logs
    #[serde(default)]
    pub legacy_min_max_sentinels: bool,
}

fn default_fft_window_len() -> usize {
    16_384
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::classification_logger()
    }
}

impl DeviceConfig {
    /// Classification build: 1 s at 20 kHz every minute, predictions to
    /// `/predict.csv`, debug on.
    pub fn classification_logger() -> Self {
        Self {
            sampling: SamplingConfig {
                sample_rate_hz: 20_000,
                channels: 1,
                gain: 30,
                duration_ms: 1_000,
            },
            schedule: ScheduleConfig {
                cycle_period_ms: 60 * 1_000,
            },
            storage: StorageConfig {
                root: PathBuf::from("sdcard"),
                chip_select: 4,
                file_name: "/predict.csv".to_string(),
            },
            pipeline: PipelineConfig {
                mode: PipelineMode::Classify,
                fft_window_len: default_fft_window_len(),
                legacy_min_max_sentinels: false,
            },
            debug: true,
        }
    }

    /// Raw capture build: 3 s at 20 kHz every minute to `/audiodat.bin`,
    /// debug off.
    pub fn audio_logger() -> Self {
        Self {
            sampling: SamplingConfig {
                duration_ms: 3_000,
                ..Self::classification_logger().sampling
            },
            storage: StorageConfig {
                file_name: "/audiodat.bin".to_string(),
                ..Self::classification_logger().storage
            },
            pipeline: PipelineConfig {
                mode: PipelineMode::Capture,
                fft_window_len: default_fft_window_len(),
                legacy_min_max_sentinels: false,
            },
            debug: false,
            ..Self::classification_logger()
        }
    }

    /// Number of samples acquired per duty cycle
    ///
    /// Saturates on overflow; `validate` rejects such configurations.
    pub fn samples_per_window(&self) -> usize {
        self.checked_samples_per_window().unwrap_or(usize::MAX)
    }

    fn checked_samples_per_window(&self) -> Option<usize> {
        (self.sampling.sample_rate_hz as u64)
            .checked_mul(self.sampling.duration_ms)
            .and_then(|product| usize::try_from(product / 1_000).ok())
    }

    /// Check every invariant the duty cycle relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling.sample_rate_hz == 0 {
            return Err(invalid("sampling.sample_rate_hz", "must be greater than 0"));
        }
        if self.sampling.duration_ms == 0 {
            return Err(invalid("sampling.duration_ms", "must be greater than 0"));
        }
        match self.checked_samples_per_window() {
            Some(samples) if samples <= MAX_SAMPLES_PER_WINDOW => {}
            Some(samples) => {
                return Err(invalid(
                    "sampling",
                    &format!(
                        "{} samples per window exceeds the limit of {}",
                        samples, MAX_SAMPLES_PER_WINDOW
                    ),
                ))
            }
            None => {
                return Err(invalid(
                    "sampling",
                    "sample_rate_hz × duration_ms overflows",
                ))
            }
        }
        if self.sampling.channels != 1 {
            return Err(ConfigError::UnsupportedChannels {
                channels: self.sampling.channels,
            });
        }
        if self.samples_per_window() < 2 {
            return Err(invalid(
                "sampling",
                "a window must hold at least 2 samples",
            ));
        }
        if self.schedule.cycle_period_ms <= self.sampling.duration_ms {
            return Err(ConfigError::ScheduleOverrun {
                duration_ms: self.sampling.duration_ms,
                cycle_period_ms: self.schedule.cycle_period_ms,
            });
        }
        if !is_short_name(&self.storage.file_name) {
            return Err(ConfigError::InvalidFileName {
                name: self.storage.file_name.clone(),
            });
        }
        if self.pipeline.mode == PipelineMode::Classify {
            if self.pipeline.fft_window_len == 0 {
                return Err(invalid("pipeline.fft_window_len", "must be greater than 0"));
            }
            if self.pipeline.fft_window_len > self.samples_per_window() {
                return Err(invalid(
                    "pipeline.fft_window_len",
                    &format!(
                        "{} exceeds the {} samples of one window",
                        self.pipeline.fft_window_len,
                        self.samples_per_window()
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Load configuration from a JSON file
    ///
    /// # Returns
    /// * `Ok(DeviceConfig)` - Parsed configuration (not yet validated)
    /// * `Err(ConfigError)` - File unreadable or JSON invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(&path).map_err(|err| ConfigError::Unreadable {
            path: path.as_ref().display().to_string(),
            reason: err.to_string(),
        })?;
        let config = serde_json::from_str(&contents)?;
        log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
        Ok(config)
    }

    /// Load configuration, falling back to the classification preset
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load_from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("[Config] {}. Using defaults.", err);
                Self::default()
            }
        }
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_default_config() {
        let config = DeviceConfig::default();
        assert_eq!(config.sampling.sample_rate_hz, 20_000);
        assert_eq!(config.sampling.gain, 30);
        assert_eq!(config.schedule.cycle_period_ms, 60_000);
        assert_eq!(config.storage.file_name, "/predict.csv");
        assert_eq!(config.storage.chip_select, 4);
        assert_eq!(config.samples_per_window(), 20_000);
        assert!(config.debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_audio_logger_preset() {
        let config = DeviceConfig::audio_logger();
        assert_eq!(config.sampling.duration_ms, 3_000);
        assert_eq!(config.samples_per_window(), 60_000);
        assert_eq!(config.storage.file_name, "/audiodat.bin");
        assert_eq!(config.pipeline.mode, PipelineMode::Capture);
        assert!(!config.debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_stereo() {
        let mut config = DeviceConfig::default();
        config.sampling.channels = 2;
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnsupportedChannels { channels: 2 })
        );
    }

    #[test]
    fn test_rejects_long_file_name() {
        let mut config = DeviceConfig::default();
        config.storage.file_name = "/predictions.csv".to_string();
        assert_eq!(config.validate().unwrap_err().code(), 1003);
    }

    #[test]
    fn test_rejects_window_longer_than_period() {
        let mut config = DeviceConfig::default();
        config.schedule.cycle_period_ms = 1_000;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ScheduleOverrun { .. })
        ));
    }

    #[test]
    fn test_rejects_fft_window_longer_than_samples() {
        let mut config = DeviceConfig::default();
        config.sampling.duration_ms = 500;
        // 10000 samples < 16384
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));

        config.pipeline.mode = PipelineMode::Summary;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_single_sample_window() {
        let mut config = DeviceConfig::default();
        config.sampling.sample_rate_hz = 1_000;
        config.sampling.duration_ms = 1;
        config.pipeline.mode = PipelineMode::Summary;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_overflowing_window() {
        let mut config = DeviceConfig::default();
        config.sampling.duration_ms = u64::MAX / 2;
        config.schedule.cycle_period_ms = u64::MAX;

        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "sampling"),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
        assert_eq!(config.samples_per_window(), usize::MAX);
    }

    #[test]
    fn test_rejects_oversized_window() {
        let mut config = DeviceConfig::default();
        config.pipeline.mode = PipelineMode::Summary;
        // 20 kHz for one hour
        config.sampling.duration_ms = 3_600_000;
        config.schedule.cycle_period_ms = 7_200_000;

        match config.validate() {
            Err(ConfigError::InvalidValue { field, reason }) => {
                assert_eq!(field, "sampling");
                assert!(reason.contains("exceeds"));
            }
            other => panic!("Expected InvalidValue, got {:?}", other),
        }

        config.sampling.duration_ms = 600_000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = DeviceConfig::audio_logger();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: DeviceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_pipeline_defaults_when_omitted() {
        let json = r#"{
            "sampling": {"sample_rate_hz": 8000, "channels": 1, "gain": 20, "duration_ms": 500},
            "schedule": {"cycle_period_ms": 10000},
            "storage": {"root": "/tmp/card", "chip_select": 4, "file_name": "/stats.csv"},
            "pipeline": {"mode": "summary"},
            "debug": false
        }"#;
        let config: DeviceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.pipeline.fft_window_len, 16_384);
        assert!(!config.pipeline.legacy_min_max_sentinels);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let err = DeviceConfig::load_from_file("/nonexistent/device.json").unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));

        let fallback = DeviceConfig::load_or_default("/nonexistent/device.json");
        assert_eq!(fallback, DeviceConfig::default());
    }
}
