// Configuration error types and constants

use crate::error::ErrorCode;
use std::fmt;

/// Configuration error code constants
///
/// Error code range: 1001-1006
pub struct ConfigErrorCodes {}

impl ConfigErrorCodes {
    /// A numeric parameter is out of range
    pub const INVALID_VALUE: i32 = 1001;

    /// Only mono capture is supported
    pub const UNSUPPORTED_CHANNELS: i32 = 1002;

    /// Output file name does not fit the 8.3 form
    pub const INVALID_FILE_NAME: i32 = 1003;

    /// Sampling does not fit inside the duty-cycle period
    pub const SCHEDULE_OVERRUN: i32 = 1004;

    /// Config file could not be parsed
    pub const PARSE_FAILED: i32 = 1005;

    /// Config file could not be read
    pub const UNREADABLE: i32 = 1006;
}

/// Configuration errors
///
/// Raised by validation before the first duty cycle. A device with an
/// invalid configuration never starts.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A parameter has an unusable value
    InvalidValue { field: String, reason: String },

    /// Channel count other than mono
    UnsupportedChannels { channels: u16 },

    /// Output file name is not a legacy 8.3 name
    InvalidFileName { name: String },

    /// Sampling window is not shorter than the cycle period
    ScheduleOverrun {
        duration_ms: u64,
        cycle_period_ms: u64,
    },

    /// JSON could not be deserialized
    ParseFailed { reason: String },

    /// File could not be read
    Unreadable { path: String, reason: String },
}

impl ErrorCode for ConfigError {
    fn code(&self) -> i32 {
        match self {
            ConfigError::InvalidValue { .. } => ConfigErrorCodes::INVALID_VALUE,
            ConfigError::UnsupportedChannels { .. } => ConfigErrorCodes::UNSUPPORTED_CHANNELS,
            ConfigError::InvalidFileName { .. } => ConfigErrorCodes::INVALID_FILE_NAME,
            ConfigError::ScheduleOverrun { .. } => ConfigErrorCodes::SCHEDULE_OVERRUN,
            ConfigError::ParseFailed { .. } => ConfigErrorCodes::PARSE_FAILED,
            ConfigError::Unreadable { .. } => ConfigErrorCodes::UNREADABLE,
        }
    }

    fn message(&self) -> String {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                format!("Invalid value for {}: {}", field, reason)
            }
            ConfigError::UnsupportedChannels { channels } => {
                format!("Only mono capture is supported (got {} channels)", channels)
            }
            ConfigError::InvalidFileName { name } => {
                format!("File name {:?} is not a valid 8.3 name", name)
            }
            ConfigError::ScheduleOverrun {
                duration_ms,
                cycle_period_ms,
            } => format!(
                "Sampling duration {} ms does not fit in cycle period {} ms",
                duration_ms, cycle_period_ms
            ),
            ConfigError::ParseFailed { reason } => format!("Failed to parse config: {}", reason),
            ConfigError::Unreadable { path, reason } => {
                format!("Failed to read config {}: {}", path, reason)
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConfigError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseFailed {
            reason: err.to_string(),
        }
    }
}
