// Sampler error types and constants

use crate::error::ErrorCode;
use std::fmt;

/// Sampler error code constants
///
/// Error code range: 3001-3004
pub struct SamplerErrorCodes {}

impl SamplerErrorCodes {
    /// Analog source could not be opened
    pub const SOURCE_UNAVAILABLE: i32 = 3001;

    /// Finite source ran out of samples
    pub const SOURCE_EXHAUSTED: i32 = 3002;

    /// Streaming source stopped delivering samples
    pub const SOURCE_TIMEOUT: i32 = 3003;

    /// Source format cannot be converted to 16-bit mono
    pub const UNSUPPORTED_FORMAT: i32 = 3004;
}

/// Errors raised while acquiring a sample window
#[derive(Debug, Clone, PartialEq)]
pub enum SamplerError {
    /// Source could not be opened
    SourceUnavailable { reason: String },

    /// No more samples
    SourceExhausted,

    /// No sample arrived within the timeout
    SourceTimeout { waited_ms: u64 },

    /// Input format is not 16-bit integer PCM
    UnsupportedFormat { details: String },
}

impl ErrorCode for SamplerError {
    fn code(&self) -> i32 {
        match self {
            SamplerError::SourceUnavailable { .. } => SamplerErrorCodes::SOURCE_UNAVAILABLE,
            SamplerError::SourceExhausted => SamplerErrorCodes::SOURCE_EXHAUSTED,
            SamplerError::SourceTimeout { .. } => SamplerErrorCodes::SOURCE_TIMEOUT,
            SamplerError::UnsupportedFormat { .. } => SamplerErrorCodes::UNSUPPORTED_FORMAT,
        }
    }

    fn message(&self) -> String {
        match self {
            SamplerError::SourceUnavailable { reason } => {
                format!("Analog source unavailable: {}", reason)
            }
            SamplerError::SourceExhausted => "Analog source has no more samples".to_string(),
            SamplerError::SourceTimeout { waited_ms } => {
                format!("No sample received within {} ms", waited_ms)
            }
            SamplerError::UnsupportedFormat { details } => {
                format!("Unsupported sample format: {}", details)
            }
        }
    }
}

impl fmt::Display for SamplerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SamplerError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for SamplerError {}

impl From<hound::Error> for SamplerError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => SamplerError::SourceUnavailable {
                reason: io.to_string(),
            },
            other => SamplerError::UnsupportedFormat {
                details: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampler_error_codes() {
        assert_eq!(
            SamplerError::SourceUnavailable {
                reason: "test".to_string()
            }
            .code(),
            3001
        );
        assert_eq!(SamplerError::SourceExhausted.code(), 3002);
        assert_eq!(SamplerError::SourceTimeout { waited_ms: 5 }.code(), 3003);
        assert_eq!(
            SamplerError::UnsupportedFormat {
                details: "test".to_string()
            }
            .code(),
            3004
        );
    }

    #[test]
    fn test_hound_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.wav");
        let err: SamplerError = hound::Error::IoError(io_err).into();

        match err {
            SamplerError::SourceUnavailable { reason } => assert!(reason.contains("missing.wav")),
            other => panic!("Expected SourceUnavailable, got {:?}", other),
        }
    }
}
