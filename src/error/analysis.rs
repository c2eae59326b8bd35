// Analysis error types and constants

use crate::error::ErrorCode;
use log::warn;
use std::fmt;

/// Analysis error code constants
///
/// Error code range: 4001-4006
pub struct AnalysisErrorCodes {}

impl AnalysisErrorCodes {
    /// Fewer samples than the statistic needs
    pub const INSUFFICIENT_SAMPLES: i32 = 4001;

    /// Buffer length differs from the configured transform length
    pub const LENGTH_MISMATCH: i32 = 4002;

    /// Feature value outside the log1p domain
    pub const INVALID_FEATURE: i32 = 4003;

    /// Model parameters are inconsistent
    pub const INVALID_MODEL: i32 = 4004;

    /// Model parameters could not be parsed
    pub const MODEL_PARSE_FAILED: i32 = 4005;

    /// Feature vector length differs from the model
    pub const FEATURE_COUNT_MISMATCH: i32 = 4006;
}

/// Log an analysis error that the duty cycle absorbed
///
/// Analysis errors never halt the device, so they are logged as warnings.
pub fn log_analysis_error(err: &AnalysisError, context: &str) {
    warn!(
        "Analysis error in {}: code={}, component=DutyCyclePipeline, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors from statistics, the spectral transform and the classifier
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Summary statistics need at least `required` samples
    InsufficientSamples { required: usize, collected: usize },

    /// Buffer length does not match the planned transform
    LengthMismatch { expected: usize, actual: usize },

    /// Feature is negative or not finite
    InvalidFeature { index: usize, value: f32 },

    /// Model parameter validation failed
    InvalidModel { reason: String },

    /// Model JSON could not be parsed
    ModelParseFailed { reason: String },

    /// Feature vector length differs from the declared feature count
    FeatureCountMismatch { expected: usize, actual: usize },
}

impl ErrorCode for AnalysisError {
    fn code(&self) -> i32 {
        match self {
            AnalysisError::InsufficientSamples { .. } => AnalysisErrorCodes::INSUFFICIENT_SAMPLES,
            AnalysisError::LengthMismatch { .. } => AnalysisErrorCodes::LENGTH_MISMATCH,
            AnalysisError::InvalidFeature { .. } => AnalysisErrorCodes::INVALID_FEATURE,
            AnalysisError::InvalidModel { .. } => AnalysisErrorCodes::INVALID_MODEL,
            AnalysisError::ModelParseFailed { .. } => AnalysisErrorCodes::MODEL_PARSE_FAILED,
            AnalysisError::FeatureCountMismatch { .. } => {
                AnalysisErrorCodes::FEATURE_COUNT_MISMATCH
            }
        }
    }

    fn message(&self) -> String {
        match self {
            AnalysisError::InsufficientSamples {
                required,
                collected,
            } => format!("Insufficient samples: need {}, got {}", required, collected),
            AnalysisError::LengthMismatch { expected, actual } => {
                format!("Buffer length {} does not match transform length {}", actual, expected)
            }
            AnalysisError::InvalidFeature { index, value } => {
                format!("Feature {} has value {} outside the log1p domain", index, value)
            }
            AnalysisError::InvalidModel { reason } => format!("Invalid model: {}", reason),
            AnalysisError::ModelParseFailed { reason } => {
                format!("Failed to parse model parameters: {}", reason)
            }
            AnalysisError::FeatureCountMismatch { expected, actual } => {
                format!("Model expects {} features, got {}", expected, actual)
            }
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AnalysisError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for AnalysisError {}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::ModelParseFailed {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_error_codes() {
        assert_eq!(
            AnalysisError::InsufficientSamples {
                required: 2,
                collected: 0
            }
            .code(),
            4001
        );
        assert_eq!(
            AnalysisError::LengthMismatch {
                expected: 4,
                actual: 3
            }
            .code(),
            4002
        );
        assert_eq!(
            AnalysisError::InvalidFeature {
                index: 0,
                value: -1.0
            }
            .code(),
            4003
        );
        assert_eq!(
            AnalysisError::FeatureCountMismatch {
                expected: 8,
                actual: 4
            }
            .code(),
            4006
        );
    }

    #[test]
    fn test_insufficient_samples_message() {
        let err = AnalysisError::InsufficientSamples {
            required: 2,
            collected: 1,
        };
        assert!(err.message().contains("need 2"));
        assert!(err.message().contains("got 1"));
    }
}
