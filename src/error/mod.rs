// Error types for the audio logger
//
// This module defines custom error types for configuration, storage, sampling
// and analysis, providing structured error handling with numeric error codes.
//
// Only two tiers exist at runtime: analysis errors are absorbed by the duty
// cycle and logged, storage errors are fatal and halt the device.

mod analysis;
mod config;
mod sampler;
mod storage;

pub use analysis::{log_analysis_error, AnalysisError, AnalysisErrorCodes};
pub use config::{ConfigError, ConfigErrorCodes};
pub use sampler::{SamplerError, SamplerErrorCodes};
pub use storage::{log_storage_error, StorageError, StorageErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, so every failure can be logged the same way.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
