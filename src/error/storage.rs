// Storage error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Storage error code constants
///
/// Error code range: 2001-2005
pub struct StorageErrorCodes {}

impl StorageErrorCodes {
    /// Storage medium could not be mounted
    pub const MOUNT_FAILED: i32 = 2001;

    /// Existing log file could not be deleted
    pub const DELETE_FAILED: i32 = 2002;

    /// Log file could not be opened or created
    pub const OPEN_FAILED: i32 = 2003;

    /// A record could not be written
    pub const WRITE_FAILED: i32 = 2004;

    /// Path is not a valid short name on the medium
    pub const INVALID_PATH: i32 = 2005;
}

/// Log a storage error with structured context
///
/// Storage errors are always fatal, so this is logged at error level
/// right before the device enters the fail state.
pub fn log_storage_error(err: &StorageError, context: &str) {
    error!(
        "Storage error in {}: code={}, component=PersistenceSink, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Storage-layer errors
///
/// Every variant is fatal: there is no retry and no partial-result
/// persistence.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// Storage root missing or not a directory
    MountFailed { root: String, reason: String },

    /// Existing log file could not be removed
    DeleteFailed { path: String, reason: String },

    /// Log file could not be opened for appending
    OpenFailed { path: String, reason: String },

    /// Append or flush failed
    WriteFailed { path: String, reason: String },

    /// Path is not representable on the medium
    InvalidPath { path: String },
}

impl ErrorCode for StorageError {
    fn code(&self) -> i32 {
        match self {
            StorageError::MountFailed { .. } => StorageErrorCodes::MOUNT_FAILED,
            StorageError::DeleteFailed { .. } => StorageErrorCodes::DELETE_FAILED,
            StorageError::OpenFailed { .. } => StorageErrorCodes::OPEN_FAILED,
            StorageError::WriteFailed { .. } => StorageErrorCodes::WRITE_FAILED,
            StorageError::InvalidPath { .. } => StorageErrorCodes::INVALID_PATH,
        }
    }

    fn message(&self) -> String {
        match self {
            StorageError::MountFailed { root, reason } => {
                format!("Failed to mount storage at {}: {}", root, reason)
            }
            StorageError::DeleteFailed { path, reason } => {
                format!("Failed to delete existing log file {}: {}", path, reason)
            }
            StorageError::OpenFailed { path, reason } => {
                format!("Could not open {} for writing: {}", path, reason)
            }
            StorageError::WriteFailed { path, reason } => {
                format!("Failed to append to {}: {}", path, reason)
            }
            StorageError::InvalidPath { path } => format!("Invalid storage path: {}", path),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StorageError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for StorageError {}
