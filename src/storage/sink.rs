// Persistence sink - the append-only log on the card
//
// Opened once at boot and kept open for the life of the device. In debug
// builds the previous log is deleted on every boot. A header is written
// exactly once, when the file is created. Every failure here is fatal.

use std::io::Write;

use super::record::{LogFormat, LogRecord};
use super::Storage;
use crate::error::StorageError;

/// Append-only log file handle
pub struct PersistenceSink<W: Write> {
    file: W,
    path: String,
    format: LogFormat,
    records_written: u64,
}

impl<W: Write> PersistenceSink<W> {
    /// Open (and if needed create) the log file
    ///
    /// # Arguments
    /// * `storage` - Mounted card
    /// * `path` - Log file path on the card
    /// * `debug` - Delete any existing log first
    /// * `format` - Header and record layout
    ///
    /// # Errors
    /// `DeleteFailed`, `OpenFailed` or `WriteFailed` (header); all fatal
    pub fn open<S>(
        storage: &mut S,
        path: &str,
        debug: bool,
        format: LogFormat,
    ) -> Result<Self, StorageError>
    where
        S: Storage<File = W>,
    {
        if debug && storage.exists(path) {
            storage.remove(path)?;
            log::info!("[PersistenceSink] Existing log file {} deleted", path);
        }

        let created = !storage.exists(path);
        let file = storage.open_append(path)?;
        log::debug!("[PersistenceSink] Data file {} opened for writing", path);

        let mut sink = Self {
            file,
            path: path.to_string(),
            format,
            records_written: 0,
        };

        if created {
            sink.format
                .write_header(&mut sink.file)
                .and_then(|_| sink.file.flush())
                .map_err(|err| sink.write_failed(err))?;
            log::debug!("[PersistenceSink] Initialized {} with header", path);
        }

        Ok(sink)
    }

    /// Append one record and flush it to the medium
    pub fn append(&mut self, record: &LogRecord<'_>) -> Result<(), StorageError> {
        if !self.format.accepts(record) {
            return Err(StorageError::WriteFailed {
                path: self.path.clone(),
                reason: format!("record does not match log format {:?}", self.format),
            });
        }

        self.format
            .write_record(&mut self.file, record)
            .and_then(|_| self.file.flush())
            .map_err(|err| self.write_failed(err))?;
        self.records_written += 1;
        Ok(())
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    /// Records appended since open
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn get_ref(&self) -> &W {
        &self.file
    }

    fn write_failed(&self, err: std::io::Error) -> StorageError {
        StorageError::WriteFailed {
            path: self.path.clone(),
            reason: err.to_string(),
        }
    }
}
