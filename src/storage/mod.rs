//! Removable storage and the append-only log.
//!
//! The card is modelled by the [`Storage`] trait: existence check, delete and
//! open-for-append, which is all the persistence sink needs. On a host the
//! card is a mounted directory ([`DirectoryStorage`]); tests plug in their
//! own implementations to simulate failing media.

use std::fs::{self, File, OpenOptions};
use std::io::BufWriter;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

pub mod binary;
pub mod record;
pub mod sink;

pub use binary::{read_binary_log, BinaryHeader, CaptureRecord};
pub use record::{LogFormat, LogRecord};
pub use sink::PersistenceSink;

/// Minimal file-system surface of the card
pub trait Storage {
    type File: Write;

    /// Whether `path` exists on the medium
    fn exists(&self, path: &str) -> bool;

    /// Delete `path`
    fn remove(&mut self, path: &str) -> Result<(), StorageError>;

    /// Open `path` for appending, creating it if absent
    fn open_append(&mut self, path: &str) -> Result<Self::File, StorageError>;
}

/// True if `path` is a single legacy 8.3 file name (optionally with a
/// leading `/`): 1-8 name characters, an optional 1-3 character extension,
/// ASCII alphanumerics plus `_`, `-`, `~`.
pub fn is_short_name(path: &str) -> bool {
    let name = path.strip_prefix('/').unwrap_or(path);
    let (stem, ext) = match name.split_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (name, None),
    };

    let valid_chars =
        |s: &str| s.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '~'));

    let stem_ok = (1..=8).contains(&stem.len()) && valid_chars(stem);
    let ext_ok = match ext {
        Some(ext) => (1..=3).contains(&ext.len()) && valid_chars(ext),
        None => true,
    };
    stem_ok && ext_ok
}

/// Card contents backed by a host directory
#[derive(Debug, Clone)]
pub struct DirectoryStorage {
    root: PathBuf,
}

impl DirectoryStorage {
    /// Mount the directory standing in for the card on `chip_select`
    ///
    /// # Errors
    /// `MountFailed` if `root` is not an existing directory
    pub fn mount<P: AsRef<Path>>(root: P, chip_select: u8) -> Result<Self, StorageError> {
        let root = root.as_ref();
        let metadata = fs::metadata(root).map_err(|err| StorageError::MountFailed {
            root: root.display().to_string(),
            reason: err.to_string(),
        })?;
        if !metadata.is_dir() {
            return Err(StorageError::MountFailed {
                root: root.display().to_string(),
                reason: "not a directory".to_string(),
            });
        }

        log::info!(
            "[Storage] Card mounted at {} (CS pin {})",
            root.display(),
            chip_select
        );
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Host path of a card path
    pub fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        if !is_short_name(path) {
            return Err(StorageError::InvalidPath {
                path: path.to_string(),
            });
        }
        Ok(self.root.join(path.trim_start_matches('/')))
    }
}

impl Storage for DirectoryStorage {
    type File = BufWriter<File>;

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }

    fn remove(&mut self, path: &str) -> Result<(), StorageError> {
        let host_path = self.resolve(path)?;
        fs::remove_file(&host_path).map_err(|err| StorageError::DeleteFailed {
            path: path.to_string(),
            reason: err.to_string(),
        })
    }

    fn open_append(&mut self, path: &str) -> Result<Self::File, StorageError> {
        let host_path = self.resolve(path)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&host_path)
            .map_err(|err| StorageError::OpenFailed {
                path: path.to_string(),
                reason: err.to_string(),
            })?;
        Ok(BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_names() {
        assert!(is_short_name("/predict.csv"));
        assert!(is_short_name("/audiodat.bin"));
        assert!(is_short_name("LOG~1.TXT"));
        assert!(is_short_name("/readme"));

        assert!(!is_short_name("/predictions.csv"));
        assert!(!is_short_name("/predict.json"));
        assert!(!is_short_name("/logs/predict.csv"));
        assert!(!is_short_name("/"));
        assert!(!is_short_name("/.csv"));
        assert!(!is_short_name("/a.b.c"));
        assert!(!is_short_name("/my log.csv"));
    }

    #[test]
    fn test_mount_requires_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DirectoryStorage::mount(dir.path(), 4).is_ok());

        let missing = dir.path().join("missing");
        assert!(matches!(
            DirectoryStorage::mount(&missing, 4),
            Err(StorageError::MountFailed { .. })
        ));

        let file = dir.path().join("file.txt");
        fs::write(&file, b"x").unwrap();
        assert!(DirectoryStorage::mount(&file, 4).is_err());
    }

    #[test]
    fn test_open_remove_exists() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = DirectoryStorage::mount(dir.path(), 4).unwrap();

        assert!(!storage.exists("/predict.csv"));
        {
            let mut file = storage.open_append("/predict.csv").unwrap();
            file.write_all(b"hello\n").unwrap();
        }
        assert!(storage.exists("/predict.csv"));
        assert_eq!(
            fs::read_to_string(dir.path().join("predict.csv")).unwrap(),
            "hello\n"
        );

        storage.remove("/predict.csv").unwrap();
        assert!(!storage.exists("/predict.csv"));
        assert!(matches!(
            storage.remove("/predict.csv"),
            Err(StorageError::DeleteFailed { .. })
        ));
    }

    #[test]
    fn test_rejects_long_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = DirectoryStorage::mount(dir.path(), 4).unwrap();
        assert!(matches!(
            storage.open_append("/predictions.csv"),
            Err(StorageError::InvalidPath { .. })
        ));
        assert!(!storage.exists("/predictions.csv"));
    }
}
