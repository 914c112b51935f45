//! Key-value storage backed by a directory of files.
//!
//! Each key is stored as `<dir>/<key>.json`. Writes go to a hidden temporary
//! sibling first and are renamed into place, so readers see either the old
//! value or the new one.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tasklist_core::storage::{KeyValueStorage, StorageError};

/// Directory-backed [`KeyValueStorage`]
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The data directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        // Keys never start with a dot, so this cannot shadow another key
        self.dir.join(format!(".{key}.json.tmp"))
    }
}

/// Keys become file names: non-empty, `[A-Za-z0-9._-]`, no leading dot
fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

fn storage_error(error: &std::io::Error) -> StorageError {
    match error.kind() {
        ErrorKind::PermissionDenied => StorageError::Unavailable(error.to_string()),
        _ => StorageError::Io(error.to_string()),
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(storage_error(&error)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let temp = self.temp_path_for(key);

        fs::create_dir_all(&self.dir).map_err(|e| storage_error(&e))?;
        fs::write(&temp, value).map_err(|e| storage_error(&e))?;
        if let Err(error) = fs::rename(&temp, &path) {
            let _ = fs::remove_file(&temp);
            return Err(storage_error(&error));
        }

        tracing::trace!(path = %path.display(), bytes = value.len(), "Wrote value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
            Err(error) => Err(storage_error(&error)),
        }
    }
}
