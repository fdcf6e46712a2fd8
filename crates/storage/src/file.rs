//! File-backed store
//!
//! Each key is one file under the store directory. Writes go to a hidden
//! temporary file first and are renamed into place, so a crash mid-write
//! leaves the previous value intact.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::{validate_key, KeyValueStore, StorageError};

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            StorageError::Unavailable(format!("cannot create {}: {}", dir.display(), e))
        })?;

        tracing::debug!(dir = %dir.display(), "Opened file store");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{}.tmp", key))
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Option<String> {
        if validate_key(key).is_err() {
            tracing::warn!(key = %key, "Refusing to load invalid storage key");
            return None;
        }

        match std::fs::read(self.path_for(key)) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(
                        key = %key,
                        error = %e,
                        "Stored value is not valid UTF-8, returning lossy copy"
                    );
                    Some(String::from_utf8_lossy(e.as_bytes()).into_owned())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Stored value unreadable, treating as absent");
                None
            }
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;

        let write_err = |source: std::io::Error| StorageError::Write {
            key: key.to_string(),
            source,
        };

        let tmp = self.temp_path_for(key);
        {
            let mut file = std::fs::File::create(&tmp).map_err(write_err)?;
            file.write_all(value.as_bytes()).map_err(write_err)?;
            file.sync_all().map_err(write_err)?;
        }
        std::fs::rename(&tmp, self.path_for(key)).map_err(write_err)?;

        tracing::trace!(key = %key, bytes = value.len(), "Persisted value");
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}
