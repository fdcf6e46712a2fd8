//! EduArt Persistent Store
//!
//! Durable string-keyed storage scoped to one user profile:
//! - `FileStore` keeps one file per key under a directory
//! - `MemoryStore` keeps values in process memory for tests and throwaway sessions
//!
//! Reads never fail: a missing, unreadable or cleared value is reported as
//! absent. Writes overwrite the whole value for a key.

use thiserror::Error;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key holding the serialized artifact collection
pub const SAVED_ITEMS_KEY: &str = "eduart-saved-items";

/// Key holding the `"dark" | "light"` theme flag
pub const THEME_KEY: &str = "eduart-theme";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("Failed to write '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<StorageError> for eduart_common::Error {
    fn from(err: StorageError) -> Self {
        eduart_common::Error::Storage(err.to_string())
    }
}

/// Durable key-value facility backing the artifact collection and preferences
pub trait KeyValueStore: Send + Sync {
    /// Last written value for `key`, or `None` if never written or unreadable
    fn load(&self, key: &str) -> Option<String>;

    /// Overwrite the value for `key`
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Short name for logs
    fn backend(&self) -> &'static str;
}

/// Keys become file names, so only a conservative character set is accepted
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key.len() <= 128
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !key.starts_with('.');

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
