//! Common error types and handling for EduArt

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the EduArt application
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Get the stable error code used in CLI output and logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::Storage(_) => "STORAGE_ERROR",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::NotFound(_) => "NOT_FOUND",
        }
    }

    /// Whether the error comes from the local machine rather than from caller input
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::Serialization(_) | Error::Storage(_))
    }
}
