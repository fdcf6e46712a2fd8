//! Data URI codec
//!
//! Image payloads cross the storage and export boundary as
//! `data:<mime>;base64,<payload>`. Inside the domain they are raw bytes.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64";

/// Fallback MIME type when the header names none
pub const DEFAULT_MIME: &str = "application/octet-stream";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataUriError {
    #[error("not a data URI")]
    MissingScheme,

    #[error("data URI has no payload separator")]
    MissingPayload,

    #[error("data URI payload is not base64-encoded")]
    NotBase64,

    #[error("invalid base64 payload: {0}")]
    Decode(String),
}

/// A decoded data URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime: String,
    pub data: Vec<u8>,
}

impl DataUri {
    /// Parse `data:<mime>;base64,<payload>`
    pub fn parse(raw: &str) -> Result<Self, DataUriError> {
        let rest = raw.strip_prefix(SCHEME).ok_or(DataUriError::MissingScheme)?;
        let (header, payload) = rest.split_once(',').ok_or(DataUriError::MissingPayload)?;

        let mime = header
            .strip_suffix(BASE64_MARKER)
            .ok_or(DataUriError::NotBase64)?;
        let mime = if mime.is_empty() { DEFAULT_MIME } else { mime };

        let data = STANDARD
            .decode(payload.trim())
            .map_err(|e| DataUriError::Decode(e.to_string()))?;

        Ok(Self {
            mime: mime.to_string(),
            data,
        })
    }

    /// Encode bytes as a data URI
    pub fn encode(mime: &str, data: &[u8]) -> String {
        format!("{}{}{},{}", SCHEME, mime, BASE64_MARKER, STANDARD.encode(data))
    }
}
