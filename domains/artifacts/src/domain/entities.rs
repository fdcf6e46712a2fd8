//! Domain entities for Artifacts domain
//!
//! An artifact is one saved unit of generated work. It is created by an
//! explicit save and never mutated afterwards.

use serde::{Deserialize, Serialize};

use eduart_common::{Error, Result, UserRole};

use crate::domain::data_uri::DataUri;

/// Artifact kind, stored as the upper-case `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ArtifactKind {
    Lesson,
    Rubric,
    Heritage,
    Analysis,
    Prompt,
    Image,
    Search,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 7] = [
        ArtifactKind::Lesson,
        ArtifactKind::Rubric,
        ArtifactKind::Heritage,
        ArtifactKind::Analysis,
        ArtifactKind::Prompt,
        ArtifactKind::Image,
        ArtifactKind::Search,
    ];

    /// Whether artifacts of this kind carry image bytes instead of text
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image)
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Lesson => write!(f, "LESSON"),
            ArtifactKind::Rubric => write!(f, "RUBRIC"),
            ArtifactKind::Heritage => write!(f, "HERITAGE"),
            ArtifactKind::Analysis => write!(f, "ANALYSIS"),
            ArtifactKind::Prompt => write!(f, "PROMPT"),
            ArtifactKind::Image => write!(f, "IMAGE"),
            ArtifactKind::Search => write!(f, "SEARCH"),
        }
    }
}

impl std::str::FromStr for ArtifactKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.to_ascii_uppercase();
        ArtifactKind::ALL
            .into_iter()
            .find(|kind| kind.to_string() == upper)
            .ok_or_else(|| Error::Validation(format!("Unknown artifact type '{}'", s)))
    }
}

/// Artifact payload: markdown text or decoded image bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Image { mime: String, data: Vec<u8> },
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text(text.into())
    }

    pub fn image(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Content::Image {
            mime: mime.into(),
            data,
        }
    }

    /// Decode a `data:<mime>;base64,<payload>` string into image content
    pub fn from_data_uri(raw: &str) -> Result<Self> {
        let uri = DataUri::parse(raw).map_err(|e| Error::Validation(e.to_string()))?;
        Ok(Content::Image {
            mime: uri.mime,
            data: uri.data,
        })
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Content::Image { .. })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            Content::Image { .. } => None,
        }
    }

    /// String form used in storage: text verbatim, images as data URIs
    pub fn to_wire(&self) -> String {
        match self {
            Content::Text(text) => text.clone(),
            Content::Image { mime, data } => DataUri::encode(mime, data),
        }
    }
}

/// One saved piece of generated work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredArtifact", into = "StoredArtifact")]
pub struct Artifact {
    pub id: String,
    pub kind: ArtifactKind,
    pub title: String,
    pub content: Content,
    /// Creation time in milliseconds since the Unix epoch
    pub date: i64,
    pub role: UserRole,
}

impl Artifact {
    /// Build a new artifact; content must match the kind
    pub fn new(
        id: String,
        kind: ArtifactKind,
        title: String,
        content: Content,
        date: i64,
        role: UserRole,
    ) -> Result<Self> {
        let artifact = Self {
            id,
            kind,
            title,
            content,
            date,
            role,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    /// Validate invariants
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation("Artifact id must not be empty".to_string()));
        }

        match (&self.content, self.kind.is_image()) {
            (Content::Image { data, .. }, true) => {
                if data.is_empty() {
                    return Err(Error::Validation(
                        "Image artifacts require a non-empty payload".to_string(),
                    ));
                }
            }
            (Content::Text(_), false) => {}
            (Content::Text(_), true) => {
                return Err(Error::Validation(
                    "IMAGE artifacts require image content".to_string(),
                ));
            }
            (Content::Image { .. }, false) => {
                return Err(Error::Validation(format!(
                    "{} artifacts require text content",
                    self.kind
                )));
            }
        }

        Ok(())
    }

    /// Decoded image bytes, if this artifact carries a usable image payload.
    ///
    /// Image records loaded from storage whose payload could not be decoded
    /// are kept as text; those yield `None`, as do empty payloads.
    pub fn image_bytes(&self) -> Option<std::borrow::Cow<'_, [u8]>> {
        if !self.kind.is_image() {
            return None;
        }
        match &self.content {
            Content::Image { data, .. } if !data.is_empty() => {
                Some(std::borrow::Cow::Borrowed(data.as_slice()))
            }
            Content::Image { .. } => None,
            Content::Text(raw) => DataUri::parse(raw)
                .ok()
                .filter(|uri| !uri.data.is_empty())
                .map(|uri| std::borrow::Cow::Owned(uri.data)),
        }
    }

    /// Whether a stored image record kept its payload as undecodable text
    pub fn is_malformed_image(&self) -> bool {
        self.kind.is_image() && !self.content.is_image()
    }
}

/// Wire shape of an artifact inside the stored JSON array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredArtifact {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    pub title: String,
    pub content: String,
    pub date: i64,
    pub role: UserRole,
}

impl From<Artifact> for StoredArtifact {
    fn from(artifact: Artifact) -> Self {
        Self {
            content: artifact.content.to_wire(),
            id: artifact.id,
            kind: artifact.kind,
            title: artifact.title,
            date: artifact.date,
            role: artifact.role,
        }
    }
}

impl From<StoredArtifact> for Artifact {
    /// Image records with an undecodable data URI keep the raw string as text
    /// so the rest of the collection and the record itself survive loading.
    fn from(stored: StoredArtifact) -> Self {
        let content = if stored.kind.is_image() {
            match DataUri::parse(&stored.content) {
                Ok(uri) => Content::Image {
                    mime: uri.mime,
                    data: uri.data,
                },
                Err(e) => {
                    tracing::warn!(id = %stored.id, error = %e, "Stored image payload is malformed");
                    Content::Text(stored.content)
                }
            }
        } else {
            Content::Text(stored.content)
        };

        Self {
            id: stored.id,
            kind: stored.kind,
            title: stored.title,
            content,
            date: stored.date,
            role: stored.role,
        }
    }
}
