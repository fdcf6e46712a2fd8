//! Artifact domain model

pub mod data_uri;
pub mod entities;

pub use data_uri::{DataUri, DataUriError};
pub use entities::{Artifact, ArtifactKind, Content, StoredArtifact};
