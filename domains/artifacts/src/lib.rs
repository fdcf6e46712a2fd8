//! Artifacts domain: saved generated work, local repository, image archive export

pub mod domain;
pub mod export;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::data_uri::{DataUri, DataUriError};
pub use domain::entities::{Artifact, ArtifactKind, Content, StoredArtifact};

// Re-export export types
pub use export::{
    archive_filename, build_image_archive, export_images, image_filename, ExportError,
    ImageArchive,
};

// Re-export repository types
pub use repository::{ArtifactRepository, LoadOutcome};
