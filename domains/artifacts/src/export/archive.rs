//! Image archive export
//!
//! Packs every usable image artifact of a list into one ZIP. Entries are
//! stored uncompressed; the payloads are already compressed image formats.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::domain::entities::Artifact;
use crate::export::filename::entry_filename;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExportError {
    #[error("There are no images to export")]
    NothingToExport,

    #[error("Could not build the image archive: {0}")]
    ExportFailed(String),
}

impl From<zip::result::ZipError> for ExportError {
    fn from(err: zip::result::ZipError) -> Self {
        ExportError::ExportFailed(err.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::ExportFailed(err.to_string())
    }
}

/// A finished archive plus what went into it
#[derive(Debug, Clone)]
pub struct ImageArchive {
    pub bytes: Vec<u8>,
    /// Entry names written, in input order
    pub entries: Vec<String>,
    /// Ids of image artifacts skipped for a missing or undecodable payload,
    /// or whose entry name was already taken
    pub skipped: Vec<String>,
}

/// Build a ZIP of the image artifacts in `artifacts`.
///
/// Non-image artifacts are ignored. Images without a usable payload, or
/// that would repeat an entry name, are skipped one by one; the export
/// fails only when none remain.
pub fn build_image_archive(artifacts: &[Artifact]) -> Result<ImageArchive, ExportError> {
    let images: Vec<&Artifact> = artifacts.iter().filter(|a| a.kind.is_image()).collect();
    if images.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut entries = Vec::with_capacity(images.len());
    let mut skipped = Vec::new();
    let mut names = HashSet::with_capacity(images.len());

    for artifact in images {
        let Some(bytes) = artifact.image_bytes() else {
            tracing::warn!(id = %artifact.id, "Skipping image with unusable payload");
            skipped.push(artifact.id.clone());
            continue;
        };

        let name = entry_filename(&artifact.title, &artifact.id);
        if !names.insert(name.clone()) {
            tracing::warn!(id = %artifact.id, name = %name, "Skipping image with duplicate entry name");
            skipped.push(artifact.id.clone());
            continue;
        }

        writer.start_file(name.as_str(), options)?;
        writer.write_all(&bytes)?;
        entries.push(name);
    }

    if entries.is_empty() {
        return Err(ExportError::ExportFailed(format!(
            "none of the {} images has a valid payload",
            skipped.len()
        )));
    }

    let bytes = writer.finish()?.into_inner();

    tracing::info!(
        entries = entries.len(),
        skipped = skipped.len(),
        size = bytes.len(),
        "Image archive built"
    );

    Ok(ImageArchive {
        bytes,
        entries,
        skipped,
    })
}

/// Archive bytes for the image artifacts in `artifacts`
pub fn export_images(artifacts: &[Artifact]) -> Result<Vec<u8>, ExportError> {
    build_image_archive(artifacts).map(|archive| archive.bytes)
}
