//! Image export: archive packaging and download names

pub mod archive;
pub mod filename;

pub use archive::{build_image_archive, export_images, ExportError, ImageArchive};
pub use filename::{archive_filename, entry_filename, image_filename, sanitize_title};
