//! Repository implementations for Artifacts domain

pub mod artifacts;

pub use artifacts::{ArtifactRepository, LoadOutcome};
