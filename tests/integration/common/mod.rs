//! Common test utilities and fixtures for integration tests
//!
//! - A file-backed test workshop in a temporary directory
//! - Restart simulation over the same store directory
//! - Archive inspection helpers

#![allow(dead_code)]

use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use eduart_app::Session;
use eduart_artifacts::ArtifactRepository;
use eduart_common::{Config, UserRole};
use eduart_storage::FileStore;
use tempfile::TempDir;

/// A workshop whose store lives in a temporary directory
pub struct TestWorkshop {
    pub dir: TempDir,
    pub config: Config,
}

impl TestWorkshop {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        let config = Config {
            store_dir: dir.path().join("store"),
            ..Config::default()
        };
        Ok(Self { dir, config })
    }

    /// Open a fresh session, as a new process would
    pub fn session(&self, role: UserRole) -> Result<Session> {
        let mut session = Session::open_from_config(self.config.clone())?;
        session.set_role(role);
        Ok(session)
    }

    /// Open the repository directly over the same directory
    pub fn repository(&self) -> Result<ArtifactRepository> {
        let store = FileStore::open(&self.config.store_dir)?;
        Ok(ArtifactRepository::initialize(Arc::new(store)))
    }

    pub fn store_dir(&self) -> &Path {
        &self.config.store_dir
    }
}

/// `(entry name, bytes)` for every file in a ZIP
pub fn zip_entries(bytes: &[u8]) -> Result<Vec<(String, Vec<u8>)>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        entries.push((file.name().to_string(), data));
    }
    Ok(entries)
}
