//! User session
//!
//! Owns the artifact repository, the active role and the theme preference.
//! Constructed once at startup and passed to whatever drives the UI.

use std::sync::Arc;

use chrono::NaiveDate;
use eduart_artifacts::{
    archive_filename, build_image_archive, image_filename, Artifact, ArtifactKind,
    ArtifactRepository, Content, ExportError, LoadOutcome,
};
use eduart_common::{Config, Error, Result, ThemePreference, UserRole};
use eduart_storage::{FileStore, KeyValueStore, THEME_KEY};

/// A file ready to hand to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub struct Session {
    config: Config,
    store: Arc<dyn KeyValueStore>,
    repo: ArtifactRepository,
    role: UserRole,
    theme: ThemePreference,
}

impl Session {
    /// Start a session over `store` with no role selected
    pub fn open(config: Config, store: Arc<dyn KeyValueStore>) -> Self {
        let repo = ArtifactRepository::initialize(store.clone());
        let theme = store
            .load(THEME_KEY)
            .and_then(|value| ThemePreference::parse(&value))
            .unwrap_or(config.default_theme);

        Self {
            config,
            store,
            repo,
            role: UserRole::None,
            theme,
        }
    }

    /// Start a session over the file store in `config.store_dir`
    pub fn open_from_config(config: Config) -> Result<Self> {
        let store = FileStore::open(&config.store_dir)?;
        Ok(Self::open(config, Arc::new(store)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn set_role(&mut self, role: UserRole) {
        tracing::debug!(from = %self.role, to = %role, "Role changed");
        self.role = role;
    }

    pub fn theme(&self) -> ThemePreference {
        self.theme
    }

    /// Flip and persist the theme
    pub fn toggle_theme(&mut self) -> Result<ThemePreference> {
        let next = self.theme.toggled();
        self.store.save(THEME_KEY, next.as_str())?;
        self.theme = next;
        Ok(next)
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        self.repo.load_outcome()
    }

    /// Save generated content under the active role
    pub fn save(
        &mut self,
        kind: ArtifactKind,
        content: Content,
        title: impl Into<String>,
    ) -> Result<Artifact> {
        self.repo.add(kind, content, title, self.role)
    }

    /// Delete a saved artifact once the user has confirmed
    pub fn delete(&mut self, id: &str, confirmed: bool) -> Result<bool> {
        if !confirmed {
            tracing::debug!(id = %id, "Delete not confirmed");
            return Ok(false);
        }
        self.repo.remove(id)
    }

    /// The active role's artifacts, newest first
    pub fn saved(&self, kind: Option<ArtifactKind>) -> Vec<Artifact> {
        self.repo.filter_by(self.role, kind)
    }

    /// Whether the archive export has anything to work with
    pub fn has_images(&self) -> bool {
        !self.saved(Some(ArtifactKind::Image)).is_empty()
    }

    /// Zip the active role's images. `Ok(None)` when there is nothing to export.
    pub fn export_archive(
        &self,
        today: NaiveDate,
    ) -> std::result::Result<Option<Download>, ExportError> {
        match build_image_archive(&self.saved(Some(ArtifactKind::Image))) {
            Ok(archive) => Ok(Some(Download {
                filename: archive_filename(&self.config.archive_namespace, today),
                bytes: archive.bytes,
            })),
            Err(ExportError::NothingToExport) => {
                tracing::debug!(role = %self.role, "No images to export");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Decoded bytes of one of the active role's images
    pub fn download_image(&self, id: &str) -> Result<Download> {
        let artifact = self
            .repo
            .get(id)
            .filter(|a| a.role == self.role && a.kind.is_image())
            .ok_or_else(|| Error::NotFound(format!("no {} image with id {}", self.role, id)))?;
        let bytes = artifact
            .image_bytes()
            .ok_or_else(|| Error::Validation(format!("image {} has no decodable payload", id)))?
            .into_owned();

        Ok(Download {
            filename: image_filename(&self.config.image_namespace, &artifact.id),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eduart_storage::MemoryStore;

    fn session_over(store: &MemoryStore) -> Session {
        Session::open(Config::default(), Arc::new(store.clone()))
    }

    fn png(byte: u8) -> Content {
        Content::image("image/png", vec![byte])
    }

    #[test]
    fn test_new_session_has_no_role() {
        let session = session_over(&MemoryStore::new());
        assert_eq!(session.role(), UserRole::None);
        assert_eq!(session.theme(), ThemePreference::Light);
    }

    #[test]
    fn test_theme_persists() {
        let store = MemoryStore::new();
        let mut session = session_over(&store);
        assert_eq!(session.toggle_theme().unwrap(), ThemePreference::Dark);
        assert_eq!(store.load(THEME_KEY).as_deref(), Some("dark"));

        let reopened = session_over(&store);
        assert_eq!(reopened.theme(), ThemePreference::Dark);
    }

    #[test]
    fn test_unknown_stored_theme_uses_default() {
        let store = MemoryStore::new();
        store.save(THEME_KEY, "sepia").unwrap();
        let config = Config {
            default_theme: ThemePreference::Dark,
            ..Config::default()
        };
        let session = Session::open(config, Arc::new(store));
        assert_eq!(session.theme(), ThemePreference::Dark);
    }

    #[test]
    fn test_save_stamps_role() {
        let mut session = session_over(&MemoryStore::new());
        session.set_role(UserRole::Student);
        let saved = session
            .save(ArtifactKind::Prompt, Content::text("Dibuixa"), "Repte")
            .unwrap();
        assert_eq!(saved.role, UserRole::Student);
    }

    #[test]
    fn test_roles_see_only_their_own() {
        let mut session = session_over(&MemoryStore::new());
        session.set_role(UserRole::Teacher);
        session
            .save(ArtifactKind::Lesson, Content::text("# Pla"), "Pla")
            .unwrap();
        session.set_role(UserRole::Student);
        session.save(ArtifactKind::Image, png(1), "Gat").unwrap();

        assert_eq!(session.saved(None).len(), 1);
        assert!(session.has_images());

        session.set_role(UserRole::Teacher);
        assert_eq!(session.saved(None).len(), 1);
        assert!(!session.has_images());
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut session = session_over(&MemoryStore::new());
        let saved = session
            .save(ArtifactKind::Rubric, Content::text("| r |"), "Rúbrica")
            .unwrap();

        assert!(!session.delete(&saved.id, false).unwrap());
        assert_eq!(session.saved(None).len(), 1);
        assert!(session.delete(&saved.id, true).unwrap());
        assert!(session.saved(None).is_empty());
    }

    #[test]
    fn test_export_without_images_is_none() {
        let mut session = session_over(&MemoryStore::new());
        session
            .save(ArtifactKind::Search, Content::text("resum"), "Cerca")
            .unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(session.export_archive(today), Ok(None));
    }

    #[test]
    fn test_export_names_archive() {
        let mut session = session_over(&MemoryStore::new());
        session.set_role(UserRole::Teacher);
        session.save(ArtifactKind::Image, png(0x41), "Sunset").unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let download = session.export_archive(today).unwrap().unwrap();
        assert_eq!(download.filename, "eduart_imatges_2026-10-19.zip");
        assert!(!download.bytes.is_empty());
    }

    #[test]
    fn test_download_image() {
        let mut session = session_over(&MemoryStore::new());
        session.set_role(UserRole::Student);
        let image = session.save(ArtifactKind::Image, png(7), "Gat").unwrap();
        let text = session
            .save(ArtifactKind::Analysis, Content::text("bé"), "Anàlisi")
            .unwrap();

        let download = session.download_image(&image.id).unwrap();
        assert_eq!(download.filename, format!("saved-image-{}.png", image.id));
        assert_eq!(download.bytes, vec![7]);

        assert!(matches!(
            session.download_image(&text.id),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(session.download_image("missing"), Err(Error::NotFound(_))));
        session.set_role(UserRole::Teacher);
        assert!(matches!(
            session.download_image(&image.id),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_download_malformed_image_is_validation_error() {
        let store = MemoryStore::new();
        store
            .save(
                eduart_storage::SAVED_ITEMS_KEY,
                r#"[{"id":"9","type":"IMAGE","title":"t","content":"garbage","date":1,"role":"STUDENT"}]"#,
            )
            .unwrap();
        let mut session = session_over(&store);
        session.set_role(UserRole::Student);

        let err = session.download_image("9").unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
