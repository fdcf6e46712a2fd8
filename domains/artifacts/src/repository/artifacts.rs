//! Artifact repository
//!
//! Holds the authoritative in-memory collection and writes the whole
//! collection through to the key-value store on every mutation.

use std::sync::Arc;

use chrono::Utc;
use eduart_common::{Result, UserRole};
use eduart_storage::{KeyValueStore, SAVED_ITEMS_KEY};

use crate::domain::entities::{Artifact, ArtifactKind, Content, StoredArtifact};

/// What `initialize` found in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing stored yet
    Missing,
    /// Collection parsed; `malformed_images` records were kept with undecodable payloads
    Loaded {
        count: usize,
        malformed_images: usize,
    },
    /// Stored data did not parse; started from an empty collection
    Recovered { reason: String },
}

impl LoadOutcome {
    pub fn is_recovered(&self) -> bool {
        matches!(self, LoadOutcome::Recovered { .. })
    }
}

pub struct ArtifactRepository {
    store: Arc<dyn KeyValueStore>,
    items: Vec<Artifact>,
    last_id: i64,
    outcome: LoadOutcome,
}

impl ArtifactRepository {
    /// Rebuild the collection from the store. Never fails: absent or
    /// unparsable data yields an empty collection.
    pub fn initialize(store: Arc<dyn KeyValueStore>) -> Self {
        let (items, outcome) = match store.load(SAVED_ITEMS_KEY) {
            None => (Vec::new(), LoadOutcome::Missing),
            Some(raw) => match serde_json::from_str::<Vec<StoredArtifact>>(&raw) {
                Ok(stored) => {
                    let items: Vec<Artifact> = stored.into_iter().map(Artifact::from).collect();
                    let malformed_images = items.iter().filter(|a| a.is_malformed_image()).count();
                    let outcome = LoadOutcome::Loaded {
                        count: items.len(),
                        malformed_images,
                    };
                    (items, outcome)
                }
                Err(e) => {
                    tracing::warn!(
                        backend = store.backend(),
                        error = %e,
                        "Saved items are corrupted, starting from an empty collection"
                    );
                    (
                        Vec::new(),
                        LoadOutcome::Recovered {
                            reason: e.to_string(),
                        },
                    )
                }
            },
        };

        let last_id = items
            .iter()
            .filter_map(|a| a.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);

        tracing::info!(
            backend = store.backend(),
            count = items.len(),
            outcome = ?outcome,
            "Artifact repository initialized"
        );

        Self {
            store,
            items,
            last_id,
            outcome,
        }
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.outcome
    }

    /// Save a new artifact at the front of the collection and persist
    pub fn add(
        &mut self,
        kind: ArtifactKind,
        content: Content,
        title: impl Into<String>,
        role: UserRole,
    ) -> Result<Artifact> {
        let now = Utc::now().timestamp_millis();
        let id = self.next_id(now);
        let artifact = Artifact::new(id, kind, title.into(), content, now, role)?;

        self.items.insert(0, artifact.clone());
        if let Err(e) = self.persist() {
            self.items.remove(0);
            return Err(e);
        }

        tracing::info!(id = %artifact.id, kind = %kind, role = %role, "Artifact saved");
        Ok(artifact)
    }

    /// Remove by id. Returns `false` without writing when nothing matched.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let Some(index) = self.items.iter().position(|a| a.id == id) else {
            tracing::debug!(id = %id, "Remove requested for unknown artifact");
            return Ok(false);
        };

        let removed = self.items.remove(index);
        if let Err(e) = self.persist() {
            self.items.insert(index, removed);
            return Err(e);
        }

        tracing::info!(id = %id, kind = %removed.kind, "Artifact removed");
        Ok(true)
    }

    /// Artifacts of `role`, optionally of one `kind`, newest first
    pub fn filter_by(&self, role: UserRole, kind: Option<ArtifactKind>) -> Vec<Artifact> {
        self.items
            .iter()
            .filter(|a| a.role == role && kind.map_or(true, |k| a.kind == k))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Artifact> {
        self.items.iter().find(|a| a.id == id)
    }

    /// The whole collection, newest first
    pub fn all(&self) -> &[Artifact] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[mutants::skip] // Delegates to Vec::is_empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Timestamp-derived id, bumped past the last issued one when the clock
    /// has not advanced or an older stored id is larger. Once the counter
    /// cannot be bumped it restarts from the clock, skipping taken ids.
    fn next_id(&mut self, now_ms: i64) -> String {
        let mut id = match self.last_id.checked_add(1) {
            Some(next) => now_ms.max(next),
            None => {
                tracing::warn!(
                    last_id = self.last_id,
                    "Id counter exhausted, restarting from clock"
                );
                now_ms
            }
        };
        while self.items.iter().any(|a| a.id == id.to_string()) {
            id = id.wrapping_add(1);
        }
        self.last_id = id;
        id.to_string()
    }

    fn persist(&self) -> Result<()> {
        let serialized = serde_json::to_string(&self.items)?;
        self.store.save(SAVED_ITEMS_KEY, &serialized)?;
        Ok(())
    }
}
