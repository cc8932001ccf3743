//! Note source backends
//!
//! The controller reads and mutates notes through this seam. Offline mode
//! persists everything in the local store; API mode defers every mutation
//! to the remote service and only reports success once the server confirms.

use crate::api::ApiClient;
use crate::config;
use crate::error::Result;
use crate::models::Note;
use crate::seed;
use crate::storage::LocalStore;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

/// Where notes come from and which authority confirms mutations
#[async_trait]
pub trait NotesBackend: Send + Sync {
    /// Load the full collection, split into (active, archived)
    async fn load_all(&self) -> Result<(Vec<Note>, Vec<Note>)>;

    /// Create a note and return it; the controller inserts it into state
    async fn create(&self, title: String, body: String) -> Result<Note>;

    /// Confirm an archive-state change for the given id
    async fn set_archived(&self, id: &str, archived: bool) -> Result<()>;

    /// Confirm deletion of the given id
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Split a combined collection on the archived flag
pub fn split_by_archived(notes: Vec<Note>) -> (Vec<Note>, Vec<Note>) {
    notes.into_iter().partition(|n| !n.archived)
}

/// Offline backend persisting the collection in the local store
pub struct LocalBackend {
    store: LocalStore,
}

impl LocalBackend {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    async fn reseed(&self) -> Result<Vec<Note>> {
        let notes = seed::sample_notes();
        self.store.set_json(config::NOTES_KEY, &notes).await?;
        self.store.set(config::SEEDED_KEY, "1").await?;
        tracing::info!("Seeded note collection with {} sample notes", notes.len());
        Ok(notes)
    }
}

#[async_trait]
impl NotesBackend for LocalBackend {
    /// First run seeds from the bundled sample and sets the seed marker.
    /// Later runs deserialize the persisted collection; malformed data
    /// falls back to reseeding. Never yields undefined state.
    async fn load_all(&self) -> Result<(Vec<Note>, Vec<Note>)> {
        let seeded = matches!(
            self.store.get(config::SEEDED_KEY).await?,
            Some(flag) if flag == "1"
        );

        let notes = if !seeded {
            self.reseed().await?
        } else {
            match self.store.get(config::NOTES_KEY).await? {
                None => Vec::new(),
                Some(raw) => match serde_json::from_str::<Vec<Note>>(&raw) {
                    Ok(notes) => notes,
                    Err(e) => {
                        tracing::warn!("Persisted notes are malformed ({}), reseeding", e);
                        self.reseed().await?
                    }
                },
            }
        };

        Ok(split_by_archived(notes))
    }

    async fn create(&self, title: String, body: String) -> Result<Note> {
        Ok(Note {
            id: format!("notes-{}", Uuid::new_v4()),
            title,
            body,
            created_at: Utc::now(),
            archived: false,
            pinned: false,
        })
    }

    /// The controller owns the mutation; nothing to confirm offline
    async fn set_archived(&self, _id: &str, _archived: bool) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _id: &str) -> Result<()> {
        Ok(())
    }
}

/// API-mode backend; every mutation is confirmed by the server first
pub struct RemoteBackend {
    client: ApiClient,
}

impl RemoteBackend {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotesBackend for RemoteBackend {
    async fn load_all(&self) -> Result<(Vec<Note>, Vec<Note>)> {
        let mut active = self.client.get_notes().await?;
        let mut archived = self.client.get_archived_notes().await?;

        // normalize: each endpoint is authoritative for its partition
        for note in &mut active {
            note.archived = false;
        }
        for note in &mut archived {
            note.archived = true;
        }

        Ok((active, archived))
    }

    async fn create(&self, title: String, body: String) -> Result<Note> {
        self.client.create_note(&title, &body).await
    }

    async fn set_archived(&self, id: &str, archived: bool) -> Result<()> {
        if archived {
            self.client.archive_note(id).await
        } else {
            self.client.unarchive_note(id).await
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete_note(id).await
    }
}
