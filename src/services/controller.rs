//! Application controller
//!
//! Single source of truth for note state. Reconciles user intents with the
//! active/archived collections and the pinned map, persists state, and
//! produces the presentation-ready projection after every change.
//!
//! Mutations follow a two-phase rule: the backend confirms first, local
//! state changes second. A note is therefore in exactly one collection at
//! every observable point, and a failed remote call leaves state untouched.

use crate::config;
use crate::error::{AppError, Result};
use crate::events::Intent;
use crate::models::{Filter, Note, Theme};
use crate::services::backend::{split_by_archived, NotesBackend};
use crate::services::toast::{ToastQueue, ToastVariant};
use crate::storage::LocalStore;
use crate::view::{ConfirmProvider, Counts, ReflowDelta, Render, ViewModel};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Filter and search over a combined collection. Pure: preserves relative
/// order and does not mutate the input. The query matches case-insensitively
/// as a substring of title or body once trimmed; an empty query matches all.
pub fn apply_filter_and_search(notes: &[Note], filter: Filter, query: &str) -> Vec<Note> {
    let q = query.trim().to_lowercase();
    notes
        .iter()
        .filter(|n| match filter {
            Filter::Active => !n.archived,
            Filter::Archived => n.archived,
            Filter::Pinned => n.pinned,
            Filter::All => true,
        })
        .filter(|n| {
            q.is_empty()
                || n.title.to_lowercase().contains(&q)
                || n.body.to_lowercase().contains(&q)
        })
        .cloned()
        .collect()
}

/// Total order for display: pinned first, then newest first. The sort is
/// stable, so equal keys keep their relative order and resorting an already
/// sorted view is a no-op.
pub fn sort_for_view(notes: &[Note]) -> Vec<Note> {
    let mut view = notes.to_vec();
    view.sort_by(|a, b| {
        b.pinned
            .cmp(&a.pinned)
            .then(b.created_at.cmp(&a.created_at))
    });
    view
}

/// Position changes for ids present in both the previous and next order
fn reflow_deltas(previous: &[String], next: &[String]) -> Vec<ReflowDelta> {
    let prev_index: HashMap<&str, usize> = previous
        .iter()
        .enumerate()
        .map(|(index, id)| (id.as_str(), index))
        .collect();

    next.iter()
        .enumerate()
        .filter_map(|(to, id)| {
            prev_index
                .get(id.as_str())
                .copied()
                .filter(|&from| from != to)
                .map(|from| ReflowDelta {
                    id: id.clone(),
                    from,
                    to,
                })
        })
        .collect()
}

/// The application controller
pub struct NotesController {
    backend: Arc<dyn NotesBackend>,
    store: LocalStore,
    renderer: Arc<dyn Render>,
    confirm: Arc<dyn ConfirmProvider>,
    toasts: ToastQueue,
    active: Vec<Note>,
    archived: Vec<Note>,
    pinned: HashMap<String, bool>,
    filter: Filter,
    query: String,
    theme: Theme,
    last_order: Vec<String>,
}

impl NotesController {
    pub fn new(
        backend: Arc<dyn NotesBackend>,
        store: LocalStore,
        renderer: Arc<dyn Render>,
        confirm: Arc<dyn ConfirmProvider>,
        toasts: ToastQueue,
    ) -> Self {
        Self {
            backend,
            store,
            renderer,
            confirm,
            toasts,
            active: Vec::new(),
            archived: Vec::new(),
            pinned: HashMap::new(),
            filter: Filter::default(),
            query: String::new(),
            theme: Theme::default(),
            last_order: Vec::new(),
        }
    }

    /// Load persisted state (or the seed) and render the first view.
    /// A backend failure leaves the collections empty and surfaces the
    /// error instead of crashing.
    pub async fn load_initial_state(&mut self) {
        self.theme = self.load_theme().await;

        match self.backend.load_all().await {
            Ok((active, archived)) => {
                self.active = active;
                self.archived = archived;
                self.load_pinned_map().await;
                self.apply_pinned_flags();
                self.prune_pinned_map().await;
                self.cache_notes().await;
                tracing::info!(
                    "Loaded {} active and {} archived notes",
                    self.active.len(),
                    self.archived.len()
                );
            }
            Err(e) => {
                self.active.clear();
                self.archived.clear();
                tracing::error!("Initial load failed: {}", e);
                self.toasts
                    .show(format!("Failed to load notes: {}", e), ToastVariant::Error)
                    .await;
            }
        }

        self.recompute_view();
    }

    /// Dispatch a typed intent from the view layer. Every error except a
    /// validation error (shown inline by the view) also surfaces as a toast.
    pub async fn handle_intent(&mut self, intent: Intent) -> Result<()> {
        let result = match intent {
            Intent::Create { title, body } => {
                self.create_note(&title, &body).await.map(|_| ())
            }
            Intent::Pin { id, pinned } => self.toggle_pin(&id, pinned).await,
            Intent::Archive { id, archived } => self.set_archived(&id, archived).await,
            Intent::Delete { id } => self.delete_note(&id).await,
            Intent::FilterChange { filter } => {
                self.set_filter(filter);
                Ok(())
            }
            Intent::SearchChange { query } => {
                self.set_search(&query);
                Ok(())
            }
            Intent::ThemeToggle => {
                self.toggle_theme().await;
                Ok(())
            }
            Intent::ExportData => self.export_data().await,
            Intent::ImportData { text, filename } => self.import_data(&text, &filename).await,
        };

        if let Err(e) = &result {
            if !matches!(e, AppError::Validation(_)) {
                self.toasts.show(e.to_string(), ToastVariant::Error).await;
            }
        }

        result
    }

    /// Create a note from trimmed inputs; both fields are required
    pub async fn create_note(&mut self, title: &str, body: &str) -> Result<Note> {
        let title = title.trim();
        let body = body.trim();

        if title.is_empty() || body.is_empty() {
            return Err(AppError::Validation(
                "title and body must not be empty".to_string(),
            ));
        }
        if title.len() > config::MAX_TITLE_LENGTH {
            return Err(AppError::Validation(format!(
                "title exceeds {} characters",
                config::MAX_TITLE_LENGTH
            )));
        }
        if body.len() > config::MAX_BODY_LENGTH {
            return Err(AppError::Validation(format!(
                "body exceeds {} characters",
                config::MAX_BODY_LENGTH
            )));
        }

        let note = self
            .backend
            .create(title.to_string(), body.to_string())
            .await?;
        tracing::info!("Created note {}", note.id);

        self.active.insert(0, note.clone());
        self.cache_notes().await;
        self.toasts.show("Note created", ToastVariant::Success).await;
        self.recompute_view();
        Ok(note)
    }

    /// Set or clear the pin flag. Pin is a client-local concept, so there is
    /// no remote call; unknown ids are a no-op.
    pub async fn toggle_pin(&mut self, id: &str, desired: bool) -> Result<()> {
        let Some(note) = self.find_mut(id) else {
            tracing::debug!("Pin toggle for unknown note {}", id);
            return Ok(());
        };
        note.pinned = desired;

        if desired {
            self.pinned.insert(id.to_string(), true);
        } else {
            self.pinned.remove(id);
        }
        self.save_pinned().await;
        self.cache_notes().await;
        self.recompute_view();
        Ok(())
    }

    /// Move a note between the active and archived collections. The backend
    /// confirms first; a failure leaves both collections untouched.
    pub async fn set_archived(&mut self, id: &str, desired: bool) -> Result<()> {
        let (in_active, position) =
            if let Some(position) = self.active.iter().position(|n| n.id == id) {
                (true, position)
            } else if let Some(position) = self.archived.iter().position(|n| n.id == id) {
                (false, position)
            } else {
                return Err(AppError::NoteNotFound(id.to_string()));
            };

        let currently_archived = !in_active;
        if currently_archived == desired {
            return Ok(());
        }

        self.backend.set_archived(id, desired).await?;

        let mut note = if in_active {
            self.active.remove(position)
        } else {
            self.archived.remove(position)
        };
        note.archived = desired;
        if desired {
            self.archived.insert(0, note);
        } else {
            self.active.insert(0, note);
        }

        tracing::info!(
            "Note {} {}",
            id,
            if desired { "archived" } else { "unarchived" }
        );
        self.cache_notes().await;
        self.toasts
            .show(
                if desired { "Note archived" } else { "Note restored" },
                ToastVariant::Success,
            )
            .await;
        self.recompute_view();
        Ok(())
    }

    /// Delete after user confirmation. Unknown ids are a silent no-op, so a
    /// duplicate delete intent is tolerated.
    pub async fn delete_note(&mut self, id: &str) -> Result<()> {
        let title = match self.find(id) {
            Some(note) => note.title.trim().to_string(),
            None => {
                tracing::debug!("Delete for unknown note {}", id);
                return Ok(());
            }
        };

        let message = if title.is_empty() {
            "Delete this note? This cannot be undone.".to_string()
        } else {
            format!("Delete note \"{}\"? This cannot be undone.", title)
        };
        if !self.confirm.confirm(&message).await {
            return Ok(());
        }

        self.backend.delete(id).await?;

        self.active.retain(|n| n.id != id);
        self.archived.retain(|n| n.id != id);
        self.pinned.remove(id);
        self.save_pinned().await;
        self.cache_notes().await;

        tracing::info!("Deleted note {}", id);
        self.toasts.show("Note deleted", ToastVariant::Warn).await;
        self.recompute_view();
        Ok(())
    }

    /// Switch the view filter. Derived state only, never persisted.
    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.recompute_view();
    }

    /// Update the search query. Derived state only, never persisted.
    pub fn set_search(&mut self, query: &str) {
        self.query = query.to_string();
        self.recompute_view();
    }

    /// Persist and apply a theme preference
    pub async fn update_theme(&mut self, theme: Theme) {
        self.theme = theme;
        if let Err(e) = self.store.set(config::THEME_KEY, theme.as_str()).await {
            tracing::warn!("Failed to persist theme: {}", e);
        }
        self.recompute_view();
    }

    pub async fn toggle_theme(&mut self) {
        self.update_theme(self.theme.toggled()).await;
    }

    /// Serialize the whole collection and hand it to the view for delivery
    pub async fn export_data(&mut self) -> Result<()> {
        let combined = self.combined();
        let payload = serde_json::to_string_pretty(&combined)?;
        let filename = format!("notes-export-{}.json", Utc::now().format("%Y%m%d-%H%M%S"));

        self.renderer.deliver_export(&filename, &payload);
        tracing::info!("Exported {} notes as {}", combined.len(), filename);
        self.toasts
            .show(
                format!("Exported {} notes", combined.len()),
                ToastVariant::Info,
            )
            .await;
        Ok(())
    }

    /// Replace the collection with an imported JSON array of notes.
    /// Malformed input is rejected before any state changes.
    pub async fn import_data(&mut self, text: &str, filename: &str) -> Result<()> {
        if text.len() > config::MAX_IMPORT_BYTES {
            return Err(AppError::Validation(format!(
                "{} exceeds the {} byte import limit",
                filename,
                config::MAX_IMPORT_BYTES
            )));
        }

        let notes: Vec<Note> = serde_json::from_str(text).map_err(|e| {
            AppError::Validation(format!("{} is not a valid notes export: {}", filename, e))
        })?;

        let mut seen = HashSet::new();
        for note in &notes {
            if note.id.trim().is_empty() {
                return Err(AppError::Validation(format!(
                    "{} contains a note without an id",
                    filename
                )));
            }
            if !seen.insert(note.id.as_str()) {
                return Err(AppError::Validation(format!(
                    "{} contains duplicate note id {}",
                    filename, note.id
                )));
            }
        }

        let count = notes.len();
        self.pinned = notes
            .iter()
            .filter(|n| n.pinned)
            .map(|n| (n.id.clone(), true))
            .collect();
        let (active, archived) = split_by_archived(notes);
        self.active = active;
        self.archived = archived;

        self.save_pinned().await;
        self.cache_notes().await;
        tracing::info!("Imported {} notes from {}", count, filename);
        self.toasts
            .show(format!("Imported {} notes", count), ToastVariant::Success)
            .await;
        self.recompute_view();
        Ok(())
    }

    /// React to a key written by another context: reload that slice of
    /// state and re-render. Last writer wins; there is no merging.
    pub async fn handle_storage_change(&mut self, key: &str) {
        if key == config::NOTES_KEY {
            match self.store.get_json::<Vec<Note>>(config::NOTES_KEY).await {
                Ok(Some(notes)) => {
                    let (active, archived) = split_by_archived(notes);
                    self.active = active;
                    self.archived = archived;
                    self.apply_pinned_flags();
                    self.recompute_view();
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Ignoring malformed external notes update: {}", e),
            }
        } else if key == config::THEME_KEY {
            self.theme = self.load_theme().await;
            self.recompute_view();
        } else if key == config::PINNED_KEY {
            self.load_pinned_map().await;
            self.apply_pinned_flags();
            self.recompute_view();
        }
    }

    /// Rebuild the projection: per-filter counts (always honoring the live
    /// query), the filtered and sorted list for the current filter, and
    /// position deltas against the previous render for reflow animation.
    pub fn recompute_view(&mut self) -> ViewModel {
        let combined = self.combined();

        let counts = Counts {
            all: apply_filter_and_search(&combined, Filter::All, &self.query).len(),
            active: apply_filter_and_search(&combined, Filter::Active, &self.query).len(),
            archived: apply_filter_and_search(&combined, Filter::Archived, &self.query).len(),
            pinned: apply_filter_and_search(&combined, Filter::Pinned, &self.query).len(),
        };

        let notes = sort_for_view(&apply_filter_and_search(
            &combined,
            self.filter,
            &self.query,
        ));

        let order: Vec<String> = notes.iter().map(|n| n.id.clone()).collect();
        let reflow = reflow_deltas(&self.last_order, &order);
        self.last_order = order;

        let view = ViewModel {
            filter: self.filter,
            query: self.query.clone(),
            theme: self.theme,
            notes,
            counts,
            reflow,
        };
        self.renderer.render(&view);
        view
    }

    // ===== Accessors =====

    pub fn active_notes(&self) -> &[Note] {
        &self.active
    }

    pub fn archived_notes(&self) -> &[Note] {
        &self.archived
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    // ===== Internals =====

    fn combined(&self) -> Vec<Note> {
        self.active
            .iter()
            .chain(self.archived.iter())
            .cloned()
            .collect()
    }

    fn find(&self, id: &str) -> Option<&Note> {
        self.active
            .iter()
            .chain(self.archived.iter())
            .find(|n| n.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Note> {
        self.active
            .iter_mut()
            .chain(self.archived.iter_mut())
            .find(|n| n.id == id)
    }

    async fn load_theme(&self) -> Theme {
        match self.store.get(config::THEME_KEY).await {
            Ok(Some(raw)) => raw.parse().unwrap_or_default(),
            Ok(None) => Theme::default(),
            Err(e) => {
                tracing::warn!("Failed to load theme preference: {}", e);
                Theme::default()
            }
        }
    }

    async fn load_pinned_map(&mut self) {
        self.pinned = match self
            .store
            .get_json::<HashMap<String, bool>>(config::PINNED_KEY)
            .await
        {
            Ok(Some(map)) => map,
            Ok(None) => HashMap::new(),
            Err(e) => {
                tracing::warn!("Failed to load pinned map: {}", e);
                HashMap::new()
            }
        };
    }

    /// The pinned map is the authority for pin state
    fn apply_pinned_flags(&mut self) {
        for note in self.active.iter_mut().chain(self.archived.iter_mut()) {
            note.pinned = self.pinned.get(&note.id).copied().unwrap_or(false);
        }
    }

    /// Pinned entries must only exist for ids still present in a collection
    async fn prune_pinned_map(&mut self) {
        let ids: HashSet<String> = self
            .active
            .iter()
            .chain(self.archived.iter())
            .map(|n| n.id.clone())
            .collect();

        let before = self.pinned.len();
        self.pinned.retain(|id, _| ids.contains(id));
        if self.pinned.len() != before {
            tracing::debug!("Pruned {} stale pinned entries", before - self.pinned.len());
            self.save_pinned().await;
        }
    }

    /// Storage writes are best-effort caches; a failure is logged but never
    /// fails the operation, and in-memory state stays authoritative
    async fn cache_notes(&self) {
        let combined = self.combined();
        if let Err(e) = self.store.set_json(config::NOTES_KEY, &combined).await {
            tracing::warn!("Failed to cache notes: {}", e);
        }
    }

    async fn save_pinned(&self) {
        if let Err(e) = self.store.set_json(config::PINNED_KEY, &self.pinned).await {
            tracing::warn!("Failed to persist pinned map: {}", e);
        }
    }
}
