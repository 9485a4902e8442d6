//! Note use-case service.
//!
//! # Responsibility
//! - Provide note create/update/trash/history APIs over the store.
//! - Keep version snapshots consistent with content replacement.
//!
//! # Invariants
//! - `update_note` uses full content replacement semantics.
//! - Every content change snapshots the prior content first; no-op
//!   rewrites do not grow the history.
//! - Restoring a version goes through the normal update path, so the
//!   replaced content is itself snapshotted.

use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::{NoteListQuery, NoteVersion, RepoError, RepoResult};
use crate::store::NoteStore;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for note use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Requested history snapshot does not exist.
    VersionNotFound { id: NoteId, version: u32 },
    /// Sync key input is blank.
    EmptySyncKey,
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::VersionNotFound { id, version } => {
                write!(f, "version {version} not found for note {id}")
            }
            Self::EmptySyncKey => write!(f, "sync key cannot be empty"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NoteNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Note service facade over the observable store.
pub struct NoteService {
    store: NoteStore,
}

impl NoteService {
    /// Creates a service sharing the provided store handle.
    pub fn new(store: NoteStore) -> Self {
        Self { store }
    }

    /// The underlying store handle, for observation APIs.
    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    /// Creates one note from raw content.
    pub fn create_note(&self, content: impl Into<String>) -> Result<Note, ServiceError> {
        let note = Note::new(content);
        let created = self.store.insert_note(&note)?;
        info!(
            "event=note_create module=service status=ok id={}",
            created.uuid
        );
        Ok(created)
    }

    /// Replaces note content fully, snapshotting the prior content.
    pub fn update_note(
        &self,
        id: NoteId,
        content: impl Into<String>,
    ) -> Result<Note, ServiceError> {
        let content = content.into();
        let current = self.store.get_note(id)?.ok_or(ServiceError::NoteNotFound(id))?;

        if current.content != content {
            self.store.record_version(id, &current.content)?;
        }

        Ok(self.store.update_content(id, &content)?)
    }

    /// Gets one note by stable ID.
    pub fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        self.store.get_note(id)
    }

    /// Lists notes for one trash state with pagination.
    pub fn list_notes(
        &self,
        in_trash: bool,
        limit: Option<u32>,
        offset: u32,
    ) -> RepoResult<Vec<Note>> {
        self.store.list_notes(&NoteListQuery {
            in_trash,
            limit,
            offset,
        })
    }

    /// Lists a note's history snapshots, newest first.
    pub fn note_history(&self, id: NoteId) -> Result<Vec<NoteVersion>, ServiceError> {
        if self.store.get_note(id)?.is_none() {
            return Err(ServiceError::NoteNotFound(id));
        }
        Ok(self.store.list_versions(id)?)
    }

    /// Replaces current content with a historical snapshot.
    pub fn restore_version(&self, id: NoteId, version: u32) -> Result<Note, ServiceError> {
        let snapshot = self
            .store
            .get_version(id, version)?
            .ok_or(ServiceError::VersionNotFound { id, version })?;
        info!(
            "event=note_restore_version module=service status=ok id={id} version={version}"
        );
        self.update_note(id, snapshot.content)
    }

    /// Moves a note into the trash.
    pub fn trash_note(&self, id: NoteId) -> Result<Note, ServiceError> {
        info!("event=note_trash module=service status=ok id={id}");
        Ok(self.store.set_trashed(id, true)?)
    }

    /// Restores a note from the trash.
    pub fn restore_note(&self, id: NoteId) -> Result<Note, ServiceError> {
        info!("event=note_restore module=service status=ok id={id}");
        Ok(self.store.set_trashed(id, false)?)
    }

    /// Permanently deletes a note and its history.
    pub fn delete_note_forever(&self, id: NoteId) -> Result<(), ServiceError> {
        info!("event=note_delete module=service status=ok id={id}");
        Ok(self.store.delete_note(id)?)
    }

    /// Toggles markdown rendering for the editor.
    pub fn set_markdown(&self, id: NoteId, markdown: bool) -> Result<Note, ServiceError> {
        Ok(self.store.set_markdown(id, markdown)?)
    }

    /// Pins or unpins a note in list views.
    pub fn set_pinned(&self, id: NoteId, pinned: bool) -> Result<Note, ServiceError> {
        Ok(self.store.set_pinned(id, pinned)?)
    }

    /// Records the remote identity assigned by the sync engine.
    ///
    /// The interlink token other notes use to reference this note derives
    /// from this key.
    pub fn mark_synced(&self, id: NoteId, sync_key: &str) -> Result<Note, ServiceError> {
        let trimmed = sync_key.trim();
        if trimmed.is_empty() {
            return Err(ServiceError::EmptySyncKey);
        }
        Ok(self.store.mark_synced(id, trimmed)?)
    }
}
