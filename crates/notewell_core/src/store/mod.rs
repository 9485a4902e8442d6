//! Observable note store.
//!
//! # Responsibility
//! - Own the SQLite connection and route every mutation through one
//!   commit-then-publish path.
//! - Maintain the listener registry behind token-based subscriptions.
//!
//! # Concurrency model
//! - Single-threaded, cooperative, event-driven: mutations, queries and
//!   listener callbacks all run synchronously on the caller's thread.
//! - `NoteStore` is a cheap-to-clone handle; clones share one connection
//!   and one listener registry.
//!
//! # Invariants
//! - Events are published after the write commits, never during it.
//! - `unsubscribe` is idempotent; a listener cancelled mid-dispatch is not
//!   invoked for the remainder of that dispatch.
//! - Listeners may read from the store re-entrantly; they must not mutate
//!   it while a dispatch is in flight.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::{
    NoteListQuery, NoteRepository, NoteVersion, RepoError, RepoResult, SqliteNoteRepository,
};
use crate::search::fts::{search_notes, SearchHit, SearchQuery, SearchResult};
use log::debug;
use rusqlite::Connection;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

mod events;
mod results;

pub use events::{ChangeKind, NoteEvent};
pub use results::{ReferenceEntry, ReferenceResults};

/// Listener callback invoked once per committed mutation.
pub type NoteListener = Box<dyn FnMut(&NoteEvent)>;

/// Opaque handle identifying one store subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubscriptionToken(u64);

struct StoreInner {
    conn: RefCell<Connection>,
    listeners: RefCell<BTreeMap<u64, Rc<RefCell<NoteListener>>>>,
    next_token: Cell<u64>,
}

/// Shared handle to the observable note store.
#[derive(Clone)]
pub struct NoteStore {
    inner: Rc<StoreInner>,
}

impl NoteStore {
    /// Opens a file-backed store, applying pending migrations.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens an in-memory store, applying pending migrations.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps an already-migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                conn: RefCell::new(conn),
                listeners: RefCell::new(BTreeMap::new()),
                next_token: Cell::new(1),
            }),
        }
    }

    /// Registers a listener for committed mutations.
    pub fn subscribe(&self, listener: NoteListener) -> SubscriptionToken {
        let token = self.inner.next_token.get();
        self.inner.next_token.set(token + 1);
        self.inner
            .listeners
            .borrow_mut()
            .insert(token, Rc::new(RefCell::new(listener)));
        SubscriptionToken(token)
    }

    /// Removes a listener. Unknown or already-removed tokens are ignored.
    pub fn unsubscribe(&self, token: SubscriptionToken) {
        self.inner.listeners.borrow_mut().remove(&token.0);
    }

    /// Returns the number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    // Reads

    /// Gets one note by id regardless of trash state.
    pub fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        self.with_repo(|repo| repo.get_note(id))
    }

    /// Lists notes for one trash state, pinned first, newest first.
    pub fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<Note>> {
        self.with_repo(|repo| repo.list_notes(query))
    }

    /// Runs the reference query: notes other than `exclude` whose content
    /// contains `interlink`, ordered by `content ASC, uuid ASC`.
    pub fn notes_referencing(&self, interlink: &str, exclude: NoteId) -> RepoResult<Vec<Note>> {
        self.with_repo(|repo| repo.notes_referencing(interlink, exclude))
    }

    /// Lists a note's content snapshots, newest first.
    pub fn list_versions(&self, id: NoteId) -> RepoResult<Vec<NoteVersion>> {
        self.with_repo(|repo| repo.list_versions(id))
    }

    /// Gets one content snapshot by version number.
    pub fn get_version(&self, id: NoteId, version: u32) -> RepoResult<Option<NoteVersion>> {
        self.with_repo(|repo| repo.get_version(id, version))
    }

    /// Full-text search over active note content.
    pub fn search(&self, query: &SearchQuery) -> SearchResult<Vec<SearchHit>> {
        let conn = self.inner.conn.borrow();
        search_notes(&conn, query)
    }

    // Mutations

    /// Inserts a note and publishes `Created`.
    pub fn insert_note(&self, note: &Note) -> RepoResult<Note> {
        let created = self.with_repo(|repo| {
            let id = repo.create_note(note)?;
            repo.get_note(id)?.ok_or(RepoError::NotFound(id))
        })?;
        self.publish(NoteEvent {
            id: created.uuid,
            kind: ChangeKind::Created,
        });
        Ok(created)
    }

    /// Replaces note content and publishes `Updated`.
    pub fn update_content(&self, id: NoteId, content: &str) -> RepoResult<Note> {
        let updated = self.with_repo(|repo| {
            repo.update_content(id, content)?;
            repo.get_note(id)?.ok_or(RepoError::NotFound(id))
        })?;
        self.publish(NoteEvent {
            id,
            kind: ChangeKind::Updated,
        });
        Ok(updated)
    }

    /// Sets the markdown flag and publishes `Updated`.
    pub fn set_markdown(&self, id: NoteId, markdown: bool) -> RepoResult<Note> {
        self.update_fields(id, |repo| repo.set_markdown(id, markdown))
    }

    /// Sets the pinned flag and publishes `Updated`.
    pub fn set_pinned(&self, id: NoteId, pinned: bool) -> RepoResult<Note> {
        self.update_fields(id, |repo| repo.set_pinned(id, pinned))
    }

    /// Moves a note in or out of the trash and publishes `Updated`.
    pub fn set_trashed(&self, id: NoteId, trashed: bool) -> RepoResult<Note> {
        self.update_fields(id, |repo| repo.set_trashed(id, trashed))
    }

    /// Records the sync engine's remote identity and publishes `Updated`.
    pub fn mark_synced(&self, id: NoteId, sync_key: &str) -> RepoResult<Note> {
        self.update_fields(id, |repo| repo.mark_synced(id, sync_key))
    }

    /// Appends one content snapshot to a note's history.
    ///
    /// History bookkeeping is not a note change; no event is published.
    pub fn record_version(&self, id: NoteId, content: &str) -> RepoResult<u32> {
        self.with_repo(|repo| repo.insert_version(id, content))
    }

    /// Permanently removes a note and publishes `Deleted`.
    pub fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        self.with_repo(|repo| repo.delete_note(id))?;
        self.publish(NoteEvent {
            id,
            kind: ChangeKind::Deleted,
        });
        Ok(())
    }

    fn with_repo<T>(
        &self,
        f: impl FnOnce(&SqliteNoteRepository<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let conn = self.inner.conn.borrow();
        let repo = SqliteNoteRepository::new(&conn);
        f(&repo)
    }

    fn update_fields(
        &self,
        id: NoteId,
        f: impl FnOnce(&SqliteNoteRepository<'_>) -> RepoResult<()>,
    ) -> RepoResult<Note> {
        let updated = self.with_repo(|repo| {
            f(repo)?;
            repo.get_note(id)?.ok_or(RepoError::NotFound(id))
        })?;
        self.publish(NoteEvent {
            id,
            kind: ChangeKind::Updated,
        });
        Ok(updated)
    }

    fn publish(&self, event: NoteEvent) {
        debug!(
            "event=store_publish module=store kind={:?} id={}",
            event.kind, event.id
        );

        // Snapshot first so listeners can subscribe/unsubscribe while the
        // dispatch is walking the registry.
        let snapshot: Vec<(u64, Rc<RefCell<NoteListener>>)> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(token, listener)| (*token, Rc::clone(listener)))
            .collect();

        for (token, listener) in snapshot {
            if !self.inner.listeners.borrow().contains_key(&token) {
                continue;
            }
            (*listener.borrow_mut())(&event);
        }
    }
}
