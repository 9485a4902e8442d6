//! Typed change events published by the note store.
//!
//! # Responsibility
//! - Describe committed note mutations to registered listeners.
//!
//! # Invariants
//! - Exactly one event is published per committed mutation.
//! - Trash and restore are `Updated`; only permanent removal is `Deleted`.

use crate::model::note::NoteId;
use serde::{Deserialize, Serialize};

/// Kind of committed change carried by a [`NoteEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A new note row was inserted.
    Created,
    /// An existing note's fields changed (content, flags, sync key).
    Updated,
    /// The note row was permanently removed.
    Deleted,
}

/// One committed note mutation, delivered synchronously to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    /// Identity of the changed note.
    pub id: NoteId,
    pub kind: ChangeKind,
}
