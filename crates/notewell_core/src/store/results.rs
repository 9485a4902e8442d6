//! Live reference query over the note store.
//!
//! # Responsibility
//! - Hold the current result set of the "notes referencing X" query and
//!   detect effective changes on refresh.
//!
//! # Invariants
//! - Entries mirror the repository's `content ASC, uuid ASC` ordering.
//! - A failed refresh keeps the previous snapshot and reports no change.

use crate::format::format_date;
use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::RepoResult;
use crate::store::NoteStore;
use log::debug;

/// One reference row snapshot, reduced to the fields the display needs.
///
/// Equality over these fields is what "effective change" means: a store
/// write that leaves every entry identical does not count as a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    /// Identity of the referencing note.
    pub id: NoteId,
    /// The referencing note's own interlink, for downstream navigation.
    pub interlink: Option<String>,
    /// Display title derived from the referencing note's content.
    pub title: String,
    /// Last modification timestamp in epoch milliseconds.
    pub modified_at: i64,
}

impl ReferenceEntry {
    fn from_note(note: &Note) -> Self {
        Self {
            id: note.uuid,
            interlink: note.interlink(),
            title: note.title_preview(),
            modified_at: note.updated_at,
        }
    }

    /// Formats the modification date for reference rows.
    pub fn formatted_date(&self) -> String {
        format_date(self.modified_at)
    }
}

/// Explicit live query: re-fetched on demand, diffed against the previous
/// snapshot so consumers are informed only on effective change.
pub struct ReferenceResults {
    store: NoteStore,
    interlink: String,
    exclude: NoteId,
    entries: Vec<ReferenceEntry>,
}

impl ReferenceResults {
    /// Runs the query eagerly and captures the initial snapshot.
    pub fn fetch(
        store: &NoteStore,
        interlink: impl Into<String>,
        exclude: NoteId,
    ) -> RepoResult<Self> {
        let mut results = Self {
            store: store.clone(),
            interlink: interlink.into(),
            exclude,
            entries: Vec::new(),
        };
        results.entries = results.run_query()?;
        Ok(results)
    }

    /// Re-runs the query; returns `true` when the visible rows changed.
    ///
    /// Query failure is swallowed: the previous snapshot stays current and
    /// no change is reported.
    pub fn refresh(&mut self) -> bool {
        match self.run_query() {
            Ok(next) => {
                if next == self.entries {
                    false
                } else {
                    self.entries = next;
                    true
                }
            }
            Err(err) => {
                debug!("event=reference_refresh module=store status=error error={err}");
                false
            }
        }
    }

    /// Current snapshot in query order.
    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The interlink token this query matches against.
    pub fn interlink(&self) -> &str {
        &self.interlink
    }

    fn run_query(&self) -> RepoResult<Vec<ReferenceEntry>> {
        let notes = self
            .store
            .notes_referencing(&self.interlink, self.exclude)?;
        Ok(notes.iter().map(ReferenceEntry::from_note).collect())
    }
}
