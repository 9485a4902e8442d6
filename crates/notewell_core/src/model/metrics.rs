//! Derived note metrics.
//!
//! # Responsibility
//! - Compute word/character counts and lifecycle dates for display.
//!
//! # Invariants
//! - Metrics are ephemeral: recomputed from the note on every request,
//!   never cached or persisted.

use crate::model::note::Note;

/// Display metrics computed on demand from a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteMetrics {
    /// Whitespace-delimited word count.
    pub words: usize,
    /// Unicode scalar count of the raw content.
    pub characters: usize,
    /// Creation timestamp in epoch milliseconds.
    pub created_at: i64,
    /// Last modification timestamp in epoch milliseconds.
    pub modified_at: i64,
}

impl NoteMetrics {
    /// Computes metrics from the note's current content and timestamps.
    pub fn of(note: &Note) -> Self {
        Self {
            words: note.content.split_whitespace().count(),
            characters: note.content.chars().count(),
            created_at: note.created_at,
            modified_at: note.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NoteMetrics;
    use crate::model::note::Note;

    #[test]
    fn counts_words_and_characters() {
        let note = Note::new("one two  three\nfour");
        let metrics = NoteMetrics::of(&note);
        assert_eq!(metrics.words, 4);
        assert_eq!(metrics.characters, 19);
    }

    #[test]
    fn empty_content_counts_zero() {
        let note = Note::new("");
        let metrics = NoteMetrics::of(&note);
        assert_eq!(metrics.words, 0);
        assert_eq!(metrics.characters, 0);
    }

    #[test]
    fn counts_unicode_scalars_not_bytes() {
        let note = Note::new("héllo wörld");
        let metrics = NoteMetrics::of(&note);
        assert_eq!(metrics.words, 2);
        assert_eq!(metrics.characters, 11);
    }
}
