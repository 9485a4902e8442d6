//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record and its lifecycle helpers.
//! - Derive the interlink token and title preview used by reference
//!   displays.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another note.
//! - `sync_key`, once assigned by the sync engine, stays fixed for the
//!   note's lifetime.
//! - An interlink exists only for notes that have a `sync_key`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for every note row.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NoteId = Uuid;

/// URL scheme prefix shared by all note interlinks.
pub const INTERLINK_SCHEME: &str = "notewell://note/";

const TITLE_PREVIEW_MAX_CHARS: usize = 64;
const UNTITLED_PREVIEW: &str = "New Note";

static LEADING_MARKDOWN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[#>\s\-\*\+]+").expect("valid leading markdown regex"));
static INLINE_MARKDOWN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\*_`~\[\]]+").expect("valid inline markdown regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Canonical note record.
///
/// Timestamps are epoch milliseconds and are assigned by the persistence
/// layer on insert/update; callers never set them directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable local ID used for storage, events and auditing.
    pub uuid: NoteId,
    /// Raw note body, markdown or plain text.
    pub content: String,
    /// Whether the editor should render this note as markdown.
    pub markdown: bool,
    /// Pinned notes sort ahead of the rest in list views.
    pub pinned: bool,
    /// Trash membership flag. Trashed notes stay queryable.
    pub in_trash: bool,
    /// Remote identity assigned by the sync engine after first upload.
    /// `None` until the note has been synced at least once.
    pub sync_key: Option<String>,
    /// Creation timestamp in epoch milliseconds.
    pub created_at: i64,
    /// Last modification timestamp in epoch milliseconds.
    pub updated_at: i64,
}

impl Note {
    /// Creates a new unsynced note with a generated stable ID.
    ///
    /// Timestamps start at zero; the repository replaces them with real
    /// values when the note is persisted.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            content: content.into(),
            markdown: false,
            pinned: false,
            in_trash: false,
            sync_key: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Returns the interlink token other notes use to reference this one.
    ///
    /// Notes without a `sync_key` have no derivable interlink.
    pub fn interlink(&self) -> Option<String> {
        self.sync_key
            .as_deref()
            .map(|key| format!("{INTERLINK_SCHEME}{key}"))
    }

    /// Returns the display title derived from the first content line.
    pub fn title_preview(&self) -> String {
        derive_title_preview(&self.content)
    }

    /// Moves this note into the trash.
    pub fn trash(&mut self) {
        self.in_trash = true;
    }

    /// Restores this note from the trash.
    pub fn restore(&mut self) {
        self.in_trash = false;
    }

    /// Returns whether this note belongs in active (non-trash) lists.
    pub fn is_active(&self) -> bool {
        !self.in_trash
    }
}

/// Derives a human title from raw note content.
///
/// Rules:
/// - First non-blank line wins.
/// - Leading markdown markers and inline emphasis symbols are stripped.
/// - Whitespace is collapsed; output is capped at 64 chars.
/// - Blank content falls back to `"New Note"`.
pub fn derive_title_preview(content: &str) -> String {
    let first_line = content.lines().find(|line| !line.trim().is_empty());
    let Some(line) = first_line else {
        return UNTITLED_PREVIEW.to_string();
    };

    let without_leading = LEADING_MARKDOWN_RE.replace(line, "");
    let without_inline = INLINE_MARKDOWN_RE.replace_all(&without_leading, "");
    let normalized = WHITESPACE_RE.replace_all(&without_inline, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return UNTITLED_PREVIEW.to_string();
    }

    trimmed.chars().take(TITLE_PREVIEW_MAX_CHARS).collect()
}
