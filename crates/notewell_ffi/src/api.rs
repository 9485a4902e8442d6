//! FFI use-case API for the mobile UI shell.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Keep error semantics simple for early-stage UI integration.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every response carries a human-readable diagnostics message.

use notewell_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    InformationController, NoteService, NoteStore, Row, SearchQuery, Section,
};
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

const SEARCH_DEFAULT_LIMIT: u32 = 10;
const SEARCH_LIMIT_MAX: u32 = 50;
const DB_FILE_NAME: &str = "notewell.sqlite3";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same settings (idempotent).
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Generic action response envelope for note commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Affected note ID, when the operation has one.
    pub note_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note_id: String) -> Self {
        Self {
            ok: true,
            note_id: Some(note_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note_id: None,
            message: message.into(),
        }
    }
}

/// Search item returned by [`note_search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSearchItem {
    pub note_id: String,
    pub title: String,
    pub snippet: String,
}

/// Search response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSearchResponse {
    pub items: Vec<NoteSearchItem>,
    pub message: String,
    pub applied_limit: u32,
}

/// One display row of the note information card.
///
/// `kind` is one of `metric|reference|header`; unused fields are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoRowItem {
    pub kind: String,
    pub title: String,
    pub value: Option<String>,
    pub interlink: Option<String>,
    pub date: Option<String>,
}

/// One display section of the note information card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoSectionItem {
    pub rows: Vec<InfoRowItem>,
}

/// Response envelope for [`note_information`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteInformationResponse {
    pub sections: Vec<InfoSectionItem>,
    pub message: String,
}

/// One history snapshot row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteVersionItem {
    pub version: u32,
    pub content: String,
    pub created_at: i64,
}

/// Response envelope for [`note_history`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteHistoryResponse {
    pub versions: Vec<NoteVersionItem>,
    pub message: String,
}

/// Creates a note.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn note_create(content: String) -> NoteActionResponse {
    match with_service(|service| {
        service
            .create_note(content)
            .map(|note| note.uuid.to_string())
            .map_err(|err| err.to_string())
    }) {
        Ok(note_id) => NoteActionResponse::success("Note created.", note_id),
        Err(err) => NoteActionResponse::failure(format!("note_create failed: {err}")),
    }
}

/// Replaces a note's content, snapshotting the prior version.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn note_update(note_id: String, content: String) -> NoteActionResponse {
    match with_note(&note_id, |service, id| {
        service
            .update_note(id, content)
            .map(|note| note.uuid.to_string())
            .map_err(|err| err.to_string())
    }) {
        Ok(note_id) => NoteActionResponse::success("Note updated.", note_id),
        Err(err) => NoteActionResponse::failure(format!("note_update failed: {err}")),
    }
}

/// Moves a note into the trash.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn note_trash(note_id: String) -> NoteActionResponse {
    match with_note(&note_id, |service, id| {
        service
            .trash_note(id)
            .map(|note| note.uuid.to_string())
            .map_err(|err| err.to_string())
    }) {
        Ok(note_id) => NoteActionResponse::success("Note moved to trash.", note_id),
        Err(err) => NoteActionResponse::failure(format!("note_trash failed: {err}")),
    }
}

/// Restores a note from the trash.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn note_restore(note_id: String) -> NoteActionResponse {
    match with_note(&note_id, |service, id| {
        service
            .restore_note(id)
            .map(|note| note.uuid.to_string())
            .map_err(|err| err.to_string())
    }) {
        Ok(note_id) => NoteActionResponse::success("Note restored.", note_id),
        Err(err) => NoteActionResponse::failure(format!("note_restore failed: {err}")),
    }
}

/// Permanently deletes a note and its history.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn note_delete_forever(note_id: String) -> NoteActionResponse {
    match with_note(&note_id, |service, id| {
        service
            .delete_note_forever(id)
            .map(|()| id.to_string())
            .map_err(|err| err.to_string())
    }) {
        Ok(note_id) => NoteActionResponse::success("Note deleted.", note_id),
        Err(err) => NoteActionResponse::failure(format!("note_delete_forever failed: {err}")),
    }
}

/// Searches active notes by keyword.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns deterministic envelope with applied limit.
#[flutter_rust_bridge::frb(sync)]
pub fn note_search(text: String, limit: Option<u32>) -> NoteSearchResponse {
    let applied_limit = normalize_search_limit(limit);
    let result = with_service(|service| {
        let mut query = SearchQuery::new(text.trim().to_string());
        query.limit = applied_limit;
        service
            .store()
            .search(&query)
            .map_err(|err| err.to_string())
    });

    match result {
        Ok(hits) => {
            let items = hits
                .into_iter()
                .map(|hit| NoteSearchItem {
                    note_id: hit.note_id.to_string(),
                    title: hit.title,
                    snippet: hit.snippet,
                })
                .collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No results.".to_string()
            } else {
                format!("Found {} result(s).", items.len())
            };
            NoteSearchResponse {
                items,
                message,
                applied_limit,
            }
        }
        Err(err) => NoteSearchResponse {
            items: Vec::new(),
            message: format!("note_search failed: {err}"),
            applied_limit,
        },
    }
}

/// Computes the information card sections for one note.
///
/// The UI shell polls this on presentation; live observation stays inside
/// the Rust core.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn note_information(note_id: String) -> NoteInformationResponse {
    let result = with_note(&note_id, |service, id| {
        let note = service
            .get_note(id)
            .map_err(|err| err.to_string())?
            .ok_or_else(|| format!("note not found: {id}"))?;
        let controller = InformationController::new(service.store(), note);
        Ok(controller.sections())
    });

    match result {
        Ok(sections) => NoteInformationResponse {
            sections: sections.iter().map(to_info_section).collect(),
            message: String::new(),
        },
        Err(err) => NoteInformationResponse {
            sections: Vec::new(),
            message: format!("note_information failed: {err}"),
        },
    }
}

/// Lists a note's history snapshots, newest first.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn note_history(note_id: String) -> NoteHistoryResponse {
    let result = with_note(&note_id, |service, id| {
        service.note_history(id).map_err(|err| err.to_string())
    });

    match result {
        Ok(versions) => NoteHistoryResponse {
            versions: versions
                .into_iter()
                .map(|v| NoteVersionItem {
                    version: v.version,
                    content: v.content,
                    created_at: v.created_at,
                })
                .collect(),
            message: String::new(),
        },
        Err(err) => NoteHistoryResponse {
            versions: Vec::new(),
            message: format!("note_history failed: {err}"),
        },
    }
}

fn normalize_search_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) => SEARCH_DEFAULT_LIMIT,
        Some(value) if value > SEARCH_LIMIT_MAX => SEARCH_LIMIT_MAX,
        Some(value) => value,
        None => SEARCH_DEFAULT_LIMIT,
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("NOTEWELL_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn with_service<T>(f: impl FnOnce(&NoteService) -> Result<T, String>) -> Result<T, String> {
    let store =
        NoteStore::open(resolve_db_path()).map_err(|err| format!("DB open failed: {err}"))?;
    let service = NoteService::new(store);
    f(&service)
}

fn with_note<T>(
    note_id: &str,
    f: impl FnOnce(&NoteService, notewell_core::NoteId) -> Result<T, String>,
) -> Result<T, String> {
    let id = Uuid::parse_str(note_id.trim())
        .map_err(|_| format!("invalid note id `{note_id}`"))?;
    with_service(|service| f(service, id))
}

fn to_info_section(section: &Section) -> InfoSectionItem {
    InfoSectionItem {
        rows: section.rows.iter().map(to_info_row).collect(),
    }
}

fn to_info_row(row: &Row) -> InfoRowItem {
    match row {
        Row::Metric { title, value } => InfoRowItem {
            kind: "metric".to_string(),
            title: title.clone(),
            value: Some(value.clone()),
            interlink: None,
            date: None,
        },
        Row::Reference {
            interlink,
            title,
            date,
        } => InfoRowItem {
            kind: "reference".to_string(),
            title: title.clone(),
            value: None,
            interlink: interlink.clone(),
            date: Some(date.clone()),
        },
        Row::Header { title } => InfoRowItem {
            kind: "header".to_string(),
            title: title.clone(),
            value: None,
            interlink: None,
            date: None,
        },
    }
}
