//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, trash and version-history persistence for notes.
//! - Own the reference query used by the information projection.
//!
//! # Invariants
//! - Trash is a flag (`in_trash`), never a row delete; only
//!   `delete_note` removes rows.
//! - The reference query is ordered by `content ASC, uuid ASC` and is not
//!   filtered by trash state.
//! - Content writes bump `updated_at`; sync bookkeeping does not.

use crate::db::DbError;
use crate::model::note::{Note, NoteId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    uuid,
    content,
    markdown,
    pinned,
    in_trash,
    sync_key,
    created_at,
    updated_at
FROM notes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(NoteId),
    SyncKeyConflict(NoteId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::SyncKeyConflict(id) => {
                write!(f, "note {id} already has a different sync key")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::SyncKeyConflict(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteListQuery {
    /// `false` lists active notes, `true` lists the trash.
    pub in_trash: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// One stored content snapshot from a note's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteVersion {
    /// Monotonic per-note version number, starting at 1.
    pub version: u32,
    /// Full content at snapshot time.
    pub content: String,
    /// Snapshot timestamp in epoch milliseconds.
    pub created_at: i64,
}

/// Repository interface for note persistence.
pub trait NoteRepository {
    /// Inserts one note row; timestamps are assigned by storage.
    fn create_note(&self, note: &Note) -> RepoResult<NoteId>;
    /// Replaces note content fully and bumps `updated_at`.
    fn update_content(&self, id: NoteId, content: &str) -> RepoResult<()>;
    /// Sets the markdown rendering flag.
    fn set_markdown(&self, id: NoteId, markdown: bool) -> RepoResult<()>;
    /// Sets the pinned flag.
    fn set_pinned(&self, id: NoteId, pinned: bool) -> RepoResult<()>;
    /// Moves a note in or out of the trash.
    fn set_trashed(&self, id: NoteId, trashed: bool) -> RepoResult<()>;
    /// Records the remote identity assigned by the sync engine.
    ///
    /// Idempotent for the same key; a different existing key is a conflict.
    fn mark_synced(&self, id: NoteId, sync_key: &str) -> RepoResult<()>;
    /// Permanently removes a note row and its history.
    fn delete_note(&self, id: NoteId) -> RepoResult<()>;
    /// Gets one note by id regardless of trash state.
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Lists notes for one trash state, pinned first, newest first.
    fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<Note>>;
    /// Returns notes other than `exclude` whose content contains
    /// `interlink`, ordered by `content ASC, uuid ASC`, trash included.
    fn notes_referencing(&self, interlink: &str, exclude: NoteId) -> RepoResult<Vec<Note>>;
    /// Appends one content snapshot and returns its version number.
    fn insert_version(&self, id: NoteId, content: &str) -> RepoResult<u32>;
    /// Lists a note's snapshots, newest first.
    fn list_versions(&self, id: NoteId) -> RepoResult<Vec<NoteVersion>>;
    /// Gets one snapshot by version number.
    fn get_version(&self, id: NoteId, version: u32) -> RepoResult<Option<NoteVersion>>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn set_flag(&self, id: NoteId, column: &'static str, value: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE notes
                 SET
                    {column} = ?2,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?1;"
            ),
            params![id.to_string(), bool_to_int(value)],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(&self, note: &Note) -> RepoResult<NoteId> {
        self.conn.execute(
            "INSERT INTO notes (
                uuid,
                content,
                markdown,
                pinned,
                in_trash,
                sync_key
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                note.uuid.to_string(),
                note.content.as_str(),
                bool_to_int(note.markdown),
                bool_to_int(note.pinned),
                bool_to_int(note.in_trash),
                note.sync_key.as_deref(),
            ],
        )?;

        Ok(note.uuid)
    }

    fn update_content(&self, id: NoteId, content: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET
                content = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), content],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn set_markdown(&self, id: NoteId, markdown: bool) -> RepoResult<()> {
        self.set_flag(id, "markdown", markdown)
    }

    fn set_pinned(&self, id: NoteId, pinned: bool) -> RepoResult<()> {
        self.set_flag(id, "pinned", pinned)
    }

    fn set_trashed(&self, id: NoteId, trashed: bool) -> RepoResult<()> {
        self.set_flag(id, "in_trash", trashed)
    }

    fn mark_synced(&self, id: NoteId, sync_key: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET sync_key = ?2
             WHERE uuid = ?1
               AND (sync_key IS NULL OR sync_key = ?2);",
            params![id.to_string(), sync_key],
        )?;

        if changed == 0 {
            return match self.get_note(id)? {
                Some(_) => Err(RepoError::SyncKeyConflict(id)),
                None => Err(RepoError::NotFound(id)),
            };
        }

        Ok(())
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }

        Ok(None)
    }

    fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<Note>> {
        let mut sql = format!("{NOTE_SELECT_SQL} WHERE in_trash = ?");
        let mut bind_values: Vec<Value> = vec![Value::Integer(bool_to_int(query.in_trash))];

        sql.push_str(" ORDER BY pinned DESC, updated_at DESC, uuid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notes = Vec::new();

        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }

        Ok(notes)
    }

    fn notes_referencing(&self, interlink: &str, exclude: NoteId) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE uuid != ?1
               AND instr(content, ?2) > 0
             ORDER BY content ASC, uuid ASC;"
        ))?;

        let mut rows = stmt.query(params![exclude.to_string(), interlink])?;
        let mut notes = Vec::new();

        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }

        Ok(notes)
    }

    fn insert_version(&self, id: NoteId, content: &str) -> RepoResult<u32> {
        if self.get_note(id)?.is_none() {
            return Err(RepoError::NotFound(id));
        }

        let id_text = id.to_string();
        self.conn.execute(
            "INSERT INTO note_versions (note_uuid, version, content)
             SELECT ?1, COALESCE(MAX(version), 0) + 1, ?2
             FROM note_versions
             WHERE note_uuid = ?1;",
            params![id_text.as_str(), content],
        )?;

        let version: u32 = self.conn.query_row(
            "SELECT MAX(version) FROM note_versions WHERE note_uuid = ?1;",
            [id_text.as_str()],
            |row| row.get(0),
        )?;

        Ok(version)
    }

    fn list_versions(&self, id: NoteId) -> RepoResult<Vec<NoteVersion>> {
        let mut stmt = self.conn.prepare(
            "SELECT version, content, created_at
             FROM note_versions
             WHERE note_uuid = ?1
             ORDER BY version DESC;",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        let mut versions = Vec::new();

        while let Some(row) = rows.next()? {
            versions.push(NoteVersion {
                version: row.get("version")?,
                content: row.get("content")?,
                created_at: row.get("created_at")?,
            });
        }

        Ok(versions)
    }

    fn get_version(&self, id: NoteId, version: u32) -> RepoResult<Option<NoteVersion>> {
        let mut stmt = self.conn.prepare(
            "SELECT version, content, created_at
             FROM note_versions
             WHERE note_uuid = ?1
               AND version = ?2;",
        )?;

        let mut rows = stmt.query(params![id.to_string(), version])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(NoteVersion {
                version: row.get("version")?,
                content: row.get("content")?,
                created_at: row.get("created_at")?,
            }));
        }

        Ok(None)
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in notes.uuid"))
    })?;

    Ok(Note {
        uuid,
        content: row.get("content")?,
        markdown: parse_flag(row, "markdown")?,
        pinned: parse_flag(row, "pinned")?,
        in_trash: parse_flag(row, "in_trash")?,
        sync_key: row.get("sync_key")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_flag(row: &Row<'_>, column: &'static str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in notes.{column}"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
