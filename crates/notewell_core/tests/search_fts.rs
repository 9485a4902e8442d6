use notewell_core::db::open_db_in_memory;
use notewell_core::{
    search_notes, Note, NoteRepository, SearchError, SearchQuery, SqliteNoteRepository,
};

#[test]
fn search_returns_created_note_with_title() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::new(&conn);
    let note = Note::new("# Groceries\nbuy rust snacks");
    repo.create_note(&note).unwrap();

    let hits = search_notes(&conn, &SearchQuery::new("rust")).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].note_id, note.uuid);
    assert_eq!(hits[0].title, "Groceries");
    assert!(hits[0].snippet.contains("rust"));
}

#[test]
fn search_reflects_updated_content() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::new(&conn);
    let note = Note::new("alpha text");
    repo.create_note(&note).unwrap();

    repo.update_content(note.uuid, "beta text").unwrap();

    let old_hits = search_notes(&conn, &SearchQuery::new("alpha")).unwrap();
    assert!(old_hits.is_empty());

    let new_hits = search_notes(&conn, &SearchQuery::new("beta")).unwrap();
    assert_eq!(new_hits.len(), 1);
    assert_eq!(new_hits[0].note_id, note.uuid);
}

#[test]
fn search_excludes_trashed_notes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::new(&conn);
    let note = Note::new("buy milk tomorrow");
    repo.create_note(&note).unwrap();
    repo.set_trashed(note.uuid, true).unwrap();

    let hits = search_notes(&conn, &SearchQuery::new("milk")).unwrap();
    assert!(hits.is_empty());

    repo.set_trashed(note.uuid, false).unwrap();
    let hits = search_notes(&conn, &SearchQuery::new("milk")).unwrap();
    assert_eq!(hits.len(), 1);
}

#[test]
fn search_limit_is_applied() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::new(&conn);
    for index in 0..5 {
        let note = Note::new(format!("token common {index}"));
        repo.create_note(&note).unwrap();
    }

    let mut query = SearchQuery::new("common");
    query.limit = 2;
    let hits = search_notes(&conn, &query).unwrap();
    assert_eq!(hits.len(), 2);
}

#[test]
fn blank_query_returns_empty_without_touching_storage() {
    let conn = open_db_in_memory().unwrap();
    let hits = search_notes(&conn, &SearchQuery::new("   ")).unwrap();
    assert!(hits.is_empty());
}

#[test]
fn quoted_terms_do_not_trip_fts_syntax() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::new(&conn);
    let note = Note::new("notes about c++ AND \"quotes\"");
    repo.create_note(&note).unwrap();

    // Operators in user text are neutralized by term quoting.
    let hits = search_notes(&conn, &SearchQuery::new("c++ AND")).unwrap();
    assert_eq!(hits.len(), 1);
}

#[test]
fn raw_syntax_reports_invalid_query() {
    let conn = open_db_in_memory().unwrap();

    let mut query = SearchQuery::new("\"unterminated");
    query.raw_fts_syntax = true;
    let err = search_notes(&conn, &query).unwrap_err();
    assert!(matches!(err, SearchError::InvalidQuery { .. }));
}
