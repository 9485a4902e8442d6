//! Core domain logic for Notewell.
//! This crate is the single source of truth for note business invariants.

pub mod db;
pub mod format;
pub mod info;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod store;

pub use format::{format_count, format_date, format_date_time};
pub use info::{InformationController, Row, Section, SectionsObserver};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::metrics::NoteMetrics;
pub use model::note::{derive_title_preview, Note, NoteId, INTERLINK_SCHEME};
pub use repo::note_repo::{
    NoteListQuery, NoteRepository, NoteVersion, RepoError, RepoResult, SqliteNoteRepository,
};
pub use search::fts::{search_notes, SearchError, SearchHit, SearchQuery, SearchResult};
pub use service::note_service::{NoteService, ServiceError};
pub use store::{
    ChangeKind, NoteEvent, NoteStore, ReferenceEntry, ReferenceResults, SubscriptionToken,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
