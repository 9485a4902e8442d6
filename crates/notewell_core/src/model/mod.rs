//! Domain model for Notewell notes.
//!
//! # Responsibility
//! - Define the canonical note record shared by store, service and
//!   projection layers.
//! - Keep derived display values (metrics, previews) ephemeral and
//!   recomputed on demand.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Trash membership is represented by the `in_trash` flag, not by row
//!   removal.

pub mod metrics;
pub mod note;
