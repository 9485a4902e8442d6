//! Full-text search entry points.
//!
//! # Responsibility
//! - Expose keyword search over note content backed by the FTS5 index.
//! - Keep search result shaping inside core.

pub mod fts;
