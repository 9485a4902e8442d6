//! Note information projection.
//!
//! # Responsibility
//! - Project one note and the set of notes referencing it into
//!   display-ready sections, and keep that projection current.
//!
//! # Invariants
//! - Published sections are a pure, deterministic function of the note and
//!   the current reference rows at computation time.
//! - Sections are rebuilt wholesale on every recompute, never patched.

mod controller;
mod section;

pub use controller::{InformationController, SectionsObserver};
pub use section::{Row, Section};
