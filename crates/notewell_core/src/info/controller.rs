//! Information controller: observes one note and republishes its display
//! model.
//!
//! # Responsibility
//! - Compute the metrics section and the reference section for one note.
//! - Subscribe to store events and push a freshly rebuilt section list to
//!   the registered observer on every effective change.
//!
//! # Invariants
//! - At most one observer is registered at a time; replacing it swaps the
//!   callback without tearing down the store subscription.
//! - Registering an observer delivers one synchronous callback before any
//!   change-driven one.
//! - One store event produces at most one observer callback.
//! - Observer callbacks must not call back into the controller.

use crate::format::{format_count, format_date_time};
use crate::info::section::{Row, Section};
use crate::model::metrics::NoteMetrics;
use crate::model::note::Note;
use crate::store::{NoteStore, ReferenceResults, SubscriptionToken};
use log::debug;
use std::cell::RefCell;
use std::rc::Rc;

/// Observer callback receiving the rebuilt section list.
pub type SectionsObserver = Box<dyn FnMut(&[Section])>;

mod labels {
    pub const MODIFIED: &str = "Modified";
    pub const CREATED: &str = "Created";
    pub const WORDS: &str = "Words";
    pub const CHARACTERS: &str = "Characters";
    pub const REFERENCES: &str = "REFERENCED IN";
}

/// Watches one note and the notes referencing it, projecting both into
/// display sections.
pub struct InformationController {
    store: NoteStore,
    note: Rc<RefCell<Note>>,
    references: Option<Rc<RefCell<ReferenceResults>>>,
    observer: Rc<RefCell<Option<SectionsObserver>>>,
    subscription: Option<SubscriptionToken>,
}

impl InformationController {
    /// Builds a controller for `note`.
    ///
    /// A note without an interlink never gets a reference query: the
    /// projection stays metrics-only for its whole lifetime. A reference
    /// query that fails to run is attempted once and silently dropped.
    pub fn new(store: &NoteStore, note: Note) -> Self {
        let references = note.interlink().and_then(|interlink| {
            match ReferenceResults::fetch(store, interlink, note.uuid) {
                Ok(results) => Some(Rc::new(RefCell::new(results))),
                Err(err) => {
                    debug!(
                        "event=reference_query module=info status=error id={} error={err}",
                        note.uuid
                    );
                    None
                }
            }
        });

        Self {
            store: store.clone(),
            note: Rc::new(RefCell::new(note)),
            references,
            observer: Rc::new(RefCell::new(None)),
            subscription: None,
        }
    }

    /// Registers the single observer, or unregisters it with `None`.
    ///
    /// A newly registered observer is immediately invoked once,
    /// synchronously, with the current sections. Passing `None` releases
    /// the store subscription; doing so repeatedly is a no-op.
    pub fn set_observer(&mut self, observer: Option<SectionsObserver>) {
        match observer {
            Some(callback) => {
                *self.observer.borrow_mut() = Some(callback);
                self.refresh_snapshots();
                self.notify();
                self.start_listening();
            }
            None => {
                *self.observer.borrow_mut() = None;
                self.stop_listening();
            }
        }
    }

    /// Computes the current section list without touching the store.
    pub fn sections(&self) -> Vec<Section> {
        let note = self.note.borrow();
        let references = self.references.as_ref().map(|cell| cell.borrow());
        build_sections(&note, references.as_deref())
    }

    fn refresh_snapshots(&self) {
        let note_id = self.note.borrow().uuid;
        if let Ok(Some(fresh)) = self.store.get_note(note_id) {
            *self.note.borrow_mut() = fresh;
        }
        if let Some(results) = self.references.as_ref() {
            results.borrow_mut().refresh();
        }
    }

    fn notify(&self) {
        let sections = self.sections();
        if let Some(callback) = self.observer.borrow_mut().as_mut() {
            callback(&sections);
        }
    }

    fn start_listening(&mut self) {
        if self.subscription.is_some() {
            return;
        }

        let store = self.store.clone();
        let note = Rc::clone(&self.note);
        let references = self.references.clone();
        let observer = Rc::clone(&self.observer);
        let note_id = self.note.borrow().uuid;

        let token = self.store.subscribe(Box::new(move |event| {
            let mut dirty = event.id == note_id;
            if dirty {
                // A note that vanished keeps projecting its last snapshot.
                if let Ok(Some(fresh)) = store.get_note(note_id) {
                    *note.borrow_mut() = fresh;
                }
            }

            if let Some(results) = references.as_ref() {
                if results.borrow_mut().refresh() {
                    dirty = true;
                }
            }

            if !dirty {
                return;
            }

            let sections = {
                let note = note.borrow();
                let references = references.as_ref().map(|cell| cell.borrow());
                build_sections(&note, references.as_deref())
            };
            if let Some(callback) = observer.borrow_mut().as_mut() {
                callback(&sections);
            }
        }));

        self.subscription = Some(token);
    }

    fn stop_listening(&mut self) {
        if let Some(token) = self.subscription.take() {
            self.store.unsubscribe(token);
        }
    }
}

impl Drop for InformationController {
    fn drop(&mut self) {
        self.stop_listening();
    }
}

fn build_sections(note: &Note, references: Option<&ReferenceResults>) -> Vec<Section> {
    let mut sections = vec![metric_section(note)];
    if let Some(section) = references.and_then(reference_section) {
        sections.push(section);
    }
    sections
}

fn metric_section(note: &Note) -> Section {
    let metrics = NoteMetrics::of(note);
    Section {
        rows: vec![
            Row::Metric {
                title: labels::MODIFIED.to_string(),
                value: format_date_time(metrics.modified_at),
            },
            Row::Metric {
                title: labels::CREATED.to_string(),
                value: format_date_time(metrics.created_at),
            },
            Row::Metric {
                title: labels::WORDS.to_string(),
                value: format_count(metrics.words),
            },
            Row::Metric {
                title: labels::CHARACTERS.to_string(),
                value: format_count(metrics.characters),
            },
        ],
    }
}

fn reference_section(references: &ReferenceResults) -> Option<Section> {
    if references.is_empty() {
        return None;
    }

    let mut rows = Vec::with_capacity(references.entries().len() + 1);
    rows.push(Row::Header {
        title: labels::REFERENCES.to_string(),
    });
    for entry in references.entries() {
        rows.push(Row::Reference {
            interlink: entry.interlink.clone(),
            title: entry.title.clone(),
            date: entry.formatted_date(),
        });
    }

    Some(Section { rows })
}
