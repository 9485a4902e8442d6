use notewell_core::{ChangeKind, Note, NoteStore, ReferenceResults, SubscriptionToken};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[test]
fn each_mutation_publishes_one_typed_event() {
    let store = NoteStore::open_in_memory().unwrap();
    let events = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&events);
    store.subscribe(Box::new(move |event| {
        sink.borrow_mut().push((event.id, event.kind));
    }));

    let note = store.insert_note(&Note::new("watched")).unwrap();
    store.update_content(note.uuid, "edited").unwrap();
    store.set_trashed(note.uuid, true).unwrap();
    store.record_version(note.uuid, "edited").unwrap();
    store.delete_note(note.uuid).unwrap();

    let seen = events.borrow();
    assert_eq!(
        seen.iter().map(|(_, kind)| *kind).collect::<Vec<_>>(),
        vec![
            ChangeKind::Created,
            ChangeKind::Updated,
            ChangeKind::Updated,
            ChangeKind::Deleted,
        ],
        "version bookkeeping must not publish"
    );
    assert!(seen.iter().all(|(id, _)| *id == note.uuid));
}

#[test]
fn unsubscribe_stops_delivery_and_is_idempotent() {
    let store = NoteStore::open_in_memory().unwrap();
    let count = Rc::new(Cell::new(0usize));

    let sink = Rc::clone(&count);
    let token = store.subscribe(Box::new(move |_| sink.set(sink.get() + 1)));
    assert_eq!(store.subscription_count(), 1);

    store.insert_note(&Note::new("one")).unwrap();
    assert_eq!(count.get(), 1);

    store.unsubscribe(token);
    store.unsubscribe(token);
    assert_eq!(store.subscription_count(), 0);

    store.insert_note(&Note::new("two")).unwrap();
    assert_eq!(count.get(), 1);
}

#[test]
fn listener_cancelled_mid_dispatch_is_skipped() {
    let store = NoteStore::open_in_memory().unwrap();
    let victim_token: Rc<Cell<Option<SubscriptionToken>>> = Rc::new(Cell::new(None));
    let victim_fired = Rc::new(Cell::new(false));

    let canceller_store = store.clone();
    let cancel_target = Rc::clone(&victim_token);
    store.subscribe(Box::new(move |_| {
        if let Some(token) = cancel_target.get() {
            canceller_store.unsubscribe(token);
        }
    }));

    let fired = Rc::clone(&victim_fired);
    let token = store.subscribe(Box::new(move |_| fired.set(true)));
    victim_token.set(Some(token));

    store.insert_note(&Note::new("trigger")).unwrap();
    assert!(
        !victim_fired.get(),
        "listener removed during dispatch must not run"
    );
}

#[test]
fn listeners_can_read_the_store_reentrantly() {
    let store = NoteStore::open_in_memory().unwrap();
    let observed = Rc::new(RefCell::new(None));

    let reader = store.clone();
    let sink = Rc::clone(&observed);
    store.subscribe(Box::new(move |event| {
        *sink.borrow_mut() = reader.get_note(event.id).unwrap();
    }));

    let note = store.insert_note(&Note::new("readable")).unwrap();
    assert_eq!(
        observed.borrow().as_ref().map(|n: &Note| n.uuid),
        Some(note.uuid)
    );
}

#[test]
fn reference_results_detect_membership_changes() {
    let store = NoteStore::open_in_memory().unwrap();
    let target = store.insert_note(&Note::new("target")).unwrap();

    let mut results =
        ReferenceResults::fetch(&store, "notewell://note/tk", target.uuid).unwrap();
    assert!(results.is_empty());
    assert!(!results.refresh(), "no store change means no effective change");

    let referrer = store
        .insert_note(&Note::new("see notewell://note/tk"))
        .unwrap();
    assert!(results.refresh());
    assert_eq!(results.entries().len(), 1);
    assert_eq!(results.entries()[0].id, referrer.uuid);

    store.delete_note(referrer.uuid).unwrap();
    assert!(results.refresh());
    assert!(results.is_empty());
}

#[test]
fn reference_results_ignore_invisible_writes() {
    let store = NoteStore::open_in_memory().unwrap();
    let target = store.insert_note(&Note::new("target")).unwrap();
    let referrer = store
        .insert_note(&Note::new("see notewell://note/tk"))
        .unwrap();

    let mut results =
        ReferenceResults::fetch(&store, "notewell://note/tk", target.uuid).unwrap();
    assert_eq!(results.entries().len(), 1);

    // Assigning the same sync key twice leaves every visible field alone.
    store.mark_synced(referrer.uuid, "rk").unwrap();
    assert!(results.refresh(), "gaining an interlink is a visible change");
    store.mark_synced(referrer.uuid, "rk").unwrap();
    assert!(!results.refresh(), "idempotent re-sync is not a change");
}

#[test]
fn reference_results_track_row_order() {
    let store = NoteStore::open_in_memory().unwrap();
    let target = store.insert_note(&Note::new("target")).unwrap();
    store
        .insert_note(&Note::new("bravo notewell://note/tk"))
        .unwrap();
    let alpha = store
        .insert_note(&Note::new("alpha notewell://note/tk"))
        .unwrap();

    let mut results =
        ReferenceResults::fetch(&store, "notewell://note/tk", target.uuid).unwrap();
    let titles: Vec<&str> = results
        .entries()
        .iter()
        .map(|entry| entry.title.as_str())
        .collect();
    assert_eq!(titles[0].split_whitespace().next(), Some("alpha"));
    assert_eq!(titles[1].split_whitespace().next(), Some("bravo"));

    // Renaming a referrer reorders the result set.
    store
        .update_content(alpha.uuid, "zulu notewell://note/tk")
        .unwrap();
    assert!(results.refresh());
    assert_eq!(
        results.entries()[1].title.split_whitespace().next(),
        Some("zulu")
    );
}
