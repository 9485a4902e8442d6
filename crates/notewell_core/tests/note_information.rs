use notewell_core::{InformationController, Note, NoteStore, Row, Section};
use std::cell::RefCell;
use std::rc::Rc;

fn capture(
    controller: &mut InformationController,
) -> Rc<RefCell<Vec<Vec<Section>>>> {
    let captured = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&captured);
    controller.set_observer(Some(Box::new(move |sections| {
        sink.borrow_mut().push(sections.to_vec());
    })));
    captured
}

fn metric_titles(section: &Section) -> Vec<String> {
    section
        .rows
        .iter()
        .filter_map(|row| match row {
            Row::Metric { title, .. } => Some(title.clone()),
            _ => None,
        })
        .collect()
}

fn synced_note(store: &NoteStore, content: &str, key: &str) -> Note {
    let note = store.insert_note(&Note::new(content)).unwrap();
    store.mark_synced(note.uuid, key).unwrap()
}

#[test]
fn note_without_interlink_projects_metrics_only() {
    let store = NoteStore::open_in_memory().unwrap();
    let note = store.insert_note(&Note::new("unsynced body")).unwrap();

    // Other notes exist, but an unsynced note has no token to match.
    store
        .insert_note(&Note::new("notewell://note/random pointer"))
        .unwrap();

    let controller = InformationController::new(&store, note);
    let sections = controller.sections();
    assert_eq!(sections.len(), 1);
    assert_eq!(
        metric_titles(&sections[0]),
        vec!["Modified", "Created", "Words", "Characters"]
    );
}

#[test]
fn synced_note_with_no_references_projects_single_section() {
    let store = NoteStore::open_in_memory().unwrap();
    let note = synced_note(&store, "lonely", "lone-key");

    let controller = InformationController::new(&store, note);
    assert_eq!(controller.sections().len(), 1);
}

#[test]
fn references_project_header_and_rows_in_content_order() {
    let store = NoteStore::open_in_memory().unwrap();
    let note = synced_note(&store, "popular", "pop-key");

    store
        .insert_note(&Note::new("charlie notewell://note/pop-key"))
        .unwrap();
    store
        .insert_note(&Note::new("alpha notewell://note/pop-key"))
        .unwrap();
    store
        .insert_note(&Note::new("bravo notewell://note/pop-key"))
        .unwrap();

    let controller = InformationController::new(&store, note);
    let sections = controller.sections();
    assert_eq!(sections.len(), 2);

    let reference_section = &sections[1];
    assert_eq!(reference_section.rows.len(), 4);
    assert!(matches!(
        &reference_section.rows[0],
        Row::Header { title } if title == "REFERENCED IN"
    ));

    let titles: Vec<&str> = reference_section.rows[1..]
        .iter()
        .map(|row| match row {
            Row::Reference { title, .. } => title.split_whitespace().next().unwrap(),
            other => panic!("expected reference row, got {other:?}"),
        })
        .collect();
    assert_eq!(titles, vec!["alpha", "bravo", "charlie"]);
}

#[test]
fn recompute_is_idempotent_without_store_changes() {
    let store = NoteStore::open_in_memory().unwrap();
    let note = synced_note(&store, "steady", "steady-key");
    store
        .insert_note(&Note::new("ref notewell://note/steady-key"))
        .unwrap();

    let controller = InformationController::new(&store, note);
    assert_eq!(controller.sections(), controller.sections());
}

#[test]
fn registering_observer_delivers_synchronous_snapshot() {
    let store = NoteStore::open_in_memory().unwrap();
    let note = store.insert_note(&Note::new("two words")).unwrap();

    let mut controller = InformationController::new(&store, note);
    let captured = capture(&mut controller);

    assert_eq!(captured.borrow().len(), 1, "registration must notify once");
    assert_eq!(captured.borrow()[0].len(), 1);
}

#[test]
fn creating_referencing_note_delivers_one_update() {
    let store = NoteStore::open_in_memory().unwrap();
    let note = synced_note(&store, "Hello [[World]]", "world-key");

    let mut controller = InformationController::new(&store, note);
    let captured = capture(&mut controller);
    assert_eq!(captured.borrow().len(), 1);
    assert_eq!(captured.borrow()[0].len(), 1);

    let referrer = store
        .insert_note(&Note::new("points at notewell://note/world-key"))
        .unwrap();

    let captured = captured.borrow();
    assert_eq!(captured.len(), 2, "one store commit, one callback");
    let latest = &captured[1];
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[1].rows.len(), 2);
    match &latest[1].rows[1] {
        Row::Reference {
            interlink,
            title,
            date,
        } => {
            assert_eq!(interlink.as_deref(), referrer.interlink().as_deref());
            assert!(title.starts_with("points at"));
            assert!(!date.is_empty());
        }
        other => panic!("expected reference row, got {other:?}"),
    }
}

#[test]
fn deleting_sole_reference_reverts_to_metrics_only() {
    let store = NoteStore::open_in_memory().unwrap();
    let note = synced_note(&store, "watched", "watch-key");
    let referrer = store
        .insert_note(&Note::new("only ref notewell://note/watch-key"))
        .unwrap();

    let mut controller = InformationController::new(&store, note);
    let captured = capture(&mut controller);
    assert_eq!(captured.borrow()[0].len(), 2);

    store.delete_note(referrer.uuid).unwrap();

    let captured = captured.borrow();
    assert_eq!(captured.len(), 2);
    assert_eq!(captured[1].len(), 1, "reference section must disappear");
}

#[test]
fn unrelated_changes_do_not_notify() {
    let store = NoteStore::open_in_memory().unwrap();
    let note = synced_note(&store, "quiet", "quiet-key");

    let mut controller = InformationController::new(&store, note);
    let captured = capture(&mut controller);

    store.insert_note(&Note::new("nothing to do with it")).unwrap();

    assert_eq!(captured.borrow().len(), 1, "no effective change, no callback");
}

#[test]
fn observed_note_edits_refresh_metrics() {
    let store = NoteStore::open_in_memory().unwrap();
    let note = store.insert_note(&Note::new("one two three")).unwrap();
    let id = note.uuid;

    let mut controller = InformationController::new(&store, note);
    let captured = capture(&mut controller);

    store.update_content(id, "one two three four five").unwrap();

    let captured = captured.borrow();
    assert_eq!(captured.len(), 2);
    let words = captured[1][0].rows.iter().find_map(|row| match row {
        Row::Metric { title, value } if title == "Words" => Some(value.clone()),
        _ => None,
    });
    assert_eq!(words.as_deref(), Some("5"));
}

#[test]
fn watched_note_deletion_keeps_last_snapshot() {
    let store = NoteStore::open_in_memory().unwrap();
    let note = store.insert_note(&Note::new("short lived")).unwrap();
    let id = note.uuid;

    let mut controller = InformationController::new(&store, note);
    let captured = capture(&mut controller);

    store.delete_note(id).unwrap();

    let captured = captured.borrow();
    assert_eq!(captured.len(), 2);
    assert_eq!(captured[1].len(), 1);
    assert_eq!(
        metric_titles(&captured[1][0]),
        vec!["Modified", "Created", "Words", "Characters"]
    );
}

#[test]
fn replacing_observer_swaps_callback_without_duplicates() {
    let store = NoteStore::open_in_memory().unwrap();
    let note = store.insert_note(&Note::new("swap target")).unwrap();
    let id = note.uuid;

    let mut controller = InformationController::new(&store, note);
    let first = capture(&mut controller);
    assert_eq!(store.subscription_count(), 1);

    let second = capture(&mut controller);
    assert_eq!(
        store.subscription_count(),
        1,
        "replacement must not stack subscriptions"
    );
    assert_eq!(second.borrow().len(), 1);

    store.update_content(id, "swapped").unwrap();

    assert_eq!(first.borrow().len(), 1, "replaced observer stays silent");
    assert_eq!(second.borrow().len(), 2);
}

#[test]
fn clearing_observer_releases_subscription_idempotently() {
    let store = NoteStore::open_in_memory().unwrap();
    let note = store.insert_note(&Note::new("release me")).unwrap();
    let id = note.uuid;

    let mut controller = InformationController::new(&store, note);
    let captured = capture(&mut controller);
    assert_eq!(store.subscription_count(), 1);

    controller.set_observer(None);
    controller.set_observer(None);
    assert_eq!(store.subscription_count(), 0);

    store.update_content(id, "unheard").unwrap();
    assert_eq!(captured.borrow().len(), 1);
}

#[test]
fn dropping_controller_releases_subscription() {
    let store = NoteStore::open_in_memory().unwrap();
    let note = store.insert_note(&Note::new("scoped")).unwrap();

    {
        let mut controller = InformationController::new(&store, note);
        let _captured = capture(&mut controller);
        assert_eq!(store.subscription_count(), 1);
    }

    assert_eq!(store.subscription_count(), 0);
}
