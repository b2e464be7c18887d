use std::path::Path;

use chrono::{Duration, Utc};

use gorev::db;
use gorev::model::{Category, CategoryFilter};
use gorev::store::{TaskStore, Toggled};

fn open_store(path: &Path) -> TaskStore {
    let conn = db::open(path.to_str().unwrap()).unwrap();
    db::init(&conn).unwrap();
    TaskStore::open(conn).unwrap()
}

#[test]
fn tasks_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gorev.db");

    let mut store = open_store(&path);
    let milk = store
        .create(
            "Buy milk".to_string(),
            "2 liters".to_string(),
            Category::Shopping,
            None,
        )
        .unwrap();
    let report = store
        .create(
            "Write report".to_string(),
            String::new(),
            Category::Work,
            Some(Utc::now() + Duration::days(1)),
        )
        .unwrap();
    store.add_note(milk.id, "whole milk".to_string()).unwrap();
    store.toggle_complete(report.id).unwrap();
    drop(store);

    let store = open_store(&path);
    assert_eq!(store.tasks().len(), 2);

    let milk_again = store.get(milk.id).unwrap();
    assert_eq!(milk_again.title, "Buy milk");
    assert_eq!(milk_again.description, "2 liters");
    assert_eq!(milk_again.category, Category::Shopping);
    assert_eq!(milk_again.created_at, milk.created_at);
    assert_eq!(milk_again.notes.len(), 1);
    assert_eq!(milk_again.notes[0].content, "whole milk");
    assert_eq!(milk_again.notes[0].task_id, milk.id);

    let report_again = store.get(report.id).unwrap();
    assert!(report_again.completed);
    assert_eq!(report_again.due_date, report.due_date);
}

#[test]
fn full_lifecycle_across_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gorev.db");

    let mut store = open_store(&path);
    let task = store
        .create("Buy milk".to_string(), String::new(), Category::Shopping, None)
        .unwrap();
    assert_eq!(store.counts().pending, 1);
    drop(store);

    let mut store = open_store(&path);
    assert_eq!(
        store.toggle_complete(task.id).unwrap(),
        Some(Toggled::Completed)
    );
    assert_eq!(store.counts().completed, 1);

    let note = store.add_note(task.id, "paid cash".to_string()).unwrap().unwrap();
    assert!(store.delete_note(task.id, note.id).unwrap());
    assert!(store.get(task.id).unwrap().notes.is_empty());
    drop(store);

    let mut store = open_store(&path);
    assert!(store.delete(task.id).unwrap());
    drop(store);

    let store = open_store(&path);
    assert_eq!(store.counts().total, 0);
    assert!(store.query("", CategoryFilter::All).is_empty());
}

#[test]
fn note_order_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gorev.db");

    let mut store = open_store(&path);
    let task = store
        .create("errands".to_string(), String::new(), Category::Personal, None)
        .unwrap();
    for content in ["first", "second", "third"] {
        store.add_note(task.id, content.to_string()).unwrap();
    }
    drop(store);

    let store = open_store(&path);
    let contents: Vec<&str> = store
        .get(task.id)
        .unwrap()
        .notes
        .iter()
        .map(|n| n.content.as_str())
        .collect();
    assert_eq!(contents, vec!["first", "second", "third"]);
}

#[test]
fn corrupt_tasks_value_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gorev.db");

    let conn = db::open(path.to_str().unwrap()).unwrap();
    db::init(&conn).unwrap();
    db::set(&conn, db::KEY_TASKS, "][ definitely not json").unwrap();
    drop(conn);

    // Unreadable state loads as empty instead of failing
    let mut store = open_store(&path);
    assert!(store.tasks().is_empty());

    // The next write replaces it with a clean collection
    store
        .create("fresh start".to_string(), String::new(), Category::Work, None)
        .unwrap();
    drop(store);

    let store = open_store(&path);
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0].title, "fresh start");
}

#[test]
fn dark_mode_is_independent_of_tasks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gorev.db");

    let conn = db::open(path.to_str().unwrap()).unwrap();
    db::init(&conn).unwrap();
    assert!(!db::load_dark_mode(&conn).unwrap());
    db::save_dark_mode(&conn, true).unwrap();
    drop(conn);

    let mut store = open_store(&path);
    store
        .create("unrelated".to_string(), String::new(), Category::Work, None)
        .unwrap();
    drop(store);

    let conn = db::open(path.to_str().unwrap()).unwrap();
    assert!(db::load_dark_mode(&conn).unwrap());
}
