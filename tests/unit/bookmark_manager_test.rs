//! Unit tests for the BookmarkManager public API.
//!
//! These tests exercise bookmark CRUD, relocation and bulk operations through
//! the `BookmarkManagerTrait` interface, using an in-memory SQLite database.

use topicmarks::database::Database;
use topicmarks::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use topicmarks::managers::topic_manager::{TopicManager, TopicManagerTrait};
use topicmarks::types::bookmark::{BookmarkQuery, BulkMoveSummary};
use topicmarks::types::errors::BookmarkError;
use topicmarks::types::settings::EngineSettings;

fn setup() -> (Database, EngineSettings) {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    (db, EngineSettings::default())
}

fn topic(db: &Database, settings: &EngineSettings, segments: &[&str]) -> String {
    let path: Vec<String> = segments.iter().map(|s| s.to_string()).collect();
    TopicManager::new(db.connection(), settings)
        .resolve_path(&path)
        .unwrap()
        .id
}

#[test]
fn test_add_bookmark_defaults_to_root_and_trims() {
    let (db, settings) = setup();
    let mut mgr = BookmarkManager::new(db.connection(), &settings);
    let root = TopicManager::new(db.connection(), &settings).root().unwrap();

    let bm = mgr
        .add_bookmark("  https://example.com  ", "  Example ", None, Some("  "))
        .unwrap();
    assert_eq!(bm.url, "https://example.com");
    assert_eq!(bm.title, "Example");
    assert_eq!(bm.topic_id, root.id);
    assert_eq!(bm.notes, None);
    assert_eq!(mgr.get_bookmark(&bm.id).unwrap(), bm);
}

#[test]
fn test_add_bookmark_blank_title_falls_back_to_url() {
    let (db, settings) = setup();
    let mut mgr = BookmarkManager::new(db.connection(), &settings);
    let bm = mgr.add_bookmark("http://x", "   ", None, None).unwrap();
    assert_eq!(bm.title, "http://x");
}

#[test]
fn test_add_bookmark_validation() {
    let (db, settings) = setup();
    let mut mgr = BookmarkManager::new(db.connection(), &settings);

    assert!(matches!(mgr.add_bookmark("  ", "T", None, None), Err(BookmarkError::MissingUrl)));
    assert!(matches!(
        mgr.add_bookmark("http://x", "T", Some("missing"), None),
        Err(BookmarkError::TopicNotFound(_))
    ));

    mgr.add_bookmark("http://x", "T", None, None).unwrap();
    assert!(matches!(
        mgr.add_bookmark("http://x", "Again", None, None),
        Err(BookmarkError::DuplicateUrl(_))
    ));
}

#[test]
fn test_same_url_allowed_in_different_topics() {
    let (db, settings) = setup();
    let work = topic(&db, &settings, &["Work"]);
    let mut mgr = BookmarkManager::new(db.connection(), &settings);
    mgr.add_bookmark("http://x", "Root copy", None, None).unwrap();
    mgr.add_bookmark("http://x", "Work copy", Some(&work), None).unwrap();
}

#[test]
fn test_update_bookmark() {
    let (db, settings) = setup();
    let mut mgr = BookmarkManager::new(db.connection(), &settings);
    let bm = mgr.add_bookmark("http://old", "Old", None, Some("note")).unwrap();
    mgr.add_bookmark("http://taken", "Taken", None, None).unwrap();

    let updated = mgr
        .update_bookmark(&bm.id, Some("http://new"), Some("New"), None)
        .unwrap();
    assert_eq!(updated.url, "http://new");
    assert_eq!(updated.title, "New");
    assert_eq!(updated.notes.as_deref(), Some("note"));

    let cleared = mgr.update_bookmark(&bm.id, None, None, Some("")).unwrap();
    assert_eq!(cleared.notes, None);

    assert!(matches!(
        mgr.update_bookmark(&bm.id, Some("http://taken"), None, None),
        Err(BookmarkError::DuplicateUrl(_))
    ));
    assert!(matches!(
        mgr.update_bookmark(&bm.id, Some(" "), None, None),
        Err(BookmarkError::MissingUrl)
    ));
    assert!(matches!(
        mgr.update_bookmark("missing", None, Some("x"), None),
        Err(BookmarkError::NotFound(_))
    ));
}

#[test]
fn test_remove_bookmark() {
    let (db, settings) = setup();
    let mut mgr = BookmarkManager::new(db.connection(), &settings);
    let bm = mgr.add_bookmark("http://x", "X", None, None).unwrap();

    mgr.remove_bookmark(&bm.id).unwrap();
    assert!(matches!(mgr.get_bookmark(&bm.id), Err(BookmarkError::NotFound(_))));
    assert!(matches!(mgr.remove_bookmark(&bm.id), Err(BookmarkError::NotFound(_))));
}

#[test]
fn test_move_bookmark_between_topics() {
    let (db, settings) = setup();
    let a = topic(&db, &settings, &["A"]);
    let b = topic(&db, &settings, &["B"]);
    let mut mgr = BookmarkManager::new(db.connection(), &settings);
    let bm = mgr.add_bookmark("http://x", "X", Some(&a), None).unwrap();

    mgr.move_bookmark(&bm.id, &b).unwrap();
    assert_eq!(mgr.get_bookmark(&bm.id).unwrap().topic_id, b);

    // Same topic is a no-op.
    mgr.move_bookmark(&bm.id, &b).unwrap();
}

#[test]
fn test_move_bookmark_errors_leave_it_in_place() {
    let (db, settings) = setup();
    let a = topic(&db, &settings, &["A"]);
    let b = topic(&db, &settings, &["B"]);
    let mut mgr = BookmarkManager::new(db.connection(), &settings);
    let moving = mgr.add_bookmark("http://dup", "Moving", Some(&a), None).unwrap();
    mgr.add_bookmark("http://dup", "Resident", Some(&b), None).unwrap();

    let err = mgr.move_bookmark(&moving.id, "missing").unwrap_err();
    assert_eq!(err.code(), "target_not_found");
    assert!(matches!(
        mgr.move_bookmark(&moving.id, &b),
        Err(BookmarkError::DuplicateUrl(_))
    ));
    assert!(matches!(
        mgr.move_bookmark("missing", &b),
        Err(BookmarkError::NotFound(_))
    ));
    assert_eq!(mgr.get_bookmark(&moving.id).unwrap().topic_id, a);
}

#[test]
fn test_bulk_delete_skips_unknown_ids() {
    let (db, settings) = setup();
    let mut mgr = BookmarkManager::new(db.connection(), &settings);
    let one = mgr.add_bookmark("http://1", "1", None, None).unwrap();
    let two = mgr.add_bookmark("http://2", "2", None, None).unwrap();
    let three = mgr.add_bookmark("http://3", "3", None, None).unwrap();

    let removed = mgr
        .bulk_delete(&[one.id.clone(), "nope".to_string(), three.id.clone()])
        .unwrap();
    assert_eq!(removed, 2);
    assert!(mgr.get_bookmark(&two.id).is_ok());
    assert!(mgr.get_bookmark(&one.id).is_err());
}

#[test]
fn test_bulk_move_skips_clashing_pairs() {
    let (db, settings) = setup();
    let a = topic(&db, &settings, &["A"]);
    let b = topic(&db, &settings, &["B"]);
    let mut mgr = BookmarkManager::new(db.connection(), &settings);
    let free = mgr.add_bookmark("http://free", "Free", Some(&a), None).unwrap();
    let clash = mgr.add_bookmark("http://dup", "Clash", Some(&a), None).unwrap();
    mgr.add_bookmark("http://dup", "Resident", Some(&b), None).unwrap();

    let summary = mgr
        .bulk_move(&[free.id.clone(), clash.id.clone(), "missing".to_string()], &b)
        .unwrap();
    assert_eq!(summary, BulkMoveSummary { moved: 1, skipped: 1 });
    assert_eq!(mgr.get_bookmark(&free.id).unwrap().topic_id, b);
    assert_eq!(mgr.get_bookmark(&clash.id).unwrap().topic_id, a);

    assert!(matches!(
        mgr.bulk_move(&[free.id.clone()], "missing"),
        Err(BookmarkError::TopicNotFound(_))
    ));
}

#[test]
fn test_list_bookmarks_filters() {
    let (db, settings) = setup();
    let work = topic(&db, &settings, &["Work"]);
    let deep = topic(&db, &settings, &["Work", "Deep"]);
    let mut mgr = BookmarkManager::new(db.connection(), &settings);
    mgr.add_bookmark("https://docs.rs/serde", "serde docs", Some(&work), None).unwrap();
    mgr.add_bookmark("https://crates.io/csv", "Csv crate", Some(&deep), None).unwrap();
    mgr.add_bookmark("https://example.com", "Example", None, None).unwrap();

    let everything = mgr.list_bookmarks(&BookmarkQuery::default()).unwrap();
    let titles: Vec<&str> = everything.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Csv crate", "Example", "serde docs"]);

    let only_work = mgr
        .list_bookmarks(&BookmarkQuery {
            topic_id: Some(work.clone()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(only_work.len(), 1);

    let subtree = mgr
        .list_bookmarks(&BookmarkQuery {
            topic_id: Some(work.clone()),
            include_subtopics: true,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(subtree.len(), 2);

    let by_text = mgr
        .list_bookmarks(&BookmarkQuery {
            text: Some("SERDE".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_text.len(), 1);

    let by_domain = mgr
        .list_bookmarks(&BookmarkQuery {
            domain: Some("crates.io".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_domain[0].title, "Csv crate");

    assert!(matches!(
        mgr.list_bookmarks(&BookmarkQuery {
            topic_id: Some("missing".to_string()),
            ..Default::default()
        }),
        Err(BookmarkError::TopicNotFound(_))
    ));
}
