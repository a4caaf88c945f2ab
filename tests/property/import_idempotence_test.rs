//! Property-based tests for import reconciliation.
//!
//! Importing the same batch twice must create every entry once and then skip
//! all of them, leaving the store exactly as the first import left it.

use proptest::prelude::*;
use topicmarks::database::Database;
use topicmarks::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use topicmarks::managers::import_reconciler::{ImportReconciler, ImportReconcilerTrait};
use topicmarks::managers::topic_manager::{TopicManager, TopicManagerTrait};
use topicmarks::types::bookmark::BookmarkQuery;
use topicmarks::types::import::{ImportSummary, Triple};
use topicmarks::types::settings::EngineSettings;

/// Folder names that never collide with the synthetic root labels.
fn arb_folder() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{2,6}"
}

fn arb_path() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(arb_folder(), 0..4)
}

/// Entries with distinct urls, so every one of them is new on first import.
fn arb_batch() -> impl Strategy<Value = Vec<Triple>> {
    proptest::collection::vec((arb_path(), "[a-zA-Z][a-zA-Z0-9]{0,12}"), 1..40).prop_map(
        |entries| {
            entries
                .into_iter()
                .enumerate()
                .map(|(i, (path, title))| {
                    Triple::new(path, &title, &format!("https://example.com/{}", i))
                })
                .collect()
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn reimporting_a_batch_skips_every_entry(batch in arb_batch()) {
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        let settings = EngineSettings::default();
        let mut importer = ImportReconciler::new(db.connection(), &settings);

        let first = importer.import_batch(&batch).expect("first import should succeed");
        prop_assert_eq!(first, ImportSummary { created: batch.len(), skipped: 0 });

        let topics_after_first = TopicManager::new(db.connection(), &settings)
            .load_table()
            .unwrap()
            .len();

        let second = importer.import_batch(&batch).expect("second import should succeed");
        prop_assert_eq!(second, ImportSummary { created: 0, skipped: batch.len() });

        let topics_after_second = TopicManager::new(db.connection(), &settings)
            .load_table()
            .unwrap()
            .len();
        prop_assert_eq!(topics_after_first, topics_after_second);

        let stored = BookmarkManager::new(db.connection(), &settings)
            .list_bookmarks(&BookmarkQuery::default())
            .unwrap();
        prop_assert_eq!(stored.len(), batch.len());
    }

    #[test]
    fn every_entry_lands_under_its_path(batch in arb_batch()) {
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        let settings = EngineSettings::default();
        ImportReconciler::new(db.connection(), &settings)
            .import_batch(&batch)
            .unwrap();

        let topics = TopicManager::new(db.connection(), &settings);
        let stored = BookmarkManager::new(db.connection(), &settings)
            .list_bookmarks(&BookmarkQuery::default())
            .unwrap();
        for triple in &batch {
            let bookmark = stored.iter().find(|b| b.url == triple.url);
            prop_assert!(bookmark.is_some(), "missing {}", triple.url);
            let bookmark = bookmark.unwrap();
            prop_assert_eq!(&bookmark.title, &triple.title);
            prop_assert_eq!(&topics.topic_path(&bookmark.topic_id).unwrap(), &triple.path);
        }
    }

    #[test]
    fn resolving_a_path_twice_yields_the_same_topic(path in arb_path()) {
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        let settings = EngineSettings::default();
        let mut topics = TopicManager::new(db.connection(), &settings);

        let first = topics.resolve_path(&path).unwrap();
        let count = topics.load_table().unwrap().len();
        let second = topics.resolve_path(&path).unwrap();

        prop_assert_eq!(first.id, second.id);
        prop_assert_eq!(topics.load_table().unwrap().len(), count);
        prop_assert_eq!(count, path.len() + 1);
    }
}
