//! Unit tests for the ImportReconciler: per-format imports, deduplication and
//! all-or-nothing batches.

use topicmarks::database::Database;
use topicmarks::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use topicmarks::managers::import_reconciler::{ImportReconciler, ImportReconcilerTrait};
use topicmarks::managers::topic_manager::{TopicManager, TopicManagerTrait};
use topicmarks::types::bookmark::{Bookmark, BookmarkQuery};
use topicmarks::types::errors::ImportError;
use topicmarks::types::import::{ExchangeFormat, ImportSummary, Triple};
use topicmarks::types::settings::EngineSettings;

fn setup() -> (Database, EngineSettings) {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    (db, EngineSettings::default())
}

fn all_bookmarks(db: &Database, settings: &EngineSettings) -> Vec<Bookmark> {
    BookmarkManager::new(db.connection(), settings)
        .list_bookmarks(&BookmarkQuery::default())
        .unwrap()
}

fn path_of(db: &Database, settings: &EngineSettings, topic_id: &str) -> Vec<String> {
    TopicManager::new(db.connection(), settings)
        .topic_path(topic_id)
        .unwrap()
}

fn summary(created: usize, skipped: usize) -> ImportSummary {
    ImportSummary { created, skipped }
}

const WORK_PROJECTS_HTML: &str = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<DL><p>
    <DT><H3>Work</H3>
    <DL><p>
        <DT><H3>Projects</H3>
        <DL><p>
            <DT><A HREF="https://example.com/project">Project</A>
        </DL><p>
    </DL><p>
</DL><p>
"#;

#[test]
fn test_nested_markup_import_and_reimport() {
    let (db, settings) = setup();
    let mut importer = ImportReconciler::new(db.connection(), &settings);

    let first = importer
        .import_blob(ExchangeFormat::NetscapeHtml, WORK_PROJECTS_HTML)
        .unwrap();
    assert_eq!(first, summary(1, 0));

    let table = TopicManager::new(db.connection(), &settings).load_table().unwrap();
    // root + Work + Projects
    assert_eq!(table.len(), 3);
    let bookmarks = all_bookmarks(&db, &settings);
    assert_eq!(bookmarks.len(), 1);
    assert_eq!(path_of(&db, &settings, &bookmarks[0].topic_id), vec!["Work", "Projects"]);

    let second = importer
        .import_blob(ExchangeFormat::NetscapeHtml, WORK_PROJECTS_HTML)
        .unwrap();
    assert_eq!(second, summary(0, 1));
    assert_eq!(all_bookmarks(&db, &settings).len(), 1);
}

#[test]
fn test_delimited_row_import() {
    let (db, settings) = setup();
    let mut importer = ImportReconciler::new(db.connection(), &settings);

    let result = importer
        .import_blob(
            ExchangeFormat::Delimited,
            "topic_path,title,url\n\"A/B\",\"T\",\"http://e.com\"\n",
        )
        .unwrap();
    assert_eq!(result, summary(1, 0));

    let bookmarks = all_bookmarks(&db, &settings);
    assert_eq!(bookmarks[0].title, "T");
    assert_eq!(path_of(&db, &settings, &bookmarks[0].topic_id), vec!["A", "B"]);
}

#[test]
fn test_structured_tree_import() {
    let (db, settings) = setup();
    let mut importer = ImportReconciler::new(db.connection(), &settings);

    let blob = r#"[{"name":"Root","children":[{"name":"Sub","bookmarks":[{"title":"X","url":"http://x"}]}]}]"#;
    let result = importer.import_blob(ExchangeFormat::Structured, blob).unwrap();
    assert_eq!(result, summary(1, 0));

    let bookmarks = all_bookmarks(&db, &settings);
    assert_eq!(bookmarks[0].title, "X");
    assert_eq!(path_of(&db, &settings, &bookmarks[0].topic_id), vec!["Root", "Sub"]);
}

#[test]
fn test_duplicates_within_one_batch_are_skipped() {
    let (db, settings) = setup();
    let mut importer = ImportReconciler::new(db.connection(), &settings);

    let triples = vec![
        Triple::new(["News"], "One", "http://n"),
        Triple::new(["News"], "Two", "  http://n  "),
        Triple::new(["Other"], "Three", "http://n"),
    ];
    let result = importer.import_batch(&triples).unwrap();
    assert_eq!(result, summary(2, 1));

    let bookmarks = all_bookmarks(&db, &settings);
    let titles: Vec<&str> = bookmarks.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["One", "Three"]);
}

#[test]
fn test_existing_pairs_count_as_skipped() {
    let (db, settings) = setup();
    {
        let mut bookmarks = BookmarkManager::new(db.connection(), &settings);
        bookmarks.add_bookmark("http://have", "Have", None, None).unwrap();
    }
    let mut importer = ImportReconciler::new(db.connection(), &settings);
    let result = importer
        .import_batch(&[
            Triple::new(Vec::<String>::new(), "Have again", "http://have"),
            Triple::new(Vec::<String>::new(), "New", "http://new"),
        ])
        .unwrap();
    assert_eq!(result, summary(1, 1));
}

#[test]
fn test_blank_title_falls_back_to_url() {
    let (db, settings) = setup();
    let mut importer = ImportReconciler::new(db.connection(), &settings);
    importer
        .import_batch(&[Triple::new(["A"], "  ", "http://untitled")])
        .unwrap();
    assert_eq!(all_bookmarks(&db, &settings)[0].title, "http://untitled");
}

#[test]
fn test_synthetic_root_labels_are_folded() {
    let (db, settings) = setup();
    let mut importer = ImportReconciler::new(db.connection(), &settings);
    let blob = r#"<DL><p>
    <DT><H3 PERSONAL_TOOLBAR_FOLDER="true">Bookmarks bar</H3>
    <DL><p>
        <DT><H3>Dev</H3>
        <DL><p>
            <DT><A HREF="https://github.com">GitHub</A>
        </DL><p>
        <DT><A HREF="https://bar.example">On the bar</A>
    </DL><p>
</DL><p>"#;
    importer.import_blob(ExchangeFormat::NetscapeHtml, blob).unwrap();

    let mut topics = TopicManager::new(db.connection(), &settings);
    let root = topics.root().unwrap();
    let bookmarks = all_bookmarks(&db, &settings);
    let github = bookmarks.iter().find(|b| b.title == "GitHub").unwrap();
    let on_bar = bookmarks.iter().find(|b| b.title == "On the bar").unwrap();
    assert_eq!(path_of(&db, &settings, &github.topic_id), vec!["Dev"]);
    assert_eq!(on_bar.topic_id, root.id);
}

#[test]
fn test_parse_error_leaves_store_untouched() {
    let (db, settings) = setup();
    let mut importer = ImportReconciler::new(db.connection(), &settings);
    importer
        .import_batch(&[Triple::new(["Keep"], "Keep", "http://keep")])
        .unwrap();

    let err = importer
        .import_blob(ExchangeFormat::Structured, r#"[{"name":"X","children":"bad"}]"#)
        .unwrap_err();
    assert!(matches!(err, ImportError::Parse(_)));
    assert_eq!(err.code(), "parse_error");

    assert_eq!(all_bookmarks(&db, &settings).len(), 1);
    let table = TopicManager::new(db.connection(), &settings).load_table().unwrap();
    assert_eq!(table.len(), 2);
}

#[test]
fn test_failure_mid_batch_rolls_back_everything() {
    let (db, settings) = setup();
    let mut importer = ImportReconciler::new(db.connection(), &settings);

    let err = importer
        .import_batch(&[
            Triple::new(["New", "Folder"], "Fine", "http://fine"),
            Triple::new(["Another"], "Also fine", "http://also"),
            Triple::new(["Broken"], "No url", "   "),
        ])
        .unwrap_err();
    assert!(matches!(err, ImportError::Validation(_)));

    assert!(all_bookmarks(&db, &settings).is_empty());
    // Not even the root sentinel survives the rollback.
    let table = TopicManager::new(db.connection(), &settings).load_table().unwrap();
    assert!(table.is_empty());
}

#[test]
fn test_empty_upload_imports_nothing() {
    let (db, settings) = setup();
    let mut importer = ImportReconciler::new(db.connection(), &settings);
    for format in ExchangeFormat::ALL {
        assert_eq!(importer.import_blob(format, "   ").unwrap(), summary(0, 0));
    }
}

#[test]
fn test_large_batch() {
    let (db, settings) = setup();
    let mut importer = ImportReconciler::new(db.connection(), &settings);

    let triples: Vec<Triple> = (0..5_000)
        .map(|i| {
            Triple::new(
                [format!("Folder {}", i % 50), format!("Sub {}", i % 7)],
                &format!("Page {}", i),
                &format!("https://example.com/{}", i),
            )
        })
        .collect();

    assert_eq!(importer.import_batch(&triples).unwrap(), summary(5_000, 0));
    assert_eq!(importer.import_batch(&triples).unwrap(), summary(0, 5_000));
}
