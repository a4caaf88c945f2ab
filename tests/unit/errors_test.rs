use topicmarks::types::errors::*;

// === ImportError Tests ===

#[test]
fn import_error_parse_display() {
    let err = ImportError::Parse("expected a JSON array at the top level".to_string());
    assert_eq!(
        err.to_string(),
        "Import parse error: expected a JSON array at the top level"
    );
    assert_eq!(err.code(), "parse_error");
}

#[test]
fn import_error_validation_display() {
    let err = ImportError::Validation("entry 'x' has an empty url".to_string());
    assert_eq!(err.to_string(), "Import validation error: entry 'x' has an empty url");
    assert_eq!(err.code(), "validation_error");
}

#[test]
fn import_error_from_topic_storage_error_stays_storage() {
    let err: ImportError = TopicError::DatabaseError("disk I/O error".to_string()).into();
    assert!(matches!(err, ImportError::Database(ref msg) if msg == "disk I/O error"));
    assert_eq!(err.code(), "storage_error");
}

#[test]
fn import_error_from_topic_error_is_validation() {
    let err: ImportError = TopicError::TargetNotFound("t-1".to_string()).into();
    assert_eq!(err.code(), "validation_error");
}

// === TopicError Tests ===

#[test]
fn topic_error_not_found_display() {
    let err = TopicError::NotFound("topic-123".to_string());
    assert_eq!(err.to_string(), "Topic not found: topic-123");
}

#[test]
fn topic_error_cycle_display() {
    let err = TopicError::Cycle {
        topic_id: "a".to_string(),
        target_id: "b".to_string(),
    };
    assert_eq!(err.to_string(), "Moving topic a under b would create a cycle");
    assert_eq!(err.code(), "cycle");
}

#[test]
fn topic_error_reason_codes() {
    assert_eq!(TopicError::TargetNotFound("x".into()).code(), "target_not_found");
    assert_eq!(TopicError::RootImmutable.code(), "root_immutable");
    assert_eq!(TopicError::SelfParent("x".into()).code(), "self_move");
    assert_eq!(TopicError::NameConflict("Work".into()).code(), "name_conflict");
    assert_eq!(TopicError::InvalidName.code(), "invalid_name");
    assert_eq!(TopicError::TooDeep { limit: 64 }.code(), "depth_exceeded");
}

#[test]
fn topic_error_too_deep_display() {
    let err = TopicError::TooDeep { limit: 3 };
    assert_eq!(err.to_string(), "Folder nesting would exceed the limit of 3");
}

#[test]
fn topic_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(TopicError::RootImmutable);
    assert!(err.source().is_none());
}

// === BookmarkError Tests ===

#[test]
fn bookmark_error_display() {
    assert_eq!(BookmarkError::MissingUrl.to_string(), "Bookmark URL is required");
    assert_eq!(
        BookmarkError::DuplicateUrl("http://dup".to_string()).to_string(),
        "Duplicate bookmark URL: http://dup"
    );
    assert_eq!(
        BookmarkError::NotFound("b-1".to_string()).to_string(),
        "Bookmark not found: b-1"
    );
}

#[test]
fn bookmark_error_from_topic_not_found() {
    let err: BookmarkError = TopicError::NotFound("t-9".to_string()).into();
    assert!(matches!(err, BookmarkError::TopicNotFound(ref id) if id == "t-9"));
    assert_eq!(err.code(), "target_not_found");
}

#[test]
fn bookmark_error_from_rusqlite() {
    let err: BookmarkError = rusqlite::Error::QueryReturnedNoRows.into();
    assert_eq!(err.code(), "storage_error");
}

// === ExportError Tests ===

#[test]
fn export_error_display() {
    let err = ExportError::Serialization("folder nesting exceeds the limit of 3".to_string());
    assert_eq!(
        err.to_string(),
        "Export serialization error: folder nesting exceeds the limit of 3"
    );
    assert_eq!(err.code(), "serialization_error");
}

// === SettingsError Tests ===

#[test]
fn settings_error_display() {
    assert_eq!(
        SettingsError::IoError("denied".to_string()).to_string(),
        "Settings I/O error: denied"
    );
    assert_eq!(
        SettingsError::InvalidKey("nope".to_string()).to_string(),
        "Invalid settings key: nope"
    );
    assert_eq!(SettingsError::InvalidValue("x".into()).code(), "invalid_value");
}
