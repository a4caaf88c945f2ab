use serde::{Deserialize, Serialize};

/// Represents a saved bookmark, owned by exactly one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    pub notes: Option<String>,
    pub topic_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Filters for listing bookmarks.
///
/// `text` is a case-insensitive substring over title and url; `domain` is a
/// substring of the url's host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookmarkQuery {
    pub topic_id: Option<String>,
    #[serde(default)]
    pub include_subtopics: bool,
    pub text: Option<String>,
    pub domain: Option<String>,
}

/// Outcome of a bulk move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BulkMoveSummary {
    pub moved: usize,
    /// Bookmarks left in place because the target already holds their url.
    pub skipped: usize,
}

/// A group of bookmarks sharing the same url.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub url: String,
    /// Members in creation order.
    pub bookmarks: Vec<Bookmark>,
}
