//! Duplicate Finder for Topicmarks.
//!
//! Scans the whole corpus for urls held by more than one bookmark and removes
//! a chosen subset of them.

use rusqlite::{params, Connection};
use std::collections::HashMap;

use super::bookmark_manager::{row_to_bookmark, BOOKMARK_COLUMNS};
use crate::database::begin;
use crate::types::bookmark::{Bookmark, DuplicateGroup};
use crate::types::errors::BookmarkError;
use crate::types::settings::{EngineSettings, UrlComparison};

/// Trait defining duplicate detection operations.
pub trait DuplicateFinderTrait {
    /// Groups of bookmarks sharing a url, only for urls held at least twice.
    ///
    /// Groups are ordered by url case-insensitively; members by creation order.
    fn find_duplicates(&self) -> Result<Vec<DuplicateGroup>, BookmarkError>;
    /// Removes exactly the listed bookmarks in one transaction. Unknown ids are
    /// skipped. Returns the number removed.
    fn delete_duplicates(&mut self, ids: &[String]) -> Result<usize, BookmarkError>;
}

pub struct DuplicateFinder<'a> {
    conn: &'a Connection,
    settings: &'a EngineSettings,
}

impl<'a> DuplicateFinder<'a> {
    pub fn new(conn: &'a Connection, settings: &'a EngineSettings) -> Self {
        Self { conn, settings }
    }

    fn exact_groups(&self) -> Result<Vec<DuplicateGroup>, BookmarkError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM bookmarks WHERE url IN (\
                 SELECT url FROM bookmarks GROUP BY url HAVING COUNT(*) > 1\
             ) ORDER BY lower(url), url, created_at, rowid",
            BOOKMARK_COLUMNS
        ))?;
        let rows = stmt.query_map([], row_to_bookmark)?;

        let mut groups: Vec<DuplicateGroup> = Vec::new();
        for row in rows {
            let bookmark = row?;
            match groups.last_mut() {
                Some(group) if group.url == bookmark.url => group.bookmarks.push(bookmark),
                _ => groups.push(DuplicateGroup {
                    url: bookmark.url.clone(),
                    bookmarks: vec![bookmark],
                }),
            }
        }
        Ok(groups)
    }

    fn normalized_groups(&self) -> Result<Vec<DuplicateGroup>, BookmarkError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM bookmarks ORDER BY created_at, rowid",
            BOOKMARK_COLUMNS
        ))?;
        let rows = stmt.query_map([], row_to_bookmark)?;

        let mut by_key: HashMap<String, Vec<Bookmark>> = HashMap::new();
        for row in rows {
            let bookmark = row?;
            by_key
                .entry(normalize_url(&bookmark.url))
                .or_default()
                .push(bookmark);
        }

        let mut groups: Vec<DuplicateGroup> = by_key
            .into_iter()
            .filter(|(_, members)| members.len() > 1)
            .map(|(_, bookmarks)| DuplicateGroup {
                url: bookmarks[0].url.clone(),
                bookmarks,
            })
            .collect();
        groups.sort_by(|a, b| {
            a.url
                .to_lowercase()
                .cmp(&b.url.to_lowercase())
                .then_with(|| a.url.cmp(&b.url))
        });
        Ok(groups)
    }
}

/// Comparison key for [`UrlComparison::Normalized`].
///
/// Parseable urls take their WHATWG serialization from the `url` crate, which
/// lowercases scheme and host, drops default ports and percent-encodes the
/// path. One trailing slash is then dropped. Urls that do not parse are only
/// trimmed.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut normalized = match url::Url::parse(trimmed) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => trimmed.to_string(),
    };
    if normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

impl<'a> DuplicateFinderTrait for DuplicateFinder<'a> {
    fn find_duplicates(&self) -> Result<Vec<DuplicateGroup>, BookmarkError> {
        match self.settings.url_comparison {
            UrlComparison::Exact => self.exact_groups(),
            UrlComparison::Normalized => self.normalized_groups(),
        }
    }

    fn delete_duplicates(&mut self, ids: &[String]) -> Result<usize, BookmarkError> {
        let tx = begin(self.conn)?;
        let mut removed = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM bookmarks WHERE id = ?1")?;
            for id in ids {
                let affected = stmt.execute(params![id])?;
                if affected == 0 {
                    tracing::warn!(id = %id, "duplicate delete skipped unknown id");
                }
                removed += affected;
            }
        }
        tx.commit()?;
        tracing::info!(removed, "deleted duplicate bookmarks");
        Ok(removed)
    }
}
