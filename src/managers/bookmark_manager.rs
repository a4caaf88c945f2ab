//! Bookmark Manager for Topicmarks.
//!
//! Implements `BookmarkManagerTrait`: CRUD, relocation and bulk operations for
//! bookmarks, backed by SQLite via `rusqlite`.
//!
//! Uniqueness policy for relocation: a single move onto a topic that already
//! holds the same url is rejected with `DuplicateUrl`; a bulk move leaves such
//! bookmarks where they are and counts them as skipped, the same way the import
//! reconciler treats an existing pair.

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::topic_manager::{ensure_root_on, get_on};
use super::unix_now;
use crate::database::begin;
use crate::types::bookmark::{Bookmark, BookmarkQuery, BulkMoveSummary};
use crate::types::errors::BookmarkError;
use crate::types::settings::EngineSettings;

/// Trait defining bookmark management operations.
pub trait BookmarkManagerTrait {
    fn add_bookmark(
        &mut self,
        url: &str,
        title: &str,
        topic_id: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Bookmark, BookmarkError>;
    fn get_bookmark(&self, id: &str) -> Result<Bookmark, BookmarkError>;
    fn remove_bookmark(&mut self, id: &str) -> Result<(), BookmarkError>;
    fn update_bookmark(
        &mut self,
        id: &str,
        url: Option<&str>,
        title: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Bookmark, BookmarkError>;
    fn move_bookmark(&mut self, id: &str, topic_id: &str) -> Result<(), BookmarkError>;
    /// Deletes every listed bookmark that exists; unknown ids are ignored.
    fn bulk_delete(&mut self, ids: &[String]) -> Result<usize, BookmarkError>;
    fn bulk_move(&mut self, ids: &[String], topic_id: &str) -> Result<BulkMoveSummary, BookmarkError>;
    fn list_bookmarks(&self, query: &BookmarkQuery) -> Result<Vec<Bookmark>, BookmarkError>;
}

/// Bookmark manager backed by a SQLite connection.
pub struct BookmarkManager<'a> {
    conn: &'a Connection,
    settings: &'a EngineSettings,
}

pub(crate) const BOOKMARK_COLUMNS: &str = "id, title, url, notes, topic_id, created_at, updated_at";

/// Reads a single `Bookmark` row into a struct.
pub(crate) fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
    Ok(Bookmark {
        id: row.get(0)?,
        title: row.get(1)?,
        url: row.get(2)?,
        notes: row.get(3)?,
        topic_id: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

pub(crate) fn get_bookmark_on(conn: &Connection, id: &str) -> Result<Option<Bookmark>, BookmarkError> {
    let bookmark = conn
        .query_row(
            &format!("SELECT {} FROM bookmarks WHERE id = ?1", BOOKMARK_COLUMNS),
            params![id],
            row_to_bookmark,
        )
        .optional()?;
    Ok(bookmark)
}

/// Checks whether `topic_id` already holds `url` on a bookmark other than `except_id`.
fn pair_taken(conn: &Connection, topic_id: &str, url: &str, except_id: Option<&str>) -> Result<bool, BookmarkError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM bookmarks WHERE topic_id = ?1 AND url = ?2 AND id IS NOT ?3",
        params![topic_id, url, except_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Host of `url`, lowercased, if it parses as an absolute url.
fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|h| h.to_lowercase()))
}

impl<'a> BookmarkManager<'a> {
    /// Creates a new `BookmarkManager` using the provided database connection.
    pub fn new(conn: &'a Connection, settings: &'a EngineSettings) -> Self {
        Self { conn, settings }
    }
}

impl<'a> BookmarkManagerTrait for BookmarkManager<'a> {
    /// Adds a bookmark to `topic_id`, or to the root topic when `None`.
    ///
    /// The url is trimmed and required; a blank title falls back to the url.
    fn add_bookmark(
        &mut self,
        url: &str,
        title: &str,
        topic_id: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Bookmark, BookmarkError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(BookmarkError::MissingUrl);
        }
        let title = match title.trim() {
            "" => url,
            t => t,
        };
        let notes = notes.map(str::trim).filter(|n| !n.is_empty());

        let tx = begin(self.conn)?;
        let topic = match topic_id {
            Some(tid) => get_on(&tx, tid)?.ok_or_else(|| BookmarkError::TopicNotFound(tid.to_string()))?,
            None => ensure_root_on(&tx, self.settings)?,
        };
        if pair_taken(&tx, &topic.id, url, None)? {
            return Err(BookmarkError::DuplicateUrl(url.to_string()));
        }

        let now = unix_now();
        let bookmark = Bookmark {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            url: url.to_string(),
            notes: notes.map(str::to_string),
            topic_id: topic.id,
            created_at: now,
            updated_at: now,
        };
        tx.execute(
            "INSERT INTO bookmarks (id, title, url, notes, topic_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                bookmark.id,
                bookmark.title,
                bookmark.url,
                bookmark.notes,
                bookmark.topic_id,
                bookmark.created_at,
                bookmark.updated_at
            ],
        )?;
        tx.commit()?;
        Ok(bookmark)
    }

    fn get_bookmark(&self, id: &str) -> Result<Bookmark, BookmarkError> {
        get_bookmark_on(self.conn, id)?.ok_or_else(|| BookmarkError::NotFound(id.to_string()))
    }

    /// Removes a bookmark by ID.
    fn remove_bookmark(&mut self, id: &str) -> Result<(), BookmarkError> {
        let affected = self
            .conn
            .execute("DELETE FROM bookmarks WHERE id = ?1", params![id])?;

        if affected == 0 {
            return Err(BookmarkError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Edits url, title and notes. `None` leaves a field as it is; blank notes clear them.
    fn update_bookmark(
        &mut self,
        id: &str,
        url: Option<&str>,
        title: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Bookmark, BookmarkError> {
        let tx = begin(self.conn)?;
        let mut bookmark = get_bookmark_on(&tx, id)?.ok_or_else(|| BookmarkError::NotFound(id.to_string()))?;

        if let Some(u) = url {
            let u = u.trim();
            if u.is_empty() {
                return Err(BookmarkError::MissingUrl);
            }
            if u != bookmark.url && pair_taken(&tx, &bookmark.topic_id, u, Some(id))? {
                return Err(BookmarkError::DuplicateUrl(u.to_string()));
            }
            bookmark.url = u.to_string();
        }
        if let Some(t) = title {
            bookmark.title = t.trim().to_string();
        }
        if bookmark.title.is_empty() {
            bookmark.title = bookmark.url.clone();
        }
        if let Some(n) = notes {
            let n = n.trim();
            bookmark.notes = if n.is_empty() { None } else { Some(n.to_string()) };
        }
        bookmark.updated_at = unix_now();

        tx.execute(
            "UPDATE bookmarks SET url = ?1, title = ?2, notes = ?3, updated_at = ?4 WHERE id = ?5",
            params![bookmark.url, bookmark.title, bookmark.notes, bookmark.updated_at, id],
        )?;
        tx.commit()?;
        Ok(bookmark)
    }

    /// Repoints a bookmark at another topic.
    fn move_bookmark(&mut self, id: &str, topic_id: &str) -> Result<(), BookmarkError> {
        let tx = begin(self.conn)?;
        if get_on(&tx, topic_id)?.is_none() {
            return Err(BookmarkError::TopicNotFound(topic_id.to_string()));
        }
        let bookmark = get_bookmark_on(&tx, id)?.ok_or_else(|| BookmarkError::NotFound(id.to_string()))?;
        if bookmark.topic_id == topic_id {
            return Ok(());
        }
        if pair_taken(&tx, topic_id, &bookmark.url, Some(id))? {
            tracing::warn!(id = %id, target = %topic_id, url = %bookmark.url, "rejected bookmark move onto existing url");
            return Err(BookmarkError::DuplicateUrl(bookmark.url));
        }

        tx.execute(
            "UPDATE bookmarks SET topic_id = ?1, updated_at = ?2 WHERE id = ?3",
            params![topic_id, unix_now(), id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn bulk_delete(&mut self, ids: &[String]) -> Result<usize, BookmarkError> {
        let tx = begin(self.conn)?;
        let mut removed = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM bookmarks WHERE id = ?1")?;
            for id in ids {
                removed += stmt.execute(params![id])?;
            }
        }
        tx.commit()?;
        if removed < ids.len() {
            tracing::warn!(requested = ids.len(), removed, "bulk delete skipped unknown ids");
        }
        tracing::info!(removed, "bulk deleted bookmarks");
        Ok(removed)
    }

    /// Moves every listed bookmark that exists into `topic_id`, in one transaction.
    fn bulk_move(&mut self, ids: &[String], topic_id: &str) -> Result<BulkMoveSummary, BookmarkError> {
        let tx = begin(self.conn)?;
        if get_on(&tx, topic_id)?.is_none() {
            return Err(BookmarkError::TopicNotFound(topic_id.to_string()));
        }

        let mut summary = BulkMoveSummary::default();
        let now = unix_now();
        for id in ids {
            let Some(bookmark) = get_bookmark_on(&tx, id)? else {
                continue;
            };
            if bookmark.topic_id == topic_id {
                continue;
            }
            if pair_taken(&tx, topic_id, &bookmark.url, Some(id))? {
                summary.skipped += 1;
                continue;
            }
            tx.execute(
                "UPDATE bookmarks SET topic_id = ?1, updated_at = ?2 WHERE id = ?3",
                params![topic_id, now, id],
            )?;
            summary.moved += 1;
        }
        tx.commit()?;
        tracing::info!(moved = summary.moved, skipped = summary.skipped, target = %topic_id, "bulk moved bookmarks");
        Ok(summary)
    }

    /// Lists bookmarks matching the query, sorted by title case-insensitively.
    ///
    /// Without a `topic_id` the whole corpus is searched.
    fn list_bookmarks(&self, query: &BookmarkQuery) -> Result<Vec<Bookmark>, BookmarkError> {
        let mut results = Vec::new();
        match query.topic_id.as_deref() {
            Some(tid) => {
                if get_on(self.conn, tid)?.is_none() {
                    return Err(BookmarkError::TopicNotFound(tid.to_string()));
                }
                let sql = if query.include_subtopics {
                    format!(
                        "SELECT {} FROM bookmarks WHERE topic_id IN (\
                             WITH RECURSIVE subtree(id) AS (\
                                 SELECT ?1 UNION SELECT t.id FROM topics t JOIN subtree s ON t.parent_id = s.id\
                             ) SELECT id FROM subtree\
                         )",
                        BOOKMARK_COLUMNS
                    )
                } else {
                    format!("SELECT {} FROM bookmarks WHERE topic_id = ?1", BOOKMARK_COLUMNS)
                };
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt.query_map(params![tid], row_to_bookmark)?;
                for row in rows {
                    results.push(row?);
                }
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("SELECT {} FROM bookmarks", BOOKMARK_COLUMNS))?;
                let rows = stmt.query_map([], row_to_bookmark)?;
                for row in rows {
                    results.push(row?);
                }
            }
        }

        if let Some(text) = query.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let needle = text.to_lowercase();
            results.retain(|b| {
                b.title.to_lowercase().contains(&needle) || b.url.to_lowercase().contains(&needle)
            });
        }
        if let Some(domain) = query.domain.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            let needle = domain.to_lowercase();
            results.retain(|b| host_of(&b.url).map_or(false, |host| host.contains(&needle)));
        }

        results.sort_by_cached_key(|b| (b.title.to_lowercase(), b.created_at));
        Ok(results)
    }
}
