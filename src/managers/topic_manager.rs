//! Topic Manager for Topicmarks.
//!
//! Owns the folder hierarchy: the lazily created root sentinel, path resolution
//! for imports, CRUD for topics and the move/cycle guard.
//!
//! The free functions ending in `_on` run against whatever connection or open
//! transaction they are handed, so the import reconciler can resolve paths inside
//! its own batch transaction. The trait methods wrap them in a transaction of their own.

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::unix_now;
use crate::database::begin;
use crate::types::errors::TopicError;
use crate::types::settings::{EngineSettings, NameMatching};
use crate::types::topic::{Topic, TopicNode, TopicTable};

/// Trait defining topic hierarchy operations.
pub trait TopicManagerTrait {
    /// Returns the root sentinel, creating it on first use.
    fn root(&mut self) -> Result<Topic, TopicError>;
    /// Maps a folder path onto a topic, creating missing folders below the root.
    fn resolve_path(&mut self, path: &[String]) -> Result<Topic, TopicError>;
    fn create_topic(&mut self, name: &str, parent_id: Option<&str>) -> Result<Topic, TopicError>;
    fn rename_topic(&mut self, id: &str, name: &str) -> Result<(), TopicError>;
    /// Deletes a topic together with all descendant topics and their bookmarks.
    fn delete_topic(&mut self, id: &str) -> Result<(), TopicError>;
    fn move_topic(&mut self, id: &str, new_parent_id: &str) -> Result<(), TopicError>;
    fn get_topic(&self, id: &str) -> Result<Topic, TopicError>;
    fn list_children(&self, id: &str) -> Result<Vec<Topic>, TopicError>;
    /// Folder names from below the root down to `id`.
    fn topic_path(&self, id: &str) -> Result<Vec<String>, TopicError>;
    fn load_table(&self) -> Result<TopicTable, TopicError>;
    fn topic_tree(&mut self) -> Result<TopicNode, TopicError>;
}

/// Topic manager backed by a SQLite connection.
pub struct TopicManager<'a> {
    conn: &'a Connection,
    settings: &'a EngineSettings,
}

impl<'a> TopicManager<'a> {
    pub fn new(conn: &'a Connection, settings: &'a EngineSettings) -> Self {
        Self { conn, settings }
    }
}

const TOPIC_COLUMNS: &str = "id, name, parent_id, created_at";

fn row_to_topic(row: &rusqlite::Row) -> rusqlite::Result<Topic> {
    Ok(Topic {
        id: row.get(0)?,
        name: row.get(1)?,
        parent_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}

pub(crate) fn get_on(conn: &Connection, id: &str) -> Result<Option<Topic>, TopicError> {
    let topic = conn
        .query_row(
            &format!("SELECT {} FROM topics WHERE id = ?1", TOPIC_COLUMNS),
            params![id],
            row_to_topic,
        )
        .optional()?;
    Ok(topic)
}

pub(crate) fn ensure_root_on(conn: &Connection, settings: &EngineSettings) -> Result<Topic, TopicError> {
    let existing = conn
        .query_row(
            &format!(
                "SELECT {} FROM topics WHERE parent_id IS NULL ORDER BY created_at, rowid LIMIT 1",
                TOPIC_COLUMNS
            ),
            [],
            row_to_topic,
        )
        .optional()?;
    if let Some(root) = existing {
        return Ok(root);
    }

    let root = Topic {
        id: Uuid::new_v4().to_string(),
        name: settings.root_name.clone(),
        parent_id: None,
        created_at: unix_now(),
    };
    conn.execute(
        "INSERT INTO topics (id, name, parent_id, created_at) VALUES (?1, ?2, NULL, ?3)",
        params![root.id, root.name, root.created_at],
    )?;
    tracing::debug!(id = %root.id, name = %root.name, "created root topic");
    Ok(root)
}

/// Looks up a child of `parent_id` by name under the configured matching policy.
///
/// Case-insensitive lookups fold in Rust: SQLite's NOCASE only folds ASCII.
pub(crate) fn find_child_on(
    conn: &Connection,
    parent_id: &str,
    name: &str,
    matching: NameMatching,
) -> Result<Option<Topic>, TopicError> {
    if matching == NameMatching::Exact {
        let topic = conn
            .query_row(
                &format!(
                    "SELECT {} FROM topics WHERE parent_id = ?1 AND name = ?2",
                    TOPIC_COLUMNS
                ),
                params![parent_id, name],
                row_to_topic,
            )
            .optional()?;
        return Ok(topic);
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM topics WHERE parent_id = ?1 ORDER BY created_at, rowid",
        TOPIC_COLUMNS
    ))?;
    let rows = stmt.query_map(params![parent_id], row_to_topic)?;
    for row in rows {
        let topic = row?;
        if matching.same_name(&topic.name, name) {
            return Ok(Some(topic));
        }
    }
    Ok(None)
}

/// Inserts a child unless a sibling with the exact same name exists, then returns
/// whichever row now holds that name. Safe against a concurrent writer creating
/// the same folder first.
fn insert_child_or_fetch(conn: &Connection, parent_id: &str, name: &str) -> Result<Topic, TopicError> {
    let id = Uuid::new_v4().to_string();
    let inserted = conn.execute(
        "INSERT INTO topics (id, name, parent_id, created_at) VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(parent_id, name) DO NOTHING",
        params![id, name, parent_id, unix_now()],
    )?;
    if inserted > 0 {
        tracing::debug!(id = %id, parent = %parent_id, name = %name, "created topic");
    }
    find_child_on(conn, parent_id, name, NameMatching::Exact)?
        .ok_or_else(|| TopicError::NotFound(format!("{}/{}", parent_id, name)))
}

/// Drops blank segments and synthetic root labels, trimming the rest.
pub fn normalize_path(path: &[String], settings: &EngineSettings) -> Vec<String> {
    path.iter()
        .map(|segment| segment.trim())
        .filter(|segment| !segment.is_empty() && !settings.is_synthetic_root_label(segment))
        .map(str::to_string)
        .collect()
}

/// Resolves `path` to a topic below the root, creating missing folders.
pub(crate) fn resolve_on(
    conn: &Connection,
    settings: &EngineSettings,
    path: &[String],
) -> Result<Topic, TopicError> {
    let segments = normalize_path(path, settings);
    if segments.len() > settings.max_folder_depth {
        return Err(TopicError::TooDeep {
            limit: settings.max_folder_depth,
        });
    }
    let mut current = ensure_root_on(conn, settings)?;
    for segment in segments {
        current = match find_child_on(conn, &current.id, &segment, settings.topic_name_matching)? {
            Some(existing) => existing,
            None => insert_child_or_fetch(conn, &current.id, &segment)?,
        };
    }
    Ok(current)
}

/// Rejects the move when `target_id` is `topic_id` or lies beneath it.
///
/// Walks the target's ancestor chain upward; the visited set stops the walk
/// on a corrupted chain instead of looping.
pub(crate) fn ensure_not_descendant_on(
    conn: &Connection,
    topic_id: &str,
    target_id: &str,
) -> Result<(), TopicError> {
    let mut visited = HashSet::new();
    let mut current = Some(target_id.to_string());
    while let Some(id) = current {
        if id == topic_id {
            return Err(TopicError::Cycle {
                topic_id: topic_id.to_string(),
                target_id: target_id.to_string(),
            });
        }
        if !visited.insert(id.clone()) {
            break;
        }
        current = conn
            .query_row(
                "SELECT parent_id FROM topics WHERE id = ?1",
                params![id],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?
            .flatten();
    }
    Ok(())
}

/// Number of parent steps from `id` up to the root (the root is at depth 0).
fn depth_on(conn: &Connection, id: &str) -> Result<usize, TopicError> {
    let depth: i64 = conn.query_row(
        "WITH RECURSIVE chain(id, parent_id, depth) AS ( \
             SELECT id, parent_id, 0 FROM topics WHERE id = ?1 \
             UNION ALL \
             SELECT t.id, t.parent_id, chain.depth + 1 FROM topics t \
             JOIN chain ON t.id = chain.parent_id \
         ) SELECT MAX(depth) FROM chain",
        params![id],
        |row| row.get::<_, Option<i64>>(0),
    )?
    .unwrap_or(0);
    Ok(depth as usize)
}

/// Levels below `id` in its subtree (a leaf has height 0).
fn height_on(conn: &Connection, id: &str) -> Result<usize, TopicError> {
    let height: i64 = conn.query_row(
        "WITH RECURSIVE sub(id, level) AS ( \
             SELECT id, 0 FROM topics WHERE id = ?1 \
             UNION ALL \
             SELECT t.id, sub.level + 1 FROM topics t JOIN sub ON t.parent_id = sub.id \
         ) SELECT MAX(level) FROM sub",
        params![id],
        |row| row.get::<_, Option<i64>>(0),
    )?
    .unwrap_or(0);
    Ok(height as usize)
}

pub(crate) fn load_table_on(conn: &Connection) -> Result<TopicTable, TopicError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM topics ORDER BY created_at, rowid",
        TOPIC_COLUMNS
    ))?;
    let rows = stmt.query_map([], row_to_topic)?;
    let mut topics = Vec::new();
    for row in rows {
        topics.push(row?);
    }
    Ok(TopicTable::from_topics(topics))
}

impl<'a> TopicManagerTrait for TopicManager<'a> {
    fn root(&mut self) -> Result<Topic, TopicError> {
        let tx = begin(self.conn)?;
        let root = ensure_root_on(&tx, self.settings)?;
        tx.commit()?;
        Ok(root)
    }

    /// Resolution is idempotent: the same path always lands on the same topic.
    fn resolve_path(&mut self, path: &[String]) -> Result<Topic, TopicError> {
        let tx = begin(self.conn)?;
        let topic = resolve_on(&tx, self.settings, path)?;
        tx.commit()?;
        Ok(topic)
    }

    /// Creates a topic under `parent_id`, or under the root when `None`.
    ///
    /// A blank name falls back to the configured default topic name.
    fn create_topic(&mut self, name: &str, parent_id: Option<&str>) -> Result<Topic, TopicError> {
        let name = match name.trim() {
            "" => self.settings.default_topic_name.clone(),
            trimmed => trimmed.to_string(),
        };

        let tx = begin(self.conn)?;
        let parent = match parent_id {
            Some(pid) => get_on(&tx, pid)?.ok_or_else(|| TopicError::TargetNotFound(pid.to_string()))?,
            None => ensure_root_on(&tx, self.settings)?,
        };
        if depth_on(&tx, &parent.id)? + 1 > self.settings.max_folder_depth {
            return Err(TopicError::TooDeep {
                limit: self.settings.max_folder_depth,
            });
        }
        if find_child_on(&tx, &parent.id, &name, self.settings.topic_name_matching)?.is_some() {
            return Err(TopicError::NameConflict(name));
        }

        let topic = Topic {
            id: Uuid::new_v4().to_string(),
            name,
            parent_id: Some(parent.id),
            created_at: unix_now(),
        };
        tx.execute(
            "INSERT INTO topics (id, name, parent_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![topic.id, topic.name, topic.parent_id, topic.created_at],
        )?;
        tx.commit()?;
        Ok(topic)
    }

    fn rename_topic(&mut self, id: &str, name: &str) -> Result<(), TopicError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TopicError::InvalidName);
        }

        let tx = begin(self.conn)?;
        let topic = get_on(&tx, id)?.ok_or_else(|| TopicError::NotFound(id.to_string()))?;
        if let Some(parent_id) = topic.parent_id.as_deref() {
            if let Some(sibling) = find_child_on(&tx, parent_id, name, self.settings.topic_name_matching)? {
                if sibling.id != topic.id {
                    return Err(TopicError::NameConflict(name.to_string()));
                }
            }
        }
        tx.execute("UPDATE topics SET name = ?1 WHERE id = ?2", params![name, id])?;
        tx.commit()?;
        Ok(())
    }

    fn delete_topic(&mut self, id: &str) -> Result<(), TopicError> {
        let tx = begin(self.conn)?;
        let topic = get_on(&tx, id)?.ok_or_else(|| TopicError::NotFound(id.to_string()))?;
        if topic.is_root() {
            return Err(TopicError::RootImmutable);
        }
        tx.execute("DELETE FROM topics WHERE id = ?1", params![id])?;
        tx.commit()?;
        tracing::info!(id = %id, name = %topic.name, "deleted topic subtree");
        Ok(())
    }

    /// Reparents a topic.
    ///
    /// Validation and the write share one transaction, so the ancestor walk sees
    /// the same snapshot the update applies to.
    fn move_topic(&mut self, id: &str, new_parent_id: &str) -> Result<(), TopicError> {
        let tx = begin(self.conn)?;
        let topic = get_on(&tx, id)?.ok_or_else(|| TopicError::NotFound(id.to_string()))?;
        if get_on(&tx, new_parent_id)?.is_none() {
            return Err(TopicError::TargetNotFound(new_parent_id.to_string()));
        }
        if topic.is_root() {
            return Err(TopicError::RootImmutable);
        }
        if id == new_parent_id {
            return Err(TopicError::SelfParent(id.to_string()));
        }
        if let Err(e) = ensure_not_descendant_on(&tx, id, new_parent_id) {
            tracing::warn!(id = %id, target = %new_parent_id, "rejected topic move: {}", e);
            return Err(e);
        }
        if topic.parent_id.as_deref() == Some(new_parent_id) {
            return Ok(());
        }
        let deepest = depth_on(&tx, new_parent_id)? + 1 + height_on(&tx, id)?;
        if deepest > self.settings.max_folder_depth {
            tracing::warn!(id = %id, target = %new_parent_id, deepest, "rejected topic move: too deep");
            return Err(TopicError::TooDeep {
                limit: self.settings.max_folder_depth,
            });
        }
        if find_child_on(&tx, new_parent_id, &topic.name, self.settings.topic_name_matching)?.is_some() {
            return Err(TopicError::NameConflict(topic.name));
        }

        tx.execute(
            "UPDATE topics SET parent_id = ?1 WHERE id = ?2",
            params![new_parent_id, id],
        )?;
        tx.commit()?;
        tracing::info!(id = %id, target = %new_parent_id, "moved topic");
        Ok(())
    }

    fn get_topic(&self, id: &str) -> Result<Topic, TopicError> {
        get_on(self.conn, id)?.ok_or_else(|| TopicError::NotFound(id.to_string()))
    }

    fn list_children(&self, id: &str) -> Result<Vec<Topic>, TopicError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM topics WHERE parent_id = ?1 ORDER BY name COLLATE NOCASE, rowid",
            TOPIC_COLUMNS
        ))?;
        let rows = stmt.query_map(params![id], row_to_topic)?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn topic_path(&self, id: &str) -> Result<Vec<String>, TopicError> {
        let table = load_table_on(self.conn)?;
        if table.get(id).is_none() {
            return Err(TopicError::NotFound(id.to_string()));
        }
        Ok(table.path_of(id, self.settings.max_folder_depth))
    }

    fn load_table(&self) -> Result<TopicTable, TopicError> {
        load_table_on(self.conn)
    }

    /// Builds the nested tree bottom-up from an explicit pre-order stack.
    fn topic_tree(&mut self) -> Result<TopicNode, TopicError> {
        let root = self.root()?;
        let table = load_table_on(self.conn)?;

        let mut counts: HashMap<String, usize> = HashMap::new();
        {
            let mut stmt = self
                .conn
                .prepare("SELECT topic_id, COUNT(*) FROM bookmarks GROUP BY topic_id")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (topic_id, count) = row?;
                counts.insert(topic_id, count as usize);
            }
        }

        let mut order = Vec::with_capacity(table.len());
        let mut stack = vec![(root.id.clone(), 0usize)];
        while let Some((id, depth)) = stack.pop() {
            if depth > self.settings.max_folder_depth {
                return Err(TopicError::TooDeep {
                    limit: self.settings.max_folder_depth,
                });
            }
            for child in table.children_of(&id).iter().rev() {
                stack.push((child.clone(), depth + 1));
            }
            order.push(id);
        }

        // Reverse pre-order visits every descendant before its ancestor.
        let mut built: HashMap<String, TopicNode> = HashMap::new();
        for id in order.iter().rev() {
            let Some(topic) = table.get(id) else { continue };
            let children = table
                .children_of(id)
                .iter()
                .filter_map(|child| built.remove(child))
                .collect();
            built.insert(
                id.clone(),
                TopicNode {
                    id: id.clone(),
                    name: topic.name.clone(),
                    bookmark_count: counts.get(id).copied().unwrap_or(0),
                    children,
                },
            );
        }

        built
            .remove(&root.id)
            .ok_or_else(|| TopicError::NotFound(root.id.clone()))
    }
}
