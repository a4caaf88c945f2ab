use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A folder node in the topic hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub name: String,
    /// `None` only for the root sentinel.
    pub parent_id: Option<String>,
    pub created_at: i64,
}

impl Topic {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Snapshot of every topic, addressed by id, with a parent → children index.
///
/// Children are kept in creation order. The table never holds references
/// between records, only ids, so walking it cannot form ownership cycles.
#[derive(Debug, Clone, Default)]
pub struct TopicTable {
    topics: HashMap<String, Topic>,
    children: HashMap<String, Vec<String>>,
    root_id: Option<String>,
}

impl TopicTable {
    /// Builds the table from topics already sorted in creation order.
    pub fn from_topics(rows: Vec<Topic>) -> Self {
        let mut table = TopicTable::default();
        for topic in rows {
            match &topic.parent_id {
                Some(parent) => table
                    .children
                    .entry(parent.clone())
                    .or_default()
                    .push(topic.id.clone()),
                None => {
                    if table.root_id.is_none() {
                        table.root_id = Some(topic.id.clone());
                    }
                }
            }
            table.topics.insert(topic.id.clone(), topic);
        }
        table
    }

    pub fn root_id(&self) -> Option<&str> {
        self.root_id.as_deref()
    }

    pub fn get(&self, id: &str) -> Option<&Topic> {
        self.topics.get(id)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Child ids of `id`, in creation order.
    pub fn children_of(&self, id: &str) -> &[String] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Folder names from just below the root down to `id` (root excluded).
    ///
    /// Stops after `max_depth` steps so a corrupted parent chain cannot loop.
    pub fn path_of(&self, id: &str, max_depth: usize) -> Vec<String> {
        let mut names = Vec::new();
        let mut current = self.topics.get(id);
        while let Some(topic) = current {
            if topic.parent_id.is_none() || names.len() >= max_depth {
                break;
            }
            names.push(topic.name.clone());
            current = topic.parent_id.as_deref().and_then(|p| self.topics.get(p));
        }
        names.reverse();
        names
    }
}

/// A topic with its bookmarks and subtopics, as exposed to the request layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicNode {
    pub id: String,
    pub name: String,
    pub bookmark_count: usize,
    pub children: Vec<TopicNode>,
}
