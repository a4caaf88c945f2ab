//! Structured-document (JSON) parser.
//!
//! Accepts two shapes, told apart by the keys of the first element:
//! a flat list of `{topic_path, title, url}` rows, or a nested list of
//! `{name, children, bookmarks}` folder objects as written by the exporter.

use serde::Deserialize;
use serde_json::Value;

use super::{check_depth, make_triple, split_topic_path, FormatParser};
use crate::types::errors::ImportError;
use crate::types::import::{ExchangeFormat, Triple};

/// Keys whose presence marks the nested tree shape.
const TREE_KEYS: [&str; 4] = ["id", "name", "children", "bookmarks"];

#[derive(Debug, Deserialize)]
struct FlatRow {
    #[serde(default)]
    topic_path: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FolderNode {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    children: Option<Vec<FolderNode>>,
    #[serde(default)]
    bookmarks: Option<Vec<LeafEntry>>,
}

#[derive(Debug, Deserialize)]
struct LeafEntry {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

pub struct StructuredParser {
    max_depth: usize,
}

impl StructuredParser {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    fn parse_rows(&self, items: Vec<Value>) -> Result<Vec<Triple>, ImportError> {
        let rows: Vec<FlatRow> = serde_json::from_value(Value::Array(items))
            .map_err(|e| ImportError::Parse(format!("invalid row: {}", e)))?;

        let mut triples = Vec::new();
        for row in rows {
            let path = split_topic_path(row.topic_path.as_deref().unwrap_or(""));
            check_depth(&path, self.max_depth)?;
            if let Some(triple) = make_triple(
                path,
                row.title.as_deref().unwrap_or(""),
                row.url.as_deref().unwrap_or(""),
            ) {
                triples.push(triple);
            }
        }
        Ok(triples)
    }

    /// Depth-first walk with an explicit stack. A node's own bookmarks are
    /// emitted before those of its children, children in document order.
    fn parse_tree(&self, items: Vec<Value>) -> Result<Vec<Triple>, ImportError> {
        let roots: Vec<FolderNode> = serde_json::from_value(Value::Array(items))
            .map_err(|e| ImportError::Parse(format!("invalid folder node: {}", e)))?;

        let mut triples = Vec::new();
        let mut stack: Vec<(FolderNode, Vec<String>)> =
            roots.into_iter().rev().map(|node| (node, Vec::new())).collect();

        while let Some((node, parent_path)) = stack.pop() {
            let mut path = parent_path;
            if let Some(name) = node.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
                path.push(name.to_string());
            }
            check_depth(&path, self.max_depth)?;

            for leaf in node.bookmarks.unwrap_or_default() {
                if let Some(triple) = make_triple(
                    path.clone(),
                    leaf.title.as_deref().unwrap_or(""),
                    leaf.url.as_deref().unwrap_or(""),
                ) {
                    triples.push(triple);
                }
            }
            for child in node.children.unwrap_or_default().into_iter().rev() {
                stack.push((child, path.clone()));
            }
        }
        Ok(triples)
    }
}

impl FormatParser for StructuredParser {
    fn format(&self) -> ExchangeFormat {
        ExchangeFormat::Structured
    }

    fn parse(&self, blob: &str) -> Result<Vec<Triple>, ImportError> {
        let value: Value = serde_json::from_str(blob)
            .map_err(|e| ImportError::Parse(format!("invalid JSON: {}", e)))?;
        let Value::Array(items) = value else {
            return Err(ImportError::Parse("expected a JSON array at the top level".to_string()));
        };

        let is_tree = items
            .first()
            .and_then(Value::as_object)
            .map_or(false, |object| TREE_KEYS.iter().any(|key| object.contains_key(*key)));

        if is_tree {
            self.parse_tree(items)
        } else {
            self.parse_rows(items)
        }
    }
}
