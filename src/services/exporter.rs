//! Exporter for Topicmarks.
//!
//! Writes the whole collection in any of the upload formats. The root
//! sentinel's own bookmarks and folders are written at the top level (HTML,
//! CSV) or as an anonymous node (JSON), so importing an export into an empty
//! store rebuilds the same tree. Walks use an explicit stack bounded by the
//! configured folder depth.

use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

use crate::managers::bookmark_manager::{row_to_bookmark, BOOKMARK_COLUMNS};
use crate::managers::topic_manager::load_table_on;
use crate::services::parsers::delimited::{PATH_COLUMN, TITLE_COLUMN, URL_COLUMN};
use crate::types::bookmark::Bookmark;
use crate::types::errors::ExportError;
use crate::types::import::ExchangeFormat;
use crate::types::settings::EngineSettings;
use crate::types::topic::TopicTable;

/// Trait defining export operations.
pub trait ExporterTrait {
    fn export(&self, format: ExchangeFormat) -> Result<String, ExportError>;
}

pub struct Exporter<'a> {
    conn: &'a Connection,
    settings: &'a EngineSettings,
}

/// Everything an export needs, read once.
struct Snapshot {
    table: TopicTable,
    bookmarks_by_topic: HashMap<String, Vec<Bookmark>>,
}

impl Snapshot {
    fn bookmarks_of(&self, topic_id: &str) -> &[Bookmark] {
        self.bookmarks_by_topic
            .get(topic_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Serialize)]
struct ExportNode {
    id: String,
    name: Option<String>,
    bookmarks: Vec<ExportLeaf>,
    children: Vec<ExportNode>,
}

#[derive(Serialize)]
struct ExportLeaf {
    id: String,
    title: String,
    url: String,
}

enum Step {
    Open(String, usize),
    Close,
}

const NETSCAPE_HEADER: &str = "<!DOCTYPE NETSCAPE-Bookmark-file-1>\n\
<!-- This is an automatically generated file.\n     It will be read and overwritten.\n     DO NOT EDIT! -->\n\
<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">\n\
<TITLE>Bookmarks</TITLE>\n<H1>Bookmarks</H1>\n";

/// Rows of the starter template offered to users before their first import.
const SAMPLE_ROWS: [(&str, &str, &str); 2] = [
    ("AI Tools", "Claude", "https://claude.ai/"),
    (
        "Youtube AI",
        "The AI Advantage - YouTube",
        "https://www.youtube.com/@aiadvantage",
    ),
];

#[derive(Serialize)]
struct SampleRow<'s> {
    topic_path: &'s str,
    title: &'s str,
    url: &'s str,
}

/// A small template document in `format` that imports cleanly.
///
/// JSON samples use the flat row shape, which is easier to write by hand than
/// the nested tree the exporter produces.
pub fn sample_document(format: ExchangeFormat) -> Result<String, ExportError> {
    match format {
        ExchangeFormat::NetscapeHtml => {
            let mut html = String::from(NETSCAPE_HEADER);
            html.push_str("<DL><p>\n");
            for (folder, title, url) in SAMPLE_ROWS {
                html.push_str(&format!(
                    "<DT><H3>{}</H3>\n<DL><p>\n<DT><A HREF=\"{}\">{}</A>\n</DL><p>\n",
                    escape_html(folder),
                    escape_html(url),
                    escape_html(title)
                ));
            }
            html.push_str("</DL><p>\n");
            Ok(html)
        }
        ExchangeFormat::Delimited => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            let csv_err = |e: csv::Error| ExportError::Serialization(e.to_string());
            writer
                .write_record([PATH_COLUMN, TITLE_COLUMN, URL_COLUMN])
                .map_err(csv_err)?;
            for (folder, title, url) in SAMPLE_ROWS {
                writer.write_record([folder, title, url]).map_err(csv_err)?;
            }
            let bytes = writer
                .into_inner()
                .map_err(|e| ExportError::Serialization(e.to_string()))?;
            String::from_utf8(bytes).map_err(|e| ExportError::Serialization(e.to_string()))
        }
        ExchangeFormat::Structured => {
            let rows: Vec<SampleRow> = SAMPLE_ROWS
                .iter()
                .map(|&(topic_path, title, url)| SampleRow { topic_path, title, url })
                .collect();
            serde_json::to_string_pretty(&rows).map_err(|e| ExportError::Serialization(e.to_string()))
        }
    }
}

/// Escapes text for use in HTML content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

impl<'a> Exporter<'a> {
    pub fn new(conn: &'a Connection, settings: &'a EngineSettings) -> Self {
        Self { conn, settings }
    }

    fn snapshot(&self) -> Result<Snapshot, ExportError> {
        let table = load_table_on(self.conn)?;
        let mut bookmarks_by_topic: HashMap<String, Vec<Bookmark>> = HashMap::new();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM bookmarks ORDER BY created_at, rowid",
            BOOKMARK_COLUMNS
        ))?;
        let rows = stmt.query_map([], row_to_bookmark)?;
        for row in rows {
            let bookmark = row?;
            bookmarks_by_topic
                .entry(bookmark.topic_id.clone())
                .or_default()
                .push(bookmark);
        }
        Ok(Snapshot {
            table,
            bookmarks_by_topic,
        })
    }

    fn too_deep(&self) -> ExportError {
        ExportError::Serialization(format!(
            "folder nesting exceeds the limit of {}",
            self.settings.max_folder_depth
        ))
    }

    /// Root topics first, then every descendant in pre-order with its depth.
    fn pre_order(&self, snapshot: &Snapshot, root_id: &str) -> Result<Vec<(String, usize)>, ExportError> {
        let mut order = Vec::with_capacity(snapshot.table.len());
        let mut stack = vec![(root_id.to_string(), 0usize)];
        while let Some((id, depth)) = stack.pop() {
            if depth > self.settings.max_folder_depth {
                return Err(self.too_deep());
            }
            for child in snapshot.table.children_of(&id).iter().rev() {
                stack.push((child.clone(), depth + 1));
            }
            order.push((id, depth));
        }
        Ok(order)
    }

    fn export_html(&self, snapshot: &Snapshot) -> Result<String, ExportError> {
        let mut html = String::from(NETSCAPE_HEADER);
        html.push_str("<DL><p>\n");

        if let Some(root_id) = snapshot.table.root_id() {
            let mut stack = vec![Step::Open(root_id.to_string(), 0)];
            while let Some(step) = stack.pop() {
                match step {
                    Step::Close => html.push_str("</DL><p>\n"),
                    Step::Open(id, depth) => {
                        if depth > self.settings.max_folder_depth {
                            return Err(self.too_deep());
                        }
                        let Some(topic) = snapshot.table.get(&id) else {
                            continue;
                        };
                        if depth > 0 {
                            html.push_str(&format!(
                                "<DT><H3 ADD_DATE=\"{}\">{}</H3>\n<DL><p>\n",
                                topic.created_at,
                                escape_html(&topic.name)
                            ));
                            stack.push(Step::Close);
                        }
                        for bookmark in snapshot.bookmarks_of(&id) {
                            html.push_str(&format!(
                                "<DT><A HREF=\"{}\" ADD_DATE=\"{}\">{}</A>\n",
                                escape_html(&bookmark.url),
                                bookmark.created_at,
                                escape_html(&bookmark.title)
                            ));
                        }
                        for child in snapshot.table.children_of(&id).iter().rev() {
                            stack.push(Step::Open(child.clone(), depth + 1));
                        }
                    }
                }
            }
        }

        html.push_str("</DL><p>\n");
        Ok(html)
    }

    fn export_csv(&self, snapshot: &Snapshot) -> Result<String, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let csv_err = |e: csv::Error| ExportError::Serialization(e.to_string());
        writer
            .write_record([PATH_COLUMN, TITLE_COLUMN, URL_COLUMN])
            .map_err(csv_err)?;

        if let Some(root_id) = snapshot.table.root_id() {
            for (id, _) in self.pre_order(snapshot, root_id)? {
                let path = snapshot
                    .table
                    .path_of(&id, self.settings.max_folder_depth)
                    .join("/");
                for bookmark in snapshot.bookmarks_of(&id) {
                    writer
                        .write_record([path.as_str(), bookmark.title.as_str(), bookmark.url.as_str()])
                        .map_err(csv_err)?;
                }
            }
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Serialization(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| ExportError::Serialization(e.to_string()))
    }

    /// Builds nodes bottom-up: reverse pre-order sees children before parents.
    fn export_json(&self, snapshot: &Snapshot) -> Result<String, ExportError> {
        let mut roots = Vec::new();
        if let Some(root_id) = snapshot.table.root_id() {
            let order = self.pre_order(snapshot, root_id)?;
            let mut built: HashMap<String, ExportNode> = HashMap::new();
            for (id, depth) in order.iter().rev() {
                let Some(topic) = snapshot.table.get(id) else {
                    continue;
                };
                let children = snapshot
                    .table
                    .children_of(id)
                    .iter()
                    .filter_map(|child| built.remove(child))
                    .collect();
                let bookmarks = snapshot
                    .bookmarks_of(id)
                    .iter()
                    .map(|b| ExportLeaf {
                        id: b.id.clone(),
                        title: b.title.clone(),
                        url: b.url.clone(),
                    })
                    .collect();
                built.insert(
                    id.clone(),
                    ExportNode {
                        id: id.clone(),
                        name: if *depth == 0 { None } else { Some(topic.name.clone()) },
                        bookmarks,
                        children,
                    },
                );
            }
            roots.extend(built.remove(root_id));
        }
        serde_json::to_string_pretty(&roots).map_err(|e| ExportError::Serialization(e.to_string()))
    }
}

impl<'a> ExporterTrait for Exporter<'a> {
    fn export(&self, format: ExchangeFormat) -> Result<String, ExportError> {
        let snapshot = self.snapshot()?;
        let document = match format {
            ExchangeFormat::NetscapeHtml => self.export_html(&snapshot)?,
            ExchangeFormat::Delimited => self.export_csv(&snapshot)?,
            ExchangeFormat::Structured => self.export_json(&snapshot)?,
        };
        tracing::info!(format = %format, topics = snapshot.table.len(), bytes = document.len(), "exported collection");
        Ok(document)
    }
}
