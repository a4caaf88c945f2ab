use serde::{Deserialize, Serialize};
use std::fmt;

/// The normalized unit every format parser produces: a folder path, a title and a url.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// Folder names from the outermost folder inward. May be empty.
    pub path: Vec<String>,
    pub title: String,
    pub url: String,
}

impl Triple {
    pub fn new<P, S>(path: P, title: &str, url: &str) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            title: title.to_string(),
            url: url.to_string(),
        }
    }
}

/// Bookmark export formats understood by the parsers and the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeFormat {
    /// Netscape/Safari bookmark file: nested `<DL>` lists introduced by `<H3>` headings.
    NetscapeHtml,
    /// `topic_path,title,url` rows with `/`-joined folder names.
    Delimited,
    /// JSON: flat `{topic_path, title, url}` rows or a nested `{name, children, bookmarks}` tree.
    Structured,
}

impl ExchangeFormat {
    pub const ALL: [ExchangeFormat; 3] = [
        ExchangeFormat::NetscapeHtml,
        ExchangeFormat::Delimited,
        ExchangeFormat::Structured,
    ];

    /// Resolves a short format name or file extension.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "html" | "htm" | "netscape" => Some(ExchangeFormat::NetscapeHtml),
            "csv" => Some(ExchangeFormat::Delimited),
            "json" => Some(ExchangeFormat::Structured),
            _ => None,
        }
    }

    /// Guesses the format of an upload from its content.
    pub fn detect(blob: &str) -> Self {
        let trimmed = blob.trim_start_matches('\u{feff}').trim_start();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            return ExchangeFormat::Structured;
        }
        let head: String = trimmed.chars().take(4096).collect::<String>().to_ascii_lowercase();
        if head.starts_with("<!doctype netscape")
            || head.contains("<dl")
            || head.contains("<a ")
            || head.starts_with("<html")
        {
            return ExchangeFormat::NetscapeHtml;
        }
        ExchangeFormat::Delimited
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExchangeFormat::NetscapeHtml => "html",
            ExchangeFormat::Delimited => "csv",
            ExchangeFormat::Structured => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExchangeFormat::NetscapeHtml => "text/html",
            ExchangeFormat::Delimited => "text/csv",
            ExchangeFormat::Structured => "application/json",
        }
    }
}

impl fmt::Display for ExchangeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Counts reported by a committed import batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub created: usize,
    /// Triples whose (topic, url) pair already existed, in storage or earlier in the batch.
    pub skipped: usize,
}
