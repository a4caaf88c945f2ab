//! Delimited-row parser: a `topic_path,title,url` header followed by one row per bookmark.
//!
//! Columns are located by header name (case-insensitive), so extra columns and
//! any column order are accepted. Rows with an empty url are discarded.

use super::{check_depth, make_triple, split_topic_path, FormatParser};
use crate::types::errors::ImportError;
use crate::types::import::{ExchangeFormat, Triple};

pub const PATH_COLUMN: &str = "topic_path";
pub const TITLE_COLUMN: &str = "title";
pub const URL_COLUMN: &str = "url";

pub struct DelimitedParser {
    max_depth: usize,
}

impl DelimitedParser {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl FormatParser for DelimitedParser {
    fn format(&self) -> ExchangeFormat {
        ExchangeFormat::Delimited
    }

    fn parse(&self, blob: &str) -> Result<Vec<Triple>, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(blob.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| ImportError::Parse(format!("unreadable header row: {}", e)))?
            .clone();
        let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

        let url_idx = column(URL_COLUMN).ok_or_else(|| {
            ImportError::Parse(format!("header row has no '{}' column", URL_COLUMN))
        })?;
        let path_idx = column(PATH_COLUMN);
        let title_idx = column(TITLE_COLUMN);

        let mut triples = Vec::new();
        for (index, record) in reader.records().enumerate() {
            // Header is line 1.
            let record = record.map_err(|e| ImportError::Parse(format!("row {}: {}", index + 2, e)))?;
            let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

            let path = split_topic_path(field(path_idx));
            check_depth(&path, self.max_depth)?;
            if let Some(triple) = make_triple(path, field(title_idx), field(Some(url_idx))) {
                triples.push(triple);
            }
        }
        Ok(triples)
    }
}
