//! Format parsers for bookmark uploads.
//!
//! Each parser turns a raw export into a sequence of [`Triple`]s in a stable
//! order. Paths never contain blank segments, urls are trimmed and never empty,
//! and a blank title falls back to the url. A blob that is empty or only
//! whitespace parses to no triples in every format.

pub mod delimited;
pub mod netscape_html;
pub mod structured;

pub use delimited::DelimitedParser;
pub use netscape_html::NetscapeHtmlParser;
pub use structured::StructuredParser;

use crate::types::errors::ImportError;
use crate::types::import::{ExchangeFormat, Triple};
use crate::types::settings::EngineSettings;

/// Trait implemented by every upload format.
pub trait FormatParser {
    fn format(&self) -> ExchangeFormat;
    fn parse(&self, blob: &str) -> Result<Vec<Triple>, ImportError>;
}

/// Returns the parser for `format`, bounded by the configured folder depth.
pub fn parser_for(format: ExchangeFormat, settings: &EngineSettings) -> Box<dyn FormatParser> {
    let max_depth = settings.max_folder_depth;
    match format {
        ExchangeFormat::NetscapeHtml => Box::new(NetscapeHtmlParser::new(max_depth)),
        ExchangeFormat::Delimited => Box::new(DelimitedParser::new(max_depth)),
        ExchangeFormat::Structured => Box::new(StructuredParser::new(max_depth)),
    }
}

/// Parses `blob` as `format`.
pub fn parse(format: ExchangeFormat, blob: &str, settings: &EngineSettings) -> Result<Vec<Triple>, ImportError> {
    let blob = blob.trim_start_matches('\u{feff}');
    if blob.trim().is_empty() {
        return Ok(Vec::new());
    }
    parser_for(format, settings).parse(blob)
}

/// Builds a triple from raw fields, or `None` when the url is blank.
pub(crate) fn make_triple(path: Vec<String>, title: &str, url: &str) -> Option<Triple> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    let title = match title.trim() {
        "" => url,
        t => t,
    };
    Some(Triple {
        path,
        title: title.to_string(),
        url: url.to_string(),
    })
}

/// Splits a `/`-joined folder path, dropping empty segments.
pub(crate) fn split_topic_path(raw: &str) -> Vec<String> {
    raw.split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn check_depth(path: &[String], max_depth: usize) -> Result<(), ImportError> {
    if path.len() > max_depth {
        return Err(ImportError::Parse(format!(
            "folder nesting of {} levels exceeds the limit of {}",
            path.len(),
            max_depth
        )));
    }
    Ok(())
}
