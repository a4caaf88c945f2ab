//! Netscape/Safari bookmark file parser.
//!
//! Folders are `<DL>` containers, each introduced by an `<H3>` heading that
//! precedes it. A link's path is rebuilt by walking outward through its
//! enclosing `<DL>` ancestors and naming each one by the heading that
//! introduced exactly that container. Matching on containment rather than on
//! "the nearest earlier heading" keeps links in sibling folders apart.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

use super::{check_depth, make_triple, FormatParser};
use crate::types::errors::ImportError;
use crate::types::import::{ExchangeFormat, Triple};

pub struct NetscapeHtmlParser {
    max_depth: usize,
}

impl NetscapeHtmlParser {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

/// Concatenated text of an element, trimmed at the ends only.
fn element_text<'a>(pieces: impl Iterator<Item = &'a str>) -> String {
    pieces.collect::<String>().trim().to_string()
}

impl FormatParser for NetscapeHtmlParser {
    fn format(&self) -> ExchangeFormat {
        ExchangeFormat::NetscapeHtml
    }

    fn parse(&self, blob: &str) -> Result<Vec<Triple>, ImportError> {
        let document = Html::parse_document(blob);

        // A heading introduces the first list container after it in document
        // order. Headings without a container of their own (empty folders) are
        // superseded by the next heading.
        let mut folder_names = HashMap::new();
        let mut pending: Option<String> = None;
        for node in document.root_element().descendants() {
            let Some(element) = node.value().as_element() else {
                continue;
            };
            match element.name() {
                "h3" => {
                    pending = ElementRef::wrap(node).map(|heading| element_text(heading.text()));
                }
                "dl" => {
                    if let Some(name) = pending.take() {
                        folder_names.insert(node.id(), name);
                    }
                }
                _ => {}
            }
        }

        let anchors = Selector::parse("a[href]")
            .map_err(|e| ImportError::Parse(format!("invalid selector: {:?}", e)))?;

        let mut triples = Vec::new();
        for anchor in document.select(&anchors) {
            let href = anchor.value().attr("href").unwrap_or_default();
            let title = element_text(anchor.text());

            let mut path = Vec::new();
            let mut containers = 0usize;
            for ancestor in anchor.ancestors() {
                let is_list = ancestor
                    .value()
                    .as_element()
                    .map_or(false, |element| element.name() == "dl");
                if !is_list {
                    continue;
                }
                containers += 1;
                if containers > self.max_depth + 1 {
                    return Err(ImportError::Parse(format!(
                        "folder nesting exceeds the limit of {}",
                        self.max_depth
                    )));
                }
                if let Some(name) = folder_names.get(&ancestor.id()).filter(|n| !n.is_empty()) {
                    path.push(name.clone());
                }
            }
            path.reverse();
            check_depth(&path, self.max_depth)?;

            if let Some(triple) = make_triple(path, &title, href) {
                triples.push(triple);
            }
        }
        Ok(triples)
    }
}
