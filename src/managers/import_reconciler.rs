//! Import Reconciler for Topicmarks.
//!
//! Merges parsed triples into the stored hierarchy. A batch runs in a single
//! transaction: it either commits every created topic and bookmark and reports
//! the counts, or it fails and leaves the store exactly as it was.
//!
//! Deduplication key is (resolved topic id, trimmed url). Keys seen earlier in
//! the same batch and keys already in storage both count as skipped. Lookups
//! go through the `(topic_id, url)` and `(parent_id, name)` unique indexes and
//! a per-batch path cache, so cost per triple does not grow with corpus size.

use rusqlite::{params, Connection};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::topic_manager::resolve_on;
use super::unix_now;
use crate::database::begin;
use crate::services::parsers;
use crate::types::errors::ImportError;
use crate::types::import::{ExchangeFormat, ImportSummary, Triple};
use crate::types::settings::EngineSettings;

/// Trait defining import operations.
pub trait ImportReconcilerTrait {
    /// Parses `blob` as `format` and imports the result as one batch.
    fn import_blob(&mut self, format: ExchangeFormat, blob: &str) -> Result<ImportSummary, ImportError>;
    /// Imports already-normalized triples as one batch.
    fn import_batch(&mut self, triples: &[Triple]) -> Result<ImportSummary, ImportError>;
}

/// Import reconciler backed by a SQLite connection.
pub struct ImportReconciler<'a> {
    conn: &'a Connection,
    settings: &'a EngineSettings,
}

impl<'a> ImportReconciler<'a> {
    pub fn new(conn: &'a Connection, settings: &'a EngineSettings) -> Self {
        Self { conn, settings }
    }
}

/// Per-batch state: resolved paths and keys already handled.
struct Batch<'s> {
    settings: &'s EngineSettings,
    topic_for_path: HashMap<Vec<String>, String>,
    seen: HashSet<(String, String)>,
    summary: ImportSummary,
    now: i64,
}

impl<'s> Batch<'s> {
    fn new(settings: &'s EngineSettings) -> Self {
        Self {
            settings,
            topic_for_path: HashMap::new(),
            seen: HashSet::new(),
            summary: ImportSummary::default(),
            now: unix_now(),
        }
    }

    fn resolve(&mut self, conn: &Connection, path: &[String]) -> Result<String, ImportError> {
        if let Some(id) = self.topic_for_path.get(path) {
            return Ok(id.clone());
        }
        let topic = resolve_on(conn, self.settings, path)?;
        self.topic_for_path.insert(path.to_vec(), topic.id.clone());
        Ok(topic.id)
    }

    fn apply(&mut self, conn: &Connection, triple: &Triple) -> Result<(), ImportError> {
        let url = triple.url.trim();
        if url.is_empty() {
            return Err(ImportError::Validation(format!(
                "entry '{}' has an empty url",
                triple.title
            )));
        }
        let topic_id = self.resolve(conn, &triple.path)?;

        let key = (topic_id, url.to_string());
        if self.seen.contains(&key) {
            self.summary.skipped += 1;
            return Ok(());
        }

        let title = match triple.title.trim() {
            "" => url,
            t => t,
        };
        // The unique index turns an existing (topic_id, url) pair into a no-op.
        let inserted = conn.execute(
            "INSERT INTO bookmarks (id, title, url, notes, topic_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, NULL, ?4, ?5, ?5) \
             ON CONFLICT(topic_id, url) DO NOTHING",
            params![Uuid::new_v4().to_string(), title, url, key.0, self.now],
        )?;
        if inserted > 0 {
            self.summary.created += 1;
        } else {
            self.summary.skipped += 1;
        }
        self.seen.insert(key);
        Ok(())
    }
}

impl<'a> ImportReconcilerTrait for ImportReconciler<'a> {
    fn import_blob(&mut self, format: ExchangeFormat, blob: &str) -> Result<ImportSummary, ImportError> {
        let triples = parsers::parse(format, blob, self.settings).map_err(|e| {
            tracing::warn!(format = %format, "import rejected: {}", e);
            e
        })?;
        tracing::debug!(format = %format, entries = triples.len(), "parsed upload");
        self.import_batch(&triples)
    }

    fn import_batch(&mut self, triples: &[Triple]) -> Result<ImportSummary, ImportError> {
        let tx = begin(self.conn)?;
        let mut batch = Batch::new(self.settings);
        for triple in triples {
            if let Err(e) = batch.apply(&tx, triple) {
                tracing::warn!(entries = triples.len(), "import rolled back: {}", e);
                return Err(e);
            }
        }
        tx.commit()?;

        tracing::info!(
            created = batch.summary.created,
            skipped = batch.summary.skipped,
            "import batch committed"
        );
        Ok(batch.summary)
    }
}
