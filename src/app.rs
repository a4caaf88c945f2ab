//! App Core for Topicmarks.
//!
//! Holds the database and the settings engine. Managers borrow the connection
//! and settings with a lifetime, so they are created per call through the
//! accessors below.

use std::sync::Arc;

use crate::database::Database;
use crate::managers::bookmark_manager::BookmarkManager;
use crate::managers::duplicate_finder::DuplicateFinder;
use crate::managers::import_reconciler::ImportReconciler;
use crate::managers::topic_manager::TopicManager;
use crate::services::exporter::Exporter;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::settings::EngineSettings;

/// Central application struct.
pub struct App {
    pub db: Arc<Database>,
    pub settings_engine: SettingsEngine,
}

impl App {
    /// Opens the database at `db_path` and loads settings from the default location.
    pub fn new(db_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        Self::new_with_settings(db_path, None)
    }

    /// Like [`App::new`], reading settings from `settings_path` when given.
    ///
    /// A settings file that fails to load is logged and replaced by defaults.
    pub fn new_with_settings(
        db_path: &str,
        settings_path: Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(Database::open(db_path)?);

        let mut settings_engine = SettingsEngine::new(settings_path);
        if let Err(e) = settings_engine.load() {
            tracing::warn!(path = %settings_engine.get_config_path(), "using default settings: {}", e);
        }

        tracing::info!(db = %db_path, "topicmarks opened");
        Ok(Self { db, settings_engine })
    }

    pub fn settings(&self) -> &EngineSettings {
        self.settings_engine.get_settings()
    }

    pub fn topics(&self) -> TopicManager<'_> {
        TopicManager::new(self.db.connection(), self.settings())
    }

    pub fn bookmarks(&self) -> BookmarkManager<'_> {
        BookmarkManager::new(self.db.connection(), self.settings())
    }

    pub fn importer(&self) -> ImportReconciler<'_> {
        ImportReconciler::new(self.db.connection(), self.settings())
    }

    pub fn duplicates(&self) -> DuplicateFinder<'_> {
        DuplicateFinder::new(self.db.connection(), self.settings())
    }

    pub fn exporter(&self) -> Exporter<'_> {
        Exporter::new(self.db.connection(), self.settings())
    }
}
