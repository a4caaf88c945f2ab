use std::fmt;

// === ImportError ===

/// Errors that abort an import batch. Nothing is written when one is returned.
#[derive(Debug)]
pub enum ImportError {
    /// The upload does not conform to the requested format.
    Parse(String),
    /// A triple or request field failed validation.
    Validation(String),
    /// Database operation failed.
    Database(String),
}

impl ImportError {
    pub fn code(&self) -> &'static str {
        match self {
            ImportError::Parse(_) => "parse_error",
            ImportError::Validation(_) => "validation_error",
            ImportError::Database(_) => "storage_error",
        }
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Parse(msg) => write!(f, "Import parse error: {}", msg),
            ImportError::Validation(msg) => write!(f, "Import validation error: {}", msg),
            ImportError::Database(msg) => write!(f, "Import database error: {}", msg),
        }
    }
}

impl std::error::Error for ImportError {}

impl From<rusqlite::Error> for ImportError {
    fn from(e: rusqlite::Error) -> Self {
        ImportError::Database(e.to_string())
    }
}

impl From<TopicError> for ImportError {
    fn from(e: TopicError) -> Self {
        match e {
            TopicError::DatabaseError(msg) => ImportError::Database(msg),
            other => ImportError::Validation(other.to_string()),
        }
    }
}

// === TopicError ===

/// Errors related to topic (folder) operations.
#[derive(Debug)]
pub enum TopicError {
    /// Topic with the given ID was not found.
    NotFound(String),
    /// The requested parent topic does not exist.
    TargetNotFound(String),
    /// The root topic cannot be moved or deleted.
    RootImmutable,
    /// A topic cannot become its own parent.
    SelfParent(String),
    /// The target parent lies inside the subtree being moved.
    Cycle { topic_id: String, target_id: String },
    /// The parent already has a child with this name.
    NameConflict(String),
    /// The provided name is blank.
    InvalidName,
    /// The edit would nest folders deeper than the configured limit.
    TooDeep { limit: usize },
    /// Database operation failed.
    DatabaseError(String),
}

impl TopicError {
    /// Stable reason code reported to the request layer.
    pub fn code(&self) -> &'static str {
        match self {
            TopicError::NotFound(_) => "not_found",
            TopicError::TargetNotFound(_) => "target_not_found",
            TopicError::RootImmutable => "root_immutable",
            TopicError::SelfParent(_) => "self_move",
            TopicError::Cycle { .. } => "cycle",
            TopicError::NameConflict(_) => "name_conflict",
            TopicError::InvalidName => "invalid_name",
            TopicError::TooDeep { .. } => "depth_exceeded",
            TopicError::DatabaseError(_) => "storage_error",
        }
    }
}

impl fmt::Display for TopicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicError::NotFound(id) => write!(f, "Topic not found: {}", id),
            TopicError::TargetNotFound(id) => write!(f, "Target topic not found: {}", id),
            TopicError::RootImmutable => write!(f, "The root topic cannot be moved or deleted"),
            TopicError::SelfParent(id) => write!(f, "Topic cannot be its own parent: {}", id),
            TopicError::Cycle { topic_id, target_id } => write!(
                f,
                "Moving topic {} under {} would create a cycle",
                topic_id, target_id
            ),
            TopicError::NameConflict(name) => {
                write!(f, "A sibling topic named '{}' already exists", name)
            }
            TopicError::InvalidName => write!(f, "Topic name cannot be empty"),
            TopicError::TooDeep { limit } => {
                write!(f, "Folder nesting would exceed the limit of {}", limit)
            }
            TopicError::DatabaseError(msg) => write!(f, "Topic database error: {}", msg),
        }
    }
}

impl std::error::Error for TopicError {}

impl From<rusqlite::Error> for TopicError {
    fn from(e: rusqlite::Error) -> Self {
        TopicError::DatabaseError(e.to_string())
    }
}

// === BookmarkError ===

/// Errors related to bookmark management operations.
#[derive(Debug)]
pub enum BookmarkError {
    /// Bookmark with the given ID was not found.
    NotFound(String),
    /// The url is missing or blank.
    MissingUrl,
    /// The target topic was not found.
    TopicNotFound(String),
    /// The topic already holds a bookmark with this URL.
    DuplicateUrl(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl BookmarkError {
    pub fn code(&self) -> &'static str {
        match self {
            BookmarkError::NotFound(_) => "not_found",
            BookmarkError::MissingUrl => "missing_url",
            BookmarkError::TopicNotFound(_) => "target_not_found",
            BookmarkError::DuplicateUrl(_) => "duplicate_url",
            BookmarkError::DatabaseError(_) => "storage_error",
        }
    }
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkError::NotFound(id) => write!(f, "Bookmark not found: {}", id),
            BookmarkError::MissingUrl => write!(f, "Bookmark URL is required"),
            BookmarkError::TopicNotFound(id) => write!(f, "Bookmark topic not found: {}", id),
            BookmarkError::DuplicateUrl(url) => write!(f, "Duplicate bookmark URL: {}", url),
            BookmarkError::DatabaseError(msg) => {
                write!(f, "Bookmark database error: {}", msg)
            }
        }
    }
}

impl std::error::Error for BookmarkError {}

impl From<rusqlite::Error> for BookmarkError {
    fn from(e: rusqlite::Error) -> Self {
        BookmarkError::DatabaseError(e.to_string())
    }
}

impl From<TopicError> for BookmarkError {
    fn from(e: TopicError) -> Self {
        match e {
            TopicError::NotFound(id) | TopicError::TargetNotFound(id) => {
                BookmarkError::TopicNotFound(id)
            }
            other => BookmarkError::DatabaseError(other.to_string()),
        }
    }
}

// === ExportError ===

/// Errors related to exporting the collection.
#[derive(Debug)]
pub enum ExportError {
    /// The tree could not be written in the requested format.
    Serialization(String),
    /// Database operation failed.
    Database(String),
}

impl ExportError {
    pub fn code(&self) -> &'static str {
        match self {
            ExportError::Serialization(_) => "serialization_error",
            ExportError::Database(_) => "storage_error",
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Serialization(msg) => write!(f, "Export serialization error: {}", msg),
            ExportError::Database(msg) => write!(f, "Export database error: {}", msg),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<rusqlite::Error> for ExportError {
    fn from(e: rusqlite::Error) -> Self {
        ExportError::Database(e.to_string())
    }
}

impl From<TopicError> for ExportError {
    fn from(e: TopicError) -> Self {
        ExportError::Database(e.to_string())
    }
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl SettingsError {
    pub fn code(&self) -> &'static str {
        match self {
            SettingsError::IoError(_) => "io_error",
            SettingsError::SerializationError(_) => "serialization_error",
            SettingsError::InvalidKey(_) => "invalid_key",
            SettingsError::InvalidValue(_) => "invalid_value",
        }
    }
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}
