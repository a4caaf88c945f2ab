use serde::{Deserialize, Serialize};

/// Engine settings, persisted as JSON by the settings engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Name given to the root sentinel when it is first created.
    pub root_name: String,
    /// Name used when a topic is created with a blank name.
    pub default_topic_name: String,
    /// Browser-generated folder labels elided from import paths wherever they appear.
    /// Compared trimmed and lowercased.
    pub synthetic_root_labels: Vec<String>,
    pub topic_name_matching: NameMatching,
    pub url_comparison: UrlComparison,
    /// Deepest folder nesting accepted by parsers and tree walks.
    pub max_folder_depth: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            root_name: "My Collections".to_string(),
            default_topic_name: "New folder".to_string(),
            synthetic_root_labels: Self::default_synthetic_root_labels(),
            topic_name_matching: NameMatching::Exact,
            url_comparison: UrlComparison::Exact,
            max_folder_depth: 64,
        }
    }
}

impl EngineSettings {
    pub fn default_synthetic_root_labels() -> Vec<String> {
        ["favorites", "bookmarks", "bookmarks bar", "bookmarks menu", "bookmarks toolbar"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Returns true when `segment` is one of the synthetic root labels.
    pub fn is_synthetic_root_label(&self, segment: &str) -> bool {
        let folded = segment.trim().to_lowercase();
        self.synthetic_root_labels
            .iter()
            .any(|label| label.trim().to_lowercase() == folded)
    }
}

/// How path segments are matched against existing sibling topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatching {
    Exact,
    /// Unicode lowercase folding, the same folding the denial set uses.
    CaseInsensitive,
}

impl NameMatching {
    /// Whether two topic names denote the same folder under this policy.
    pub fn same_name(self, a: &str, b: &str) -> bool {
        match self {
            NameMatching::Exact => a == b,
            NameMatching::CaseInsensitive => a.to_lowercase() == b.to_lowercase(),
        }
    }
}

/// How the duplicate finder compares urls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlComparison {
    Exact,
    /// Lowercase scheme and host, drop one trailing slash.
    Normalized,
}
