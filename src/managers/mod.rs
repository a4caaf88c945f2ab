// Topicmarks state managers
// Managers handle stateful operations against the store: topics, bookmarks,
// import reconciliation and duplicate cleanup.

pub mod bookmark_manager;
pub mod duplicate_finder;
pub mod import_reconciler;
pub mod topic_manager;

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current UNIX timestamp in seconds.
pub(crate) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
