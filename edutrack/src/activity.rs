//! Activity history.
//!
//! Entries are kept newest first and bounded to a fixed number (50 by
//! default). Recording an entry reads and rewrites all three collections
//! together, so it runs under the operation guard like every other full-state
//! write; the public entry point is [`BackupManager::record_activity`].
//!
//! [`BackupManager::record_activity`]: crate::backup::BackupManager::record_activity

use chrono::Utc;
use edutrack_storage::CollectionStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::backup::guard::OperationPermit;
use crate::backup::types::backup_timestamp;
use crate::error::Result;

/// Default bound on the activity log.
pub const DEFAULT_ACTIVITY_LIMIT: usize = 50;

/// One entry of the activity history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub timestamp: String,
    pub action: String,
    #[serde(default)]
    pub details: String,
}

impl ActivityEvent {
    pub fn now(action: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            timestamp: backup_timestamp(Utc::now()),
            action: action.into(),
            details: details.into(),
        }
    }
}

/// Prepend an entry to the activity log, keeping at most `limit` entries.
///
/// The caller must hold the operation guard for the whole read-modify-write.
pub(crate) async fn record_activity(
    store: &dyn CollectionStore,
    _permit: &OperationPermit,
    action: &str,
    details: &str,
    limit: usize,
) -> Result<ActivityEvent> {
    let event = ActivityEvent::now(action, details);
    let mut collections = store.read_collections().await?;

    collections.activity_log.insert(0, serde_json::to_value(&event)?);
    collections.activity_log.truncate(limit);

    debug!(action, entries = collections.activity_log.len(), "Recording activity");
    store.write_collections(collections).await?;
    Ok(event)
}

/// The `limit` most recent entries that have the expected shape.
pub async fn recent_activity(store: &dyn CollectionStore, limit: usize) -> Result<Vec<ActivityEvent>> {
    let collections = store.read_collections().await?;
    Ok(collections
        .activity_log
        .into_iter()
        .filter_map(|entry: Value| serde_json::from_value(entry).ok())
        .take(limit)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::guard::OperationGuard;
    use edutrack_storage::{Collections, MemoryStore};
    use serde_json::json;

    fn permit() -> OperationPermit {
        OperationGuard::new().try_acquire().unwrap()
    }

    #[tokio::test]
    async fn test_newest_first() {
        let store = MemoryStore::new();
        record_activity(&store, &permit(), "Student added", "Ada", DEFAULT_ACTIVITY_LIMIT)
            .await
            .unwrap();
        record_activity(&store, &permit(), "Backup created", "", DEFAULT_ACTIVITY_LIMIT)
            .await
            .unwrap();

        let recent = recent_activity(&store, 10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].action, "Backup created");
        assert_eq!(recent[1].details, "Ada");
    }

    #[tokio::test]
    async fn test_bounded_log() {
        let existing: Vec<Value> = (0..50)
            .map(|i| json!({"timestamp": "2024-01-01T00:00:00.000Z", "action": format!("old {}", i), "details": ""}))
            .collect();
        let store = MemoryStore::with_collections(Collections::new(vec![], vec![], existing));

        record_activity(&store, &permit(), "System reset", "All data cleared", DEFAULT_ACTIVITY_LIMIT)
            .await
            .unwrap();

        let log = store.snapshot().activity_log;
        assert_eq!(log.len(), 50);
        assert_eq!(log[0]["action"], "System reset");
        assert_eq!(log[49]["action"], "old 48");
    }

    #[tokio::test]
    async fn test_other_collections_untouched() {
        let store = MemoryStore::with_collections(Collections::new(
            vec![json!({"id": "S1"})],
            vec![json!({"studentId": "S1"})],
            vec![],
        ));
        record_activity(&store, &permit(), "Backup created", "Downloaded system backup", 50)
            .await
            .unwrap();

        let after = store.snapshot();
        assert_eq!(after.students, vec![json!({"id": "S1"})]);
        assert_eq!(after.attendance, vec![json!({"studentId": "S1"})]);
    }

    #[tokio::test]
    async fn test_recent_skips_malformed_entries() {
        let store = MemoryStore::with_collections(Collections::new(
            vec![],
            vec![],
            vec![json!("garbage"), json!({"timestamp": "t", "action": "ok"})],
        ));
        let recent = recent_activity(&store, 10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].details, "");
    }
}
