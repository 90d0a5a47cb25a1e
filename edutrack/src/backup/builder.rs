//! Snapshot construction from current store state.

use chrono::Utc;
use edutrack_storage::{CollectionStore, Collections};
use std::sync::Arc;
use tracing::{debug, warn};

use super::checksum;
use super::types::{backup_timestamp, BackupReport, Snapshot};
use crate::error::Result;

/// Function used to checksum the collections of a new snapshot.
pub type ChecksumFn = fn(&Collections) -> Result<String>;

/// Builds exportable snapshots. Read-only with respect to the store.
pub struct SnapshotBuilder {
    store: Arc<dyn CollectionStore>,
    current_version: String,
    checksum_fn: ChecksumFn,
}

impl SnapshotBuilder {
    /// `current_version` is stamped on every snapshot; it is the running
    /// application's data-format version, not the import floor.
    pub fn new(store: Arc<dyn CollectionStore>, current_version: impl Into<String>) -> Self {
        Self {
            store,
            current_version: current_version.into(),
            checksum_fn: checksum::digest,
        }
    }

    /// Replace the checksum function.
    pub fn with_checksum_fn(mut self, checksum_fn: ChecksumFn) -> Self {
        self.checksum_fn = checksum_fn;
        self
    }

    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    /// Build a fresh snapshot of the store.
    ///
    /// A checksum failure does not fail the export: the snapshot is returned
    /// without a checksum and the report is marked degraded.
    pub async fn build(&self) -> Result<BackupReport> {
        let collections = self.store.read_collections().await?;
        let (students, attendance, activities) = collections.counts();
        debug!(students, attendance, activities, "Building snapshot");

        let checksum = match (self.checksum_fn)(&collections) {
            Ok(sum) => Some(sum),
            Err(e) => {
                warn!("Exporting snapshot without checksum: {}", e);
                None
            }
        };
        let degraded = checksum.is_none();

        Ok(BackupReport {
            snapshot: Snapshot {
                collections,
                last_backup: Some(backup_timestamp(Utc::now())),
                version: self.current_version.clone(),
                checksum,
            },
            degraded,
        })
    }
}
