//! Guarded export, restore and clear operations over one store.
//!
//! Export: build a snapshot under the operation guard and hand back bytes or a file.
//! Clear: snapshot first, then empty the store, so a backup always exists.

use chrono::Local;
use edutrack_storage::{CollectionStore, Collections};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use super::builder::SnapshotBuilder;
use super::coordinator::RestoreCoordinator;
use super::guard::{OperationGuard, OperationPermit};
use super::notify::{Notifier, Severity};
use super::types::{backup_filename, BackupReport};
use super::version::VersionNegotiator;
use crate::activity::{self, ActivityEvent};
use crate::config::BackupConfig;
use crate::error::Result;

/// Result of writing a backup file.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub report: BackupReport,
}

/// Entry point to the backup subsystem.
///
/// Export, restore, rollback and clear share one [`OperationGuard`]; only one
/// of them runs at a time.
pub struct BackupManager {
    store: Arc<dyn CollectionStore>,
    builder: SnapshotBuilder,
    coordinator: RestoreCoordinator,
    guard: OperationGuard,
    notifier: Arc<dyn Notifier>,
    product_name: String,
    activity_limit: usize,
}

impl BackupManager {
    pub fn new(
        store: Arc<dyn CollectionStore>,
        config: &BackupConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let guard = OperationGuard::new();
        let builder = SnapshotBuilder::new(store.clone(), config.current_version.clone());
        let coordinator = RestoreCoordinator::new(
            store.clone(),
            VersionNegotiator::new(config.min_supported_version.clone()),
            notifier.clone(),
            guard.clone(),
        );

        Self {
            store,
            builder,
            coordinator,
            guard,
            notifier,
            product_name: config.product_name.clone(),
            activity_limit: config.activity_log_limit,
        }
    }

    /// Replace the snapshot builder (e.g. to change how checksums are computed).
    pub fn with_builder(mut self, builder: SnapshotBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn coordinator(&self) -> &RestoreCoordinator {
        &self.coordinator
    }

    pub fn guard(&self) -> &OperationGuard {
        &self.guard
    }

    /// Build a fresh snapshot of the store.
    pub async fn export(&self) -> Result<BackupReport> {
        let _permit = self.acquire()?;
        self.build_report().await
    }

    /// Build a snapshot and serialize it as backup file contents.
    pub async fn export_bytes(&self) -> Result<(Vec<u8>, BackupReport)> {
        let report = self.export().await?;
        let bytes = report.snapshot.to_json_pretty()?.into_bytes();
        Ok((bytes, report))
    }

    /// Write a backup file named `<product>_Backup_<YYYY-MM-DD_HH-MM>.json` into `dir`.
    pub async fn export_to_dir(&self, dir: &Path) -> Result<ExportedFile> {
        let _permit = self.acquire()?;
        let report = self.build_report().await?;
        let path = self.write_backup(dir, &report).await?;
        self.notifier
            .notify("Backup created successfully!", Severity::Success);
        Ok(ExportedFile { path, report })
    }

    /// Snapshot the store, then replace every collection with an empty one.
    ///
    /// Returns the pre-clear snapshot so the caller can keep it.
    pub async fn clear_all(&self) -> Result<BackupReport> {
        let _permit = self.acquire()?;
        let safety = self.build_report().await?;
        self.clear_store().await?;
        Ok(safety)
    }

    /// Write a safety backup into `dir`, then clear the store.
    ///
    /// Nothing is cleared if the backup file cannot be written.
    pub async fn clear_all_to_dir(&self, dir: &Path) -> Result<ExportedFile> {
        let _permit = self.acquire()?;
        let report = self.build_report().await?;
        let path = self.write_backup(dir, &report).await?;
        self.clear_store().await?;
        Ok(ExportedFile { path, report })
    }

    /// Prepend an entry to the activity log under the operation guard.
    ///
    /// Fails with `Busy` instead of racing an export, restore or clear.
    pub async fn record_activity(&self, action: &str, details: &str) -> Result<ActivityEvent> {
        let permit = self.acquire()?;
        activity::record_activity(
            self.store.as_ref(),
            &permit,
            action,
            details,
            self.activity_limit,
        )
        .await
    }

    fn acquire(&self) -> Result<OperationPermit> {
        self.guard.try_acquire().inspect_err(|e| {
            self.notifier.notify(&e.to_string(), Severity::Error);
        })
    }

    async fn build_report(&self) -> Result<BackupReport> {
        let report = self.builder.build().await?;
        if report.degraded {
            self.notifier.notify(
                "Backup created without an integrity checksum",
                Severity::Warning,
            );
        }
        Ok(report)
    }

    async fn write_backup(&self, dir: &Path, report: &BackupReport) -> Result<PathBuf> {
        let bytes = report.snapshot.to_json_pretty()?.into_bytes();
        let path = dir.join(backup_filename(
            &self.product_name,
            Local::now().naive_local(),
        ));
        if let Err(e) = write_file(&path, &bytes).await {
            warn!(path = %path.display(), "Backup write failed: {}", e);
            self.notifier
                .notify("Backup failed. Please try again.", Severity::Error);
            return Err(e);
        }

        info!(path = %path.display(), bytes = bytes.len(), "Backup written");
        Ok(path)
    }

    async fn clear_store(&self) -> Result<()> {
        self.store.write_collections(Collections::default()).await?;
        info!(store = %self.store.describe(), "All collections cleared");
        self.notifier.notify(
            "All data has been cleared. A backup was created automatically.",
            Severity::Success,
        );
        Ok(())
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}
