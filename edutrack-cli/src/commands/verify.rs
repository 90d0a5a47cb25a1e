//! Verify command: check a backup file without restoring it.

use anyhow::{Context, Result};
use edutrack::backup::{BackupManager, ChecksumStatus, ConfirmDecision, LogNotifier};
use edutrack::Config;
use edutrack_storage::CollectionStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Run the verify command.
pub async fn run_verify(
    store: Arc<dyn CollectionStore>,
    config: &Config,
    input: PathBuf,
) -> Result<()> {
    let bytes = tokio::fs::read(&input)
        .await
        .with_context(|| format!("Cannot read '{}'", input.display()))?;

    let manager = BackupManager::new(
        store,
        &config.backup,
        Arc::new(LogNotifier::new(ConfirmDecision::Decline)),
    );
    let inspection = manager
        .coordinator()
        .inspect(&bytes)
        .await
        .with_context(|| format!("'{}' is not a valid backup", input.display()))?;

    println!("{}", inspection.summary);
    println!(
        "Checksum: {}",
        match inspection.checksum {
            ChecksumStatus::Verified => "verified",
            ChecksumStatus::Absent => "absent (backup predates checksums, not verified)",
        }
    );
    println!("'{}' can be restored.", input.display());

    Ok(())
}
