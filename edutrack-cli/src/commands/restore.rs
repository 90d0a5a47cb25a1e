//! Restore command implementation.

use anyhow::{Context, Result};
use edutrack::backup::{BackupManager, RestoreOutcome};
use edutrack::Config;
use edutrack_storage::CollectionStore;
use std::path::PathBuf;
use std::sync::Arc;

use crate::notifier::ConsoleNotifier;

/// Run the restore command.
pub async fn run_restore(
    store: Arc<dyn CollectionStore>,
    config: &Config,
    input: PathBuf,
    assume_yes: bool,
) -> Result<()> {
    println!("Restoring from '{}'", input.display());

    let manager = BackupManager::new(
        store,
        &config.backup,
        Arc::new(ConsoleNotifier::new(assume_yes)),
    );

    let outcome = manager
        .coordinator()
        .restore_file(&input)
        .await
        .with_context(|| format!("Restore from '{}' failed", input.display()))?;

    match outcome {
        RestoreOutcome::Applied(summary) => {
            let details = format!(
                "Loaded data from backup ({})",
                summary.backup_date.as_deref().unwrap_or("unknown date")
            );
            manager.record_activity("System restored", &details).await?;

            println!();
            println!("Restore complete!");
            println!("Students: {}", summary.students);
            println!("Attendance records: {}", summary.attendance);
            println!("Activities: {}", summary.activities);
        }
        RestoreOutcome::Cancelled => {
            println!("Restore cancelled, no data was changed.");
        }
    }

    Ok(())
}
