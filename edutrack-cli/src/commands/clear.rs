//! Clear command: safety backup, then delete all records.

use anyhow::{Context, Result};
use edutrack::backup::{BackupManager, Notifier};
use edutrack::Config;
use edutrack_storage::CollectionStore;
use std::path::PathBuf;
use std::sync::Arc;

use super::resolve_output_dir;
use crate::notifier::ConsoleNotifier;

const CLEAR_TITLE: &str = "Clear All Data";
const CLEAR_WARNING: &str = "This will delete all students, attendance records and activity \
                             history.\nA backup will be written first.";

/// Run the clear command.
pub async fn run_clear(
    store: Arc<dyn CollectionStore>,
    config: &Config,
    output_dir: Option<PathBuf>,
    assume_yes: bool,
) -> Result<()> {
    let output_dir = resolve_output_dir(config, output_dir)?;
    let notifier = Arc::new(ConsoleNotifier::new(assume_yes));

    if !notifier.confirm(CLEAR_TITLE, CLEAR_WARNING).await.is_confirmed() {
        println!("Nothing was cleared.");
        return Ok(());
    }

    let manager = BackupManager::new(store, &config.backup, notifier);
    let safety = manager
        .clear_all_to_dir(&output_dir)
        .await
        .context("Clear failed")?;

    manager
        .record_activity("System reset", "All data cleared")
        .await?;

    println!();
    println!("Safety backup written: {}", safety.path.display());
    println!("All data cleared.");

    Ok(())
}
