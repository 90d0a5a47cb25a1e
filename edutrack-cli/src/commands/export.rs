//! Export command implementation.

use anyhow::{Context, Result};
use edutrack::backup::BackupManager;
use edutrack::Config;
use edutrack_storage::CollectionStore;
use std::path::PathBuf;
use std::sync::Arc;

use super::resolve_output_dir;
use crate::notifier::ConsoleNotifier;

/// Run the export command.
pub async fn run_export(
    store: Arc<dyn CollectionStore>,
    config: &Config,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let output_dir = resolve_output_dir(config, output_dir)?;
    let manager = BackupManager::new(
        store,
        &config.backup,
        Arc::new(ConsoleNotifier::new(false)),
    );

    let exported = manager
        .export_to_dir(&output_dir)
        .await
        .context("Export failed")?;

    manager
        .record_activity("Backup created", "Downloaded system backup")
        .await?;

    let snapshot = &exported.report.snapshot;
    let (students, attendance, activities) = snapshot.collections.counts();

    println!();
    println!("Backup written: {}", exported.path.display());
    println!("Version: {}", snapshot.version);
    println!(
        "Records: {} students, {} attendance, {} activities",
        students, attendance, activities
    );
    match &snapshot.checksum {
        Some(sum) => println!("Checksum: {}", sum),
        None => println!("Checksum: none (integrity check unavailable)"),
    }

    Ok(())
}
