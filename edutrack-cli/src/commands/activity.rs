//! Activity command: print the activity log.

use anyhow::Result;
use edutrack::activity::recent_activity;
use edutrack::Config;
use edutrack_storage::CollectionStore;
use std::sync::Arc;

/// Run the activity command.
pub async fn run_activity(
    store: Arc<dyn CollectionStore>,
    config: &Config,
    limit: Option<usize>,
) -> Result<()> {
    let limit = limit.unwrap_or(config.backup.activity_log_limit);
    let entries = recent_activity(store.as_ref(), limit).await?;

    if entries.is_empty() {
        println!("No recent activity");
        return Ok(());
    }

    println!("{:<26} {:<20} DETAILS", "TIME", "ACTION");
    for entry in entries {
        println!("{:<26} {:<20} {}", entry.timestamp, entry.action, entry.details);
    }

    Ok(())
}
