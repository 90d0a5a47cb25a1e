//! Backup and restore configuration.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::backup::version::DataVersion;

/// Versions, naming and limits for the backup subsystem.
///
/// Both versions are handed explicitly to the snapshot builder and the version
/// negotiator.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackupConfig {
    /// Prefix of exported file names
    #[serde(default = "default_product_name")]
    pub product_name: String,

    /// Data-format version stamped on every export
    #[serde(default = "default_current_version")]
    pub current_version: String,

    /// Oldest data-format version accepted on import
    #[serde(default = "default_min_supported_version")]
    pub min_supported_version: String,

    /// Directory exports are written to by default
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Maximum number of activity log entries kept
    #[serde(default = "default_activity_log_limit")]
    pub activity_log_limit: usize,
}

fn default_product_name() -> String {
    "EduTrack".to_string()
}

fn default_current_version() -> String {
    "2.1.0".to_string()
}

fn default_min_supported_version() -> String {
    "2.0.0".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_activity_log_limit() -> usize {
    50
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            product_name: default_product_name(),
            current_version: default_current_version(),
            min_supported_version: default_min_supported_version(),
            output_dir: default_output_dir(),
            activity_log_limit: default_activity_log_limit(),
        }
    }
}

impl BackupConfig {
    pub fn validate(&self) -> Result<()> {
        let current: DataVersion = self
            .current_version
            .parse()
            .map_err(|e| anyhow!("backup.current_version: {}", e))?;
        let minimum: DataVersion = self
            .min_supported_version
            .parse()
            .map_err(|e| anyhow!("backup.min_supported_version: {}", e))?;

        if current < minimum {
            return Err(anyhow!(
                "backup.current_version {} is below backup.min_supported_version {}; \
                 this application could not restore its own backups",
                self.current_version,
                self.min_supported_version
            ));
        }
        if self.activity_log_limit == 0 {
            return Err(anyhow!("backup.activity_log_limit must be at least 1"));
        }
        if self.product_name.trim().is_empty() {
            return Err(anyhow!("backup.product_name must not be empty"));
        }
        Ok(())
    }
}
