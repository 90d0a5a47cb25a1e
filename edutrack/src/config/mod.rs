//! Configuration management for EduTrack
//!
//! Default config location: ~/.edutrack/config.toml

mod backup;

pub use backup::BackupConfig;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Main configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub backup: BackupConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding students.json, attendance.json and activityLog.json
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".edutrack")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level filter string
    /// Override with RUST_LOG env var
    #[serde(default = "default_level")]
    pub level: String,
    /// Append logs to this file instead of stderr
    pub file: Option<PathBuf>,
    /// Log output format: "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
            format: default_log_format(),
        }
    }
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"))
}

/// Resolve a leading `~` against the home directory.
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) if rest.as_os_str().is_empty() => home_dir(),
        Ok(rest) => Ok(home_dir()?.join(rest)),
        Err(_) => Ok(path.to_path_buf()),
    }
}

/// Parse `path`, or `None` when there is no file there.
fn read_config_file(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(Some(config))
}

impl Config {
    /// `~/.edutrack/config.toml`, falling back to defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&default_data_dir())
    }

    /// `<data_dir>/config.toml`, falling back to defaults.
    ///
    /// The store always lives in `data_dir`, whatever the file says.
    pub fn load_from(data_dir: &Path) -> Result<Self> {
        let mut config = read_config_file(&data_dir.join("config.toml"))?.unwrap_or_default();
        config.storage.data_dir = data_dir.to_path_buf();
        config.finish()
    }

    /// Read `config_path`; if it does not exist, write the defaults there.
    ///
    /// Failing to write the default file is logged and otherwise ignored.
    pub fn load_or_create(config_path: &Path) -> Result<Self> {
        match read_config_file(config_path)? {
            Some(config) => config.finish(),
            None => {
                let config = Config::default();
                if let Err(e) = config.save(config_path) {
                    warn!(path = %config_path.display(), "Could not write default config: {:#}", e);
                }
                Ok(config)
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("Cannot write {}", path.display()))
    }

    fn finish(mut self) -> Result<Self> {
        self.expand_paths()?;
        self.validate()?;
        Ok(self)
    }

    /// Reject settings the backup subsystem cannot run with
    pub fn validate(&self) -> Result<()> {
        self.backup.validate()
    }

    /// Expand ~ in all paths
    fn expand_paths(&mut self) -> Result<()> {
        self.storage.data_dir = expand_tilde(&self.storage.data_dir)?;
        self.backup.output_dir = expand_tilde(&self.backup.output_dir)?;
        if let Some(ref f) = self.logging.file {
            self.logging.file = Some(expand_tilde(f)?);
        }
        Ok(())
    }

    /// Ensure all required directories exist
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.storage.data_dir)?;
        fs::create_dir_all(&self.backup.output_dir)?;
        Ok(())
    }
}
