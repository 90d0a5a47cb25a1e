pub mod activity;
pub mod clear;
pub mod export;
pub mod restore;
pub mod verify;

pub use activity::run_activity;
pub use clear::run_clear;
pub use export::run_export;
pub use restore::run_restore;
pub use verify::run_verify;

use anyhow::Result;
use edutrack::config::expand_tilde;
use edutrack::Config;
use std::path::PathBuf;

/// `--output-dir` if given, otherwise the configured backup directory.
fn resolve_output_dir(config: &Config, output_dir: Option<PathBuf>) -> Result<PathBuf> {
    match output_dir {
        Some(dir) => expand_tilde(&dir),
        None => Ok(config.backup.output_dir.clone()),
    }
}
