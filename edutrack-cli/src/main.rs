mod commands;
mod notifier;

use anyhow::Result;
use clap::{Parser, Subcommand};
use edutrack::config::{expand_tilde, LoggingConfig};
use edutrack::Config;
use edutrack_storage::{CollectionStore, LocalStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "edutrack")]
#[command(about = "EduTrack CLI - backup, restore and data administration")]
#[command(version)]
struct Cli {
    /// Path to config file (default: ~/.edutrack/config.toml)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides config)
    #[arg(long, global = true, env = "EDUTRACK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a backup of all records to a JSON file
    Export {
        /// Directory for the backup file (default: backup.output_dir)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Replace all records with the contents of a backup file
    Restore {
        /// Backup file to restore from
        input: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Check a backup file without restoring it
    Verify {
        /// Backup file to check
        input: PathBuf,
    },

    /// Delete all records after writing a safety backup
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Directory for the safety backup (default: backup.output_dir)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Show recent activity, newest first
    Activity {
        /// Number of entries to show (default: backup.activity_log_limit)
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config
    let mut config = if let Some(config_path) = &cli.config {
        Config::load_or_create(config_path)?
    } else if let Some(data_dir) = &cli.data_dir {
        Config::load_from(&expand_tilde(data_dir)?)?
    } else {
        Config::load()?
    };

    // Apply CLI overrides
    if let Some(data_dir) = &cli.data_dir {
        config.storage.data_dir = expand_tilde(data_dir)?;
    }

    init_logging(&config.logging)?;
    config.ensure_dirs()?;

    tracing::debug!("Data dir: {:?}", config.storage.data_dir);
    let store: Arc<dyn CollectionStore> = Arc::new(LocalStore::new(config.storage.data_dir.clone()));

    match cli.command {
        Commands::Export { output_dir } => {
            commands::run_export(store, &config, output_dir).await?;
        }
        Commands::Restore { input, yes } => {
            commands::run_restore(store, &config, input, yes).await?;
        }
        Commands::Verify { input } => {
            commands::run_verify(store, &config, input).await?;
        }
        Commands::Clear { yes, output_dir } => {
            commands::run_clear(store, &config, output_dir, yes).await?;
        }
        Commands::Activity { limit } => {
            commands::run_activity(store, &config, limit).await?;
        }
    }

    Ok(())
}

/// RUST_LOG wins over the configured level.
fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let log_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let json = logging.format.eq_ignore_ascii_case("json");

    match (&logging.file, json) {
        (Some(log_file), true) => {
            let file = open_log_file(log_file)?;
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(log_filter)
                .with_writer(file)
                .init();
        }
        (Some(log_file), false) => {
            let file = open_log_file(log_file)?;
            tracing_subscriber::fmt()
                .with_env_filter(log_filter)
                .with_ansi(false)
                .with_writer(file)
                .init();
        }
        (None, true) => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(log_filter)
                .with_writer(std::io::stderr)
                .init();
        }
        (None, false) => {
            tracing_subscriber::fmt()
                .with_env_filter(log_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}

fn open_log_file(path: &std::path::Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?)
}
