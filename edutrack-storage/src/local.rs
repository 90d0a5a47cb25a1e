//! Local filesystem store.
//!
//! This is the default store for single-user EduTrack installations. Each
//! collection lives in its own JSON file under the base directory:
//! `base_path/students.json`, `base_path/attendance.json`,
//! `base_path/activityLog.json`.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::collections::Collections;
use crate::error::{Result, StorageError};
use crate::key::StoreKey;
use crate::traits::CollectionStore;

/// Local filesystem store.
///
/// Writes are staged to `<key>.json.tmp` files and renamed into place while the
/// commit lock is held exclusively. A commit that fails part way restores the
/// files it already replaced. Reads take the same lock shared, so no
/// reader in this process observes a half-committed state.
#[derive(Debug)]
pub struct LocalStore {
    base_path: PathBuf,
    commit_lock: RwLock<()>,
}

impl LocalStore {
    /// Create a new local store.
    ///
    /// The base path is created on first write.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            commit_lock: RwLock::new(()),
        }
    }

    /// Get the base path for this store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn key_path(&self, key: StoreKey) -> PathBuf {
        self.base_path.join(key.file_name())
    }

    fn staging_path(&self, key: StoreKey) -> PathBuf {
        self.base_path.join(format!("{}.tmp", key.file_name()))
    }

    fn backup_path(&self, key: StoreKey) -> PathBuf {
        self.base_path.join(format!("{}.bak", key.file_name()))
    }

    async fn read_key(&self, key: StoreKey) -> Result<Vec<Value>> {
        let path = self.key_path(key);
        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let value: Value = serde_json::from_slice(&data).map_err(|e| StorageError::Corrupt {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        match value {
            Value::Array(records) => Ok(records),
            Value::Null => Ok(Vec::new()),
            other => Err(StorageError::Corrupt {
                key: key.to_string(),
                message: format!("expected a JSON array, found {}", json_kind(&other)),
            }),
        }
    }

    async fn stage(&self, collections: &Collections) -> Result<()> {
        fs::create_dir_all(&self.base_path).await?;
        for key in StoreKey::ALL {
            let bytes = serde_json::to_vec(collections.get(key))
                .map_err(|e| StorageError::Backend(format!("Cannot serialize {}: {}", key, e)))?;
            fs::write(self.staging_path(key), bytes).await?;
        }
        Ok(())
    }

    async fn discard_staged(&self) {
        for key in StoreKey::ALL {
            remove_if_present(&self.staging_path(key)).await;
        }
    }

    /// Move every staged file into place.
    ///
    /// Each live file is copied to `<key>.json.bak` before it is replaced. If any
    /// step fails, the keys already replaced are put back from their backups, so
    /// the previous state survives.
    async fn commit(&self) -> Result<()> {
        // (key, had a live file before this commit)
        let mut replaced: Vec<(StoreKey, bool)> = Vec::with_capacity(StoreKey::ALL.len());

        for key in StoreKey::ALL {
            if let Err(e) = self.replace_key(key, &mut replaced).await {
                self.revert(&replaced).await;
                self.discard_staged().await;
                return Err(StorageError::Backend(format!(
                    "Commit of {} failed, previous state kept: {}",
                    key, e
                )));
            }
        }

        for key in StoreKey::ALL {
            remove_if_present(&self.backup_path(key)).await;
        }
        Ok(())
    }

    async fn replace_key(
        &self,
        key: StoreKey,
        replaced: &mut Vec<(StoreKey, bool)>,
    ) -> std::io::Result<()> {
        let live = self.key_path(key);
        let had_live = match fs::copy(&live, self.backup_path(key)).await {
            Ok(_) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => return Err(e),
        };
        replaced.push((key, had_live));

        debug!("Committing {}", key);
        fs::rename(self.staging_path(key), &live).await
    }

    async fn revert(&self, replaced: &[(StoreKey, bool)]) {
        for &(key, had_live) in replaced.iter().rev() {
            let live = self.key_path(key);
            let result = if had_live {
                fs::rename(self.backup_path(key), &live).await
            } else {
                match fs::remove_file(&live).await {
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                    other => other,
                }
            };
            if let Err(e) = result {
                warn!("Failed to revert {:?}: {}", live, e);
            }
        }
    }
}

async fn remove_if_present(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {:?}: {}", path, e),
    }
}

#[async_trait]
impl CollectionStore for LocalStore {
    #[instrument(skip(self), fields(base = %self.base_path.display()))]
    async fn read_collections(&self) -> Result<Collections> {
        let _shared = self.commit_lock.read().await;
        debug!("Reading collections from {:?}", self.base_path);

        Ok(Collections {
            students: self.read_key(StoreKey::Students).await?,
            attendance: self.read_key(StoreKey::Attendance).await?,
            activity_log: self.read_key(StoreKey::ActivityLog).await?,
        })
    }

    #[instrument(skip(self, collections), fields(base = %self.base_path.display()))]
    async fn write_collections(&self, collections: Collections) -> Result<()> {
        let _exclusive = self.commit_lock.write().await;

        if let Err(e) = self.stage(&collections).await {
            self.discard_staged().await;
            return Err(e);
        }

        self.commit().await
    }

    fn describe(&self) -> String {
        format!("local:{}", self.base_path.display())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
