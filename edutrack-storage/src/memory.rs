//! In-memory store.

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::collections::Collections;
use crate::error::Result;
use crate::traits::CollectionStore;

/// Store that keeps all collections in memory.
///
/// A write swaps the whole value under the write lock, so readers never see a
/// partially replaced state.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with `collections`.
    pub fn with_collections(collections: Collections) -> Self {
        Self {
            inner: RwLock::new(collections),
        }
    }

    /// Synchronous snapshot of the current contents.
    pub fn snapshot(&self) -> Collections {
        self.inner.read().clone()
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn read_collections(&self) -> Result<Collections> {
        Ok(self.inner.read().clone())
    }

    async fn write_collections(&self, collections: Collections) -> Result<()> {
        let (s, a, l) = collections.counts();
        debug!(students = s, attendance = a, activities = l, "Committing collections to memory");
        *self.inner.write() = collections;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_write_then_read() {
        let store = MemoryStore::new();
        assert!(store.read_collections().await.unwrap().is_empty());

        let collections = Collections::new(
            vec![json!({"id": "S1"})],
            vec![json!({"studentId": "S1", "present": true})],
            vec![],
        );
        store.write_collections(collections.clone()).await.unwrap();

        assert_eq!(store.read_collections().await.unwrap(), collections);
        assert_eq!(store.snapshot(), collections);
    }

    #[tokio::test]
    async fn test_write_replaces_everything() {
        let store = MemoryStore::with_collections(Collections::new(
            vec![json!(1), json!(2)],
            vec![json!(3)],
            vec![json!(4)],
        ));

        store.write_collections(Collections::default()).await.unwrap();
        assert!(store.snapshot().is_empty());
    }
}
