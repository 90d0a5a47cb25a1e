//! Core store trait definition.
//!
//! `CollectionStore` is the single seam through which the application reads and
//! replaces its three persisted collections.

use async_trait::async_trait;

use crate::collections::Collections;
use crate::error::Result;

/// Read/write access to the three persisted collections.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so a store can be shared behind an
/// `Arc` by the backup subsystem and the rest of the application.
///
/// # Atomicity
///
/// `write_collections` commits all three collections as one unit. A concurrent
/// `read_collections` observes either the complete previous state or the
/// complete new state, never a mix of the two.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Read all three collections.
    ///
    /// Collections that have never been written read as empty.
    async fn read_collections(&self) -> Result<Collections>;

    /// Replace all three collections in a single commit.
    async fn write_collections(&self, collections: Collections) -> Result<()>;

    /// Human-readable description of the backing store, for logs.
    fn describe(&self) -> String {
        "collection store".to_string()
    }
}
