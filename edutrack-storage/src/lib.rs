//! Store adapter for EduTrack's persisted record collections.
//!
//! The application persists three collections (student profiles, attendance
//! marks, activity history). Everything that reads or replaces them goes
//! through the [`CollectionStore`] trait, which gives the backup subsystem a
//! single seam to guard.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Callers                                     │
//! │  ┌───────────┐ ┌───────────┐ ┌───────────┐  │
//! │  │  Export   │ │  Restore  │ │ Activity  │  │
//! │  └─────┬─────┘ └─────┬─────┘ └─────┬─────┘  │
//! │        └─────────────┼─────────────┘        │
//! │                      ▼                      │
//! │            ┌──────────────────┐             │
//! │            │ CollectionStore  │             │
//! │            └────────┬─────────┘             │
//! │             ┌───────┴────────┐              │
//! │             ▼                ▼              │
//! │       ┌──────────┐     ┌──────────┐        │
//! │       │  Local   │     │  Memory  │        │
//! │       └──────────┘     └──────────┘        │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use edutrack_storage::{CollectionStore, Collections, LocalStore};
//! use serde_json::json;
//!
//! # async fn example() -> edutrack_storage::Result<()> {
//! let store = LocalStore::new("./data");
//!
//! let mut collections = store.read_collections().await?;
//! collections.students.push(json!({"id": "S001", "name": "Ada Lovelace"}));
//! store.write_collections(collections).await?;
//! # Ok(())
//! # }
//! ```

mod collections;
mod error;
mod key;
mod local;
mod memory;
mod traits;

pub use collections::{ActivityEntry, AttendanceRecord, Collections, StudentRecord};
pub use error::{Result, StorageError};
pub use key::StoreKey;
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use traits::CollectionStore;
