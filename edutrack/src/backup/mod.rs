//! Backup and restore of all application state.
//!
//! Export flow: store -> [`SnapshotBuilder`] (collections, checksum, timestamp,
//! version) -> pretty JSON bytes or a backup file.
//!
//! Import flow: bytes -> parse -> [`validate`] -> [`VersionNegotiator`] ->
//! checksum verification -> confirmation through the [`Notifier`] ->
//! [`RestoreCoordinator`] apply (with a rollback snapshot) or abort.

pub mod builder;
pub mod checksum;
pub mod coordinator;
pub mod guard;
pub mod manager;
pub mod notify;
pub mod types;
pub mod validate;
pub mod version;

pub use builder::{ChecksumFn, SnapshotBuilder};
pub use coordinator::{
    ChecksumStatus, Inspection, PendingRestore, Rejection, RestoreCoordinator, RestoreOutcome,
    RestoreStage, RestoreState, RollbackOutcome,
};
pub use guard::{OperationGuard, OperationPermit};
pub use manager::{BackupManager, ExportedFile};
pub use notify::{ConfirmDecision, LogNotifier, Notifier, Severity};
pub use types::{
    backup_filename, backup_timestamp, BackupReport, RestoreSummary, RollbackSnapshot, Snapshot,
    CONFIRM_RESTORE_TITLE,
};
pub use validate::validate;
pub use version::{is_compatible, DataVersion, VersionNegotiator};
