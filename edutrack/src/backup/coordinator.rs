//! Restore coordination.
//!
//! One restore attempt moves through
//! `Idle -> Parsed -> Validated -> VersionChecked -> ChecksumVerified ->
//! AwaitingConfirmation -> Applied`. Any failure before `Applied` ends in
//! `Rejected` without touching the store. `RolledBack` is reached only by an
//! explicit [`RestoreCoordinator::rollback`].
//!
//! The operation guard is held from the moment input is accepted until the
//! attempt is applied or rejected, including while waiting for confirmation.

use chrono::{DateTime, Utc};
use edutrack_storage::CollectionStore;
use parking_lot::Mutex;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::checksum;
use super::guard::{OperationGuard, OperationPermit};
use super::notify::{ConfirmDecision, Notifier, Severity};
use super::types::{RestoreSummary, RollbackSnapshot, Snapshot, CONFIRM_RESTORE_TITLE};
use super::validate::validate;
use super::version::VersionNegotiator;
use crate::error::{Error, Result};

/// Step of the restore flow at which an attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreStage {
    Read,
    Parse,
    Validate,
    VersionCheck,
    ChecksumVerify,
    Confirm,
    Apply,
    Rollback,
}

impl fmt::Display for RestoreStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RestoreStage::Read => "read",
            RestoreStage::Parse => "parse",
            RestoreStage::Validate => "validation",
            RestoreStage::VersionCheck => "version check",
            RestoreStage::ChecksumVerify => "checksum verification",
            RestoreStage::Confirm => "confirmation",
            RestoreStage::Apply => "apply",
            RestoreStage::Rollback => "rollback",
        };
        f.write_str(name)
    }
}

/// Why an attempt ended in `Rejected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Failed { stage: RestoreStage, message: String },
    /// The user declined the confirmation prompt.
    Cancelled,
}

/// Coordinator state, inspectable between steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreState {
    Idle,
    Parsed,
    Validated,
    VersionChecked,
    ChecksumVerified,
    AwaitingConfirmation,
    Applied,
    RolledBack,
    Rejected(Rejection),
}

/// Outcome of checksum verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumStatus {
    Verified,
    /// The snapshot carries no checksum and is trusted as-is.
    Absent,
}

/// Result of checking a snapshot without applying it.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub summary: RestoreSummary,
    pub checksum: ChecksumStatus,
}

/// A verified snapshot waiting for the user's decision.
///
/// Holds the operation guard. Dropping it without calling
/// [`RestoreCoordinator::resolve`] abandons the attempt and releases the guard.
#[derive(Debug)]
pub struct PendingRestore {
    snapshot: Snapshot,
    summary: RestoreSummary,
    checksum: ChecksumStatus,
    permit: OperationPermit,
}

impl PendingRestore {
    pub fn summary(&self) -> &RestoreSummary {
        &self.summary
    }

    pub fn checksum_status(&self) -> ChecksumStatus {
        self.checksum
    }
}

/// How a confirmed or declined attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Applied(RestoreSummary),
    Cancelled,
}

/// Result of a rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackOutcome {
    pub captured_at: DateTime<Utc>,
    pub students: usize,
    pub attendance: usize,
    pub activities: usize,
}

type StageResult<T> = std::result::Result<T, (RestoreStage, Error)>;

/// Orchestrates validate, version check, checksum verification, confirmation
/// and apply for inbound snapshots.
pub struct RestoreCoordinator {
    store: Arc<dyn CollectionStore>,
    negotiator: VersionNegotiator,
    notifier: Arc<dyn Notifier>,
    guard: OperationGuard,
    state: Mutex<RestoreState>,
    rollback: Mutex<Option<RollbackSnapshot>>,
}

impl RestoreCoordinator {
    pub fn new(
        store: Arc<dyn CollectionStore>,
        negotiator: VersionNegotiator,
        notifier: Arc<dyn Notifier>,
        guard: OperationGuard,
    ) -> Self {
        Self {
            store,
            negotiator,
            notifier,
            guard,
            state: Mutex::new(RestoreState::Idle),
            rollback: Mutex::new(None),
        }
    }

    pub fn state(&self) -> RestoreState {
        self.state.lock().clone()
    }

    /// The collections captured before the last applied restore, if any.
    pub fn rollback_snapshot(&self) -> Option<RollbackSnapshot> {
        self.rollback.lock().clone()
    }

    /// Discard the rollback snapshot. Returns whether one was held.
    pub fn clear_rollback(&self) -> bool {
        let had = self.rollback.lock().take().is_some();
        if had {
            debug!("Rollback snapshot cleared");
        }
        had
    }

    /// Run the full flow, asking the notifier for confirmation.
    pub async fn restore(&self, bytes: &[u8]) -> Result<RestoreOutcome> {
        let pending = self.begin(bytes).await?;
        self.confirm_and_resolve(pending).await
    }

    /// Read a backup file and run the full flow.
    ///
    /// A read failure is reported as a parse error.
    pub async fn restore_file(&self, path: &Path) -> Result<RestoreOutcome> {
        let permit = self.acquire()?;
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let err = Error::Parse(format!("Cannot read {}: {}", path.display(), e));
                return Err(self.reject(RestoreStage::Read, err));
            }
        };
        let pending = self.begin_with_permit(permit, &bytes).await?;
        self.confirm_and_resolve(pending).await
    }

    /// Parse, validate, version-check and verify `bytes`.
    ///
    /// On success the coordinator is `AwaitingConfirmation` and the returned
    /// [`PendingRestore`] holds the operation guard.
    pub async fn begin(&self, bytes: &[u8]) -> Result<PendingRestore> {
        let permit = self.acquire()?;
        self.begin_with_permit(permit, bytes).await
    }

    /// Apply or abandon a pending restore.
    ///
    /// `pending` must come from [`begin`](Self::begin) on this coordinator;
    /// one from another coordinator is refused with [`Error::ForeignRestore`]
    /// and released without touching either store.
    pub async fn resolve(
        &self,
        pending: PendingRestore,
        decision: ConfirmDecision,
    ) -> Result<RestoreOutcome> {
        if !self.guard.issued(&pending.permit) {
            warn!("Refusing pending restore from another coordinator");
            return Err(Error::ForeignRestore);
        }

        let PendingRestore {
            snapshot,
            summary,
            permit,
            ..
        } = pending;

        if !decision.is_confirmed() {
            info!("Restore cancelled by user");
            self.transition(RestoreState::Rejected(Rejection::Cancelled));
            self.notifier.notify("Restore cancelled", Severity::Info);
            drop(permit);
            return Ok(RestoreOutcome::Cancelled);
        }

        let current = match self.store.read_collections().await {
            Ok(current) => current,
            Err(e) => return Err(self.reject(RestoreStage::Apply, Error::Storage(e))),
        };
        *self.rollback.lock() = Some(RollbackSnapshot::capture(current));

        if let Err(e) = self.store.write_collections(snapshot.collections).await {
            error!(store = %self.store.describe(), "Restore write failed: {}", e);
            return Err(self.reject(RestoreStage::Apply, Error::StorageWrite(e)));
        }

        self.transition(RestoreState::Applied);
        info!(
            students = summary.students,
            attendance = summary.attendance,
            activities = summary.activities,
            version = %summary.version,
            "Restore applied"
        );
        self.notifier
            .notify("Data restored successfully!", Severity::Success);
        Ok(RestoreOutcome::Applied(summary))
    }

    /// Put back the collections captured before the last applied restore.
    pub async fn rollback(&self) -> Result<RollbackOutcome> {
        let _permit = self.acquire()?;

        let Some(rollback) = self.rollback_snapshot() else {
            self.notifier
                .notify("There is no restore to roll back", Severity::Warning);
            return Err(Error::NoRollback);
        };

        let (students, attendance, activities) = rollback.collections.counts();
        if let Err(e) = self.store.write_collections(rollback.collections).await {
            error!(store = %self.store.describe(), "Rollback write failed: {}", e);
            self.notifier.notify(
                &format!("Restore failed at {}: {}", RestoreStage::Rollback, e),
                Severity::Error,
            );
            return Err(Error::StorageWrite(e));
        }

        self.rollback.lock().take();
        self.transition(RestoreState::RolledBack);
        info!(students, attendance, activities, "Restore rolled back");
        self.notifier
            .notify("Previous data has been restored", Severity::Success);

        Ok(RollbackOutcome {
            captured_at: rollback.captured_at,
            students,
            attendance,
            activities,
        })
    }

    /// Check a snapshot without applying it.
    ///
    /// Does not take the operation guard, change coordinator state, notify, or
    /// touch the store.
    pub async fn inspect(&self, bytes: &[u8]) -> Result<Inspection> {
        let (snapshot, checksum) = self.run_checks(bytes, false).await.map_err(|(_, e)| e)?;
        Ok(Inspection {
            summary: snapshot.summary(),
            checksum,
        })
    }

    async fn confirm_and_resolve(&self, pending: PendingRestore) -> Result<RestoreOutcome> {
        let message = pending.summary().confirmation_message();
        let decision = self.notifier.confirm(CONFIRM_RESTORE_TITLE, &message).await;
        self.resolve(pending, decision).await
    }

    fn acquire(&self) -> Result<OperationPermit> {
        self.guard.try_acquire().inspect_err(|e| {
            warn!("Rejected overlapping operation");
            self.notifier.notify(&e.to_string(), Severity::Error);
        })
    }

    async fn begin_with_permit(
        &self,
        permit: OperationPermit,
        bytes: &[u8],
    ) -> Result<PendingRestore> {
        match self.run_checks(bytes, true).await {
            Ok((snapshot, checksum)) => {
                let summary = snapshot.summary();
                self.transition(RestoreState::AwaitingConfirmation);
                Ok(PendingRestore {
                    snapshot,
                    summary,
                    checksum,
                    permit,
                })
            }
            Err((stage, err)) => Err(self.reject(stage, err)),
        }
    }

    async fn run_checks(
        &self,
        bytes: &[u8],
        track: bool,
    ) -> StageResult<(Snapshot, ChecksumStatus)> {
        let advance = |state: RestoreState| {
            if track {
                self.transition(state);
            }
        };

        let raw: Value = serde_json::from_slice(bytes)
            .map_err(|e| (RestoreStage::Parse, Error::Parse(format!("Invalid JSON: {}", e))))?;
        advance(RestoreState::Parsed);

        let snapshot = validate(raw).map_err(|e| (RestoreStage::Validate, e))?;
        advance(RestoreState::Validated);

        self.negotiator
            .check(&snapshot.version)
            .map_err(|e| (RestoreStage::VersionCheck, e))?;
        advance(RestoreState::VersionChecked);

        let Snapshot {
            collections,
            last_backup,
            version,
            checksum,
        } = snapshot;

        let (collections, status) = match checksum.as_deref() {
            None => {
                debug!("Snapshot has no checksum, skipping verification");
                (collections, ChecksumStatus::Absent)
            }
            Some(expected) => {
                let (collections, computed) = checksum::digest_owned(collections).await;
                let actual = computed.map_err(|e| (RestoreStage::ChecksumVerify, e))?;
                checksum::verify(expected, &actual)
                    .map_err(|e| (RestoreStage::ChecksumVerify, e))?;
                (collections, ChecksumStatus::Verified)
            }
        };
        advance(RestoreState::ChecksumVerified);

        Ok((
            Snapshot {
                collections,
                last_backup,
                version,
                checksum,
            },
            status,
        ))
    }

    fn reject(&self, stage: RestoreStage, err: Error) -> Error {
        warn!(%stage, "Restore rejected: {}", err);
        self.transition(RestoreState::Rejected(Rejection::Failed {
            stage,
            message: err.to_string(),
        }));
        self.notifier.notify(
            &format!("Restore failed at {}: {}", stage, err),
            Severity::Error,
        );
        err
    }

    fn transition(&self, next: RestoreState) {
        let mut state = self.state.lock();
        debug!(from = ?*state, to = ?next, "Restore state transition");
        *state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::notify::LogNotifier;
    use edutrack_storage::{Collections, MemoryStore};
    use serde_json::json;

    fn coordinator(store: Arc<MemoryStore>, decision: ConfirmDecision) -> RestoreCoordinator {
        RestoreCoordinator::new(
            store,
            VersionNegotiator::new("2.0.0"),
            Arc::new(LogNotifier::new(decision)),
            OperationGuard::new(),
        )
    }

    fn artifact(version: &str) -> Vec<u8> {
        let collections = Collections::new(vec![json!({"id": "S9"})], vec![], vec![]);
        let sum = checksum::digest(&collections).unwrap();
        serde_json::to_vec(&json!({
            "students": collections.students,
            "attendance": [],
            "activityLog": [],
            "version": version,
            "checksum": sum
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_state_walks_to_awaiting_confirmation() {
        let store = Arc::new(MemoryStore::new());
        let coordinator = coordinator(store.clone(), ConfirmDecision::Confirm);
        assert_eq!(coordinator.state(), RestoreState::Idle);

        let pending = coordinator.begin(&artifact("2.1.0")).await.unwrap();
        assert_eq!(coordinator.state(), RestoreState::AwaitingConfirmation);
        assert_eq!(pending.checksum_status(), ChecksumStatus::Verified);
        assert_eq!(pending.summary().students, 1);
        assert!(store.snapshot().is_empty());

        let outcome = coordinator
            .resolve(pending, ConfirmDecision::Confirm)
            .await
            .unwrap();
        assert!(matches!(outcome, RestoreOutcome::Applied(_)));
        assert_eq!(coordinator.state(), RestoreState::Applied);
        assert_eq!(store.snapshot().students, vec![json!({"id": "S9"})]);
    }

    #[tokio::test]
    async fn test_rejection_records_stage() {
        let store = Arc::new(MemoryStore::new());
        let coordinator = coordinator(store, ConfirmDecision::Confirm);

        let err = coordinator.begin(&artifact("1.0.0")).await.unwrap_err();
        assert!(matches!(err, Error::VersionIncompatible { .. }));
        match coordinator.state() {
            RestoreState::Rejected(Rejection::Failed { stage, .. }) => {
                assert_eq!(stage, RestoreStage::VersionCheck)
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_decline_is_cancelled() {
        let store = Arc::new(MemoryStore::new());
        let coordinator = coordinator(store.clone(), ConfirmDecision::Decline);

        let outcome = coordinator.restore(&artifact("2.1.0")).await.unwrap();
        assert_eq!(outcome, RestoreOutcome::Cancelled);
        assert_eq!(
            coordinator.state(),
            RestoreState::Rejected(Rejection::Cancelled)
        );
        assert!(store.snapshot().is_empty());
        assert!(coordinator.rollback_snapshot().is_none());
    }

    #[tokio::test]
    async fn test_inspect_leaves_state_alone() {
        let store = Arc::new(MemoryStore::new());
        let coordinator = coordinator(store, ConfirmDecision::Confirm);

        let inspection = coordinator.inspect(&artifact("2.1.0")).await.unwrap();
        assert_eq!(inspection.checksum, ChecksumStatus::Verified);
        assert!(coordinator.inspect(b"not json").await.is_err());
        assert_eq!(coordinator.state(), RestoreState::Idle);
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(RestoreStage::ChecksumVerify.to_string(), "checksum verification");
        assert_eq!(RestoreStage::VersionCheck.to_string(), "version check");
    }

    #[tokio::test]
    async fn test_resolve_refuses_pending_from_other_coordinator() {
        let first_store = Arc::new(MemoryStore::new());
        let second_store = Arc::new(MemoryStore::new());
        let first = coordinator(first_store.clone(), ConfirmDecision::Confirm);
        let second = coordinator(second_store.clone(), ConfirmDecision::Confirm);

        let pending = first.begin(&artifact("2.1.0")).await.unwrap();
        let err = second
            .resolve(pending, ConfirmDecision::Confirm)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ForeignRestore));
        assert!(first_store.snapshot().is_empty());
        assert!(second_store.snapshot().is_empty());
        assert!(second.rollback_snapshot().is_none());
        // The refused attempt released the first coordinator's guard.
        assert!(first.begin(&artifact("2.1.0")).await.is_ok());
    }
}
