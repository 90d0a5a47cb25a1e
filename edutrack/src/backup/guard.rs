//! Exclusive guard for full-state operations.
//!
//! Export, restore, rollback and clear-all each read or replace the whole
//! store. Only one may run at a time; a second request fails immediately with
//! [`Error::Busy`] instead of queueing.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::{Error, Result};

/// Shared, cloneable guard. Clones refer to the same permit.
#[derive(Debug, Clone)]
pub struct OperationGuard {
    permit: Arc<Semaphore>,
}

/// Held for the duration of one operation; released on drop.
#[derive(Debug)]
pub struct OperationPermit {
    issuer: Arc<Semaphore>,
    _permit: OwnedSemaphorePermit,
}

impl OperationGuard {
    pub fn new() -> Self {
        Self {
            permit: Arc::new(Semaphore::new(1)),
        }
    }

    /// Acquire the guard without waiting.
    pub fn try_acquire(&self) -> Result<OperationPermit> {
        self.permit
            .clone()
            .try_acquire_owned()
            .map(|permit| OperationPermit {
                issuer: self.permit.clone(),
                _permit: permit,
            })
            .map_err(|_| Error::Busy)
    }

    pub fn is_held(&self) -> bool {
        self.permit.available_permits() == 0
    }

    /// Whether `permit` was acquired from this guard (or a clone of it).
    pub fn issued(&self, permit: &OperationPermit) -> bool {
        Arc::ptr_eq(&self.permit, &permit.issuer)
    }
}

impl Default for OperationGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails_fast() {
        let guard = OperationGuard::new();
        let permit = guard.try_acquire().unwrap();
        assert!(guard.is_held());

        let shared = guard.clone();
        assert!(matches!(shared.try_acquire(), Err(Error::Busy)));

        drop(permit);
        assert!(!guard.is_held());
        assert!(shared.try_acquire().is_ok());
    }

    #[test]
    fn test_issued_tracks_origin() {
        let guard = OperationGuard::new();
        let other = OperationGuard::new();
        let permit = guard.try_acquire().unwrap();

        assert!(guard.issued(&permit));
        assert!(guard.clone().issued(&permit));
        assert!(!other.issued(&permit));
    }
}
