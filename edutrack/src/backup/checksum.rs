//! Checksum engine.
//!
//! The digest is SHA-256 over the compact JSON serialization of exactly
//! `{"students": [...], "attendance": [...], "activityLog": [...]}`, rendered as
//! lowercase hex. Snapshot metadata (`version`, `lastBackup`, `checksum`) is
//! never part of the digested payload.
//!
//! The digest is order-sensitive: record order and key order inside records
//! both change it. It detects corruption and tampering; it is not a content
//! equality test between unrelated snapshots.

use edutrack_storage::Collections;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Length of a rendered digest in hex characters.
pub const DIGEST_HEX_LEN: usize = 64;

/// Compute the checksum of `collections`.
pub fn digest(collections: &Collections) -> Result<String> {
    let canonical = serde_json::to_vec(collections)
        .map_err(|e| Error::ChecksumComputation(format!("Canonical serialization failed: {}", e)))?;
    Ok(hex::encode(Sha256::digest(&canonical)))
}

/// Compute the checksum on the blocking pool.
///
/// The collections are moved into the worker and handed back with the digest,
/// so large inbound snapshots are never copied.
pub async fn digest_owned(collections: Collections) -> (Collections, Result<String>) {
    let handle = tokio::task::spawn_blocking(move || {
        let result = digest(&collections);
        (collections, result)
    });

    match handle.await {
        Ok(pair) => pair,
        // The worker owned the collections; they are lost with it.
        Err(e) => (
            Collections::default(),
            Err(Error::ChecksumComputation(format!("Digest task failed: {}", e))),
        ),
    }
}

/// Compare a declared checksum against a freshly computed one.
pub fn verify(expected: &str, actual: &str) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::ChecksumMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}
