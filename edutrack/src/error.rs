use edutrack_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error(
        "Backup version {candidate} is not compatible with minimum supported version {minimum}"
    )]
    VersionIncompatible { candidate: String, minimum: String },

    #[error("Backup file integrity check failed: expected checksum {expected}, computed {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Checksum computation failed: {0}")]
    ChecksumComputation(String),

    #[error("Storage write failed: {0}")]
    StorageWrite(#[source] StorageError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Another backup or restore operation is already in progress")]
    Busy,

    #[error("No restore to roll back")]
    NoRollback,

    #[error("Pending restore was started by a different coordinator")]
    ForeignRestore,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for the errors that end a restore attempt before the store is touched.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Error::Parse(_)
                | Error::Schema(_)
                | Error::VersionIncompatible { .. }
                | Error::ChecksumMismatch { .. }
                | Error::ChecksumComputation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_error_names_both_versions() {
        let err = Error::VersionIncompatible {
            candidate: "1.9.9".to_string(),
            minimum: "2.0.0".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("1.9.9"));
        assert!(msg.contains("2.0.0"));
        assert!(err.is_rejection());
    }

    #[test]
    fn test_storage_write_is_not_rejection() {
        let err = Error::StorageWrite(StorageError::Backend("disk full".to_string()));
        assert!(!err.is_rejection());
        assert_eq!(err.to_string(), "Storage write failed: Backend error: disk full");
    }
}
