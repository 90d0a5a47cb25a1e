//! Snapshot types and metadata.

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, Utc};
use edutrack_storage::Collections;
use serde::Serialize;
use std::fmt;

/// Title shown when asking the user to confirm a restore.
pub const CONFIRM_RESTORE_TITLE: &str = "Confirm Restore";

/// A versioned, optionally checksummed copy of all application state.
///
/// Serializes as the exported backup file:
/// `students`, `attendance`, `activityLog`, `lastBackup`, `version`, `checksum`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    #[serde(flatten)]
    pub collections: Collections,
    /// Creation time (RFC 3339). Absent on hand-authored or legacy files.
    #[serde(rename = "lastBackup", skip_serializing_if = "Option::is_none")]
    pub last_backup: Option<String>,
    /// Data-format version of the producing application
    pub version: String,
    /// SHA-256 of the collections. Absent on snapshots that predate checksums.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl Snapshot {
    /// Serialize as a backup file (two-space indented JSON).
    pub fn to_json_pretty(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn summary(&self) -> RestoreSummary {
        RestoreSummary::from_snapshot(self)
    }
}

/// The store's collections captured immediately before a restore is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RollbackSnapshot {
    pub collections: Collections,
    pub captured_at: DateTime<Utc>,
}

impl RollbackSnapshot {
    pub fn capture(collections: Collections) -> Self {
        Self {
            collections,
            captured_at: Utc::now(),
        }
    }
}

/// Result of an export.
#[derive(Debug, Clone)]
pub struct BackupReport {
    pub snapshot: Snapshot,
    /// The checksum could not be computed and the snapshot carries none.
    pub degraded: bool,
}

/// Human-readable description of a snapshot, shown before a restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreSummary {
    pub students: usize,
    pub attendance: usize,
    pub activities: usize,
    pub version: String,
    pub backup_date: Option<String>,
}

impl RestoreSummary {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let (students, attendance, activities) = snapshot.collections.counts();
        Self {
            students,
            attendance,
            activities,
            version: snapshot.version.clone(),
            backup_date: snapshot.last_backup.clone(),
        }
    }

    /// Backup date in local time, or `"unknown date"`.
    pub fn display_date(&self) -> String {
        self.backup_date
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| {
                dt.with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            })
            .unwrap_or_else(|| "unknown date".to_string())
    }

    /// Message body for the restore confirmation prompt.
    pub fn confirmation_message(&self) -> String {
        format!("{}\nThis will overwrite all current data.", self)
    }
}

impl fmt::Display for RestoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Backup Date: {}", self.display_date())?;
        writeln!(f, "Version: {}", self.version)?;
        writeln!(f, "{} Students", self.students)?;
        writeln!(f, "{} Attendance Records", self.attendance)?;
        write!(f, "{} Activities", self.activities)
    }
}

/// `lastBackup` timestamp: UTC, millisecond precision, `Z` suffix.
pub fn backup_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Export file name: `<product>_Backup_<YYYY-MM-DD_HH-MM>.json` in local time.
pub fn backup_filename(product: &str, local_time: NaiveDateTime) -> String {
    format!(
        "{}_Backup_{}.json",
        product,
        local_time.format("%Y-%m-%d_%H-%M")
    )
}
