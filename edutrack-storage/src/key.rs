//! Persisted keys for the three record collections.

use std::fmt;

/// One of the persisted collection keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Students,
    Attendance,
    ActivityLog,
}

impl StoreKey {
    /// All keys, in canonical order.
    pub const ALL: [StoreKey; 3] = [StoreKey::Students, StoreKey::Attendance, StoreKey::ActivityLog];

    /// The key name as the surrounding application persists it.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Students => "students",
            StoreKey::Attendance => "attendance",
            StoreKey::ActivityLog => "activityLog",
        }
    }

    /// File name used by [`crate::LocalStore`].
    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
