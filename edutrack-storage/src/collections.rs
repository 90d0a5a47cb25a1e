//! The three persisted record collections.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::key::StoreKey;

/// A student profile. Opaque to the store beyond being JSON.
pub type StudentRecord = Value;
/// A single attendance mark.
pub type AttendanceRecord = Value;
/// An activity history entry.
pub type ActivityEntry = Value;

/// Full contents of the store.
///
/// Field order is fixed (`students`, `attendance`, `activityLog`) and is part of
/// the serialized form; checksums are computed over it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collections {
    pub students: Vec<StudentRecord>,
    pub attendance: Vec<AttendanceRecord>,
    #[serde(rename = "activityLog")]
    pub activity_log: Vec<ActivityEntry>,
}

impl Collections {
    pub fn new(
        students: Vec<StudentRecord>,
        attendance: Vec<AttendanceRecord>,
        activity_log: Vec<ActivityEntry>,
    ) -> Self {
        Self {
            students,
            attendance,
            activity_log,
        }
    }

    /// Records held under `key`.
    pub fn get(&self, key: StoreKey) -> &[Value] {
        match key {
            StoreKey::Students => &self.students,
            StoreKey::Attendance => &self.attendance,
            StoreKey::ActivityLog => &self.activity_log,
        }
    }

    /// Record counts as `(students, attendance, activities)`.
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.students.len(),
            self.attendance.len(),
            self.activity_log.len(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty() && self.attendance.is_empty() && self.activity_log.is_empty()
    }
}
