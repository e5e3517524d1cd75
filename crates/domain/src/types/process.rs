//! Attendance process flags
//!
//! A process flag records whether the attendance process for a sector was
//! started on a given day. Flags are never reset; a new day simply gets a
//! new record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::PROCESS_FLAG_KEY_PREFIX;
use crate::impl_domain_status_conversions;

/// Attendance process ledger a start is recorded against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
    Staff,
    PrimaryStudents,
    SecondaryStudents,
}

impl_domain_status_conversions!(ProcessKind {
    Staff => "staff",
    PrimaryStudents => "primary_students",
    SecondaryStudents => "secondary_students",
});

impl ProcessKind {
    /// Key the flag is stored under in the local KV store
    pub fn storage_key(self) -> String {
        format!("{}{}", PROCESS_FLAG_KEY_PREFIX, self)
    }
}

/// Whether an attendance process was started on a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceProcessFlag {
    pub kind: ProcessKind,
    pub date: NaiveDate,
    pub started: bool,
}

impl AttendanceProcessFlag {
    /// Fresh not-started flag for the given day
    pub fn not_started(kind: ProcessKind, date: NaiveDate) -> Self {
        Self { kind, date, started: false }
    }

    /// True only when the flag is for `date` and marked started
    pub fn is_started_on(&self, date: NaiveDate) -> bool {
        self.started && self.date == date
    }
}
