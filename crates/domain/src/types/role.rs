//! Viewing roles and the schedule categories they report under

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;
use crate::types::process::ProcessKind;

/// Role a snapshot is fetched and interpreted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Directive,
    Teacher,
    Auxiliary,
    PrimaryStudent,
    SecondaryStudent,
}

impl_domain_status_conversions!(Role {
    Directive => "directive",
    Teacher => "teacher",
    Auxiliary => "auxiliary",
    PrimaryStudent => "primary_student",
    SecondaryStudent => "secondary_student",
});

/// Schedule window category published by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    StaffGeneral,
    PrimaryTeachers,
    AuxiliaryStaff,
    PrimaryStudents,
    SecondaryStudents,
}

impl_domain_status_conversions!(ActivityKind {
    StaffGeneral => "staff_general",
    PrimaryTeachers => "primary_teachers",
    AuxiliaryStaff => "auxiliary_staff",
    PrimaryStudents => "primary_students",
    SecondaryStudents => "secondary_students",
});

impl Role {
    /// The window category this role takes attendance under
    pub fn activity_kind(self) -> ActivityKind {
        match self {
            Self::Directive => ActivityKind::StaffGeneral,
            Self::Teacher => ActivityKind::PrimaryTeachers,
            Self::Auxiliary => ActivityKind::AuxiliaryStaff,
            Self::PrimaryStudent => ActivityKind::PrimaryStudents,
            Self::SecondaryStudent => ActivityKind::SecondaryStudents,
        }
    }

    /// The process ledger this role's attendance start is recorded in
    pub fn process_kind(self) -> ProcessKind {
        match self {
            Self::Directive | Self::Teacher | Self::Auxiliary => ProcessKind::Staff,
            Self::PrimaryStudent => ProcessKind::PrimaryStudents,
            Self::SecondaryStudent => ProcessKind::SecondaryStudents,
        }
    }

    /// Staff roles share one process ledger and see staff rosters
    pub fn is_staff(self) -> bool {
        matches!(self, Self::Directive | Self::Teacher | Self::Auxiliary)
    }
}
