//! Personnel and student rosters scoped to the viewing role
//!
//! The backend decides how much roster a role receives: directives get the
//! full staff and student lists, teachers get their group's students, and
//! student roles get nothing. These types hold whatever arrived.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Staff member as listed for directive oversight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: Uuid,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<NaiveTime>,
}

impl StaffMember {
    /// Personal attendance span, when the member has one assigned
    pub fn presence_span(&self) -> Option<(NaiveTime, NaiveTime)> {
        match (self.entry_time, self.exit_time) {
            (Some(entry), Some(exit)) => Some((entry, exit)),
            _ => None,
        }
    }
}

/// Student as listed for a teacher's group or directive oversight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: Uuid,
    pub full_name: String,
    pub group: String,
}

/// Role-scoped personnel lists carried by the daily snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub staff: Vec<StaffMember>,
    #[serde(default)]
    pub students: Vec<StudentRecord>,
}

impl Roster {
    pub fn is_empty(&self) -> bool {
        self.staff.is_empty() && self.students.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_span_requires_both_times() {
        let mut member = StaffMember {
            id: Uuid::new_v4(),
            full_name: "Laura Jiménez".to_string(),
            position: Some("Subdirectora".to_string()),
            entry_time: NaiveTime::from_hms_opt(7, 30, 0),
            exit_time: None,
        };
        assert_eq!(member.presence_span(), None);

        member.exit_time = NaiveTime::from_hms_opt(15, 0, 0);
        let (entry, exit) = member.presence_span().unwrap();
        assert_eq!(entry, NaiveTime::from_hms_opt(7, 30, 0).unwrap());
        assert_eq!(exit, NaiveTime::from_hms_opt(15, 0, 0).unwrap());
    }

    #[test]
    fn test_empty_roster() {
        assert!(Roster::default().is_empty());
    }
}
