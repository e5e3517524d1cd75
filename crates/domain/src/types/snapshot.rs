//! The day-scoped attendance snapshot

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::role::Role;
use crate::types::roster::Roster;
use crate::types::schedule::{Communique, DateRange, EventDay, ScheduleWindows};

/// Everything the engine knows about one school day, fetched per role
///
/// The remote backend is the source of truth; the locally stored copy is a
/// read-through cache occupying a single "today" slot. Validity is decided
/// purely by `calendar_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub role: Role,
    pub calendar_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_day: Option<EventDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outside_school_year: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid_year_break: Option<DateRange>,
    #[serde(default)]
    pub communiques: Vec<Communique>,
    #[serde(default)]
    pub windows: ScheduleWindows,
    #[serde(default)]
    pub roster: Roster,
}

impl DailySnapshot {
    /// Bare snapshot for a role and day, with nothing scheduled
    pub fn new(role: Role, calendar_date: NaiveDate) -> Self {
        Self {
            role,
            calendar_date,
            event_day: None,
            outside_school_year: None,
            mid_year_break: None,
            communiques: Vec::new(),
            windows: ScheduleWindows::new(),
            roster: Roster::default(),
        }
    }

    /// Snapshot validity is date-only; no time component is consulted
    pub fn is_for(&self, date: NaiveDate) -> bool {
        self.calendar_date == date
    }

    /// Event day record covering the given date, if any
    pub fn event_on(&self, date: NaiveDate) -> Option<&EventDay> {
        self.event_day.as_ref().filter(|event| event.covers(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validity_is_date_equality() {
        let snapshot = DailySnapshot::new(Role::Teacher, date(2025, 7, 7));
        assert!(snapshot.is_for(date(2025, 7, 7)));
        assert!(!snapshot.is_for(date(2025, 7, 8)));
    }

    #[test]
    fn test_event_on_respects_range() {
        let mut snapshot = DailySnapshot::new(Role::Teacher, date(2025, 7, 6));
        snapshot.event_day = Some(EventDay {
            name: "Día del Maestro".to_string(),
            range: DateRange { start: date(2025, 7, 6), end: date(2025, 7, 6) },
        });

        assert!(snapshot.event_on(date(2025, 7, 6)).is_some());
        assert!(snapshot.event_on(date(2025, 7, 7)).is_none());
    }

    #[test]
    fn test_snapshot_round_trips_through_json() {
        let snapshot = DailySnapshot::new(Role::Directive, date(2025, 7, 7));
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: DailySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
