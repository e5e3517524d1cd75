//! Schedule windows, event days, and announcements

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::role::ActivityKind;

/// Inclusive calendar-date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Non-working event day (civic holiday, school celebration)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDay {
    pub name: String,
    #[serde(flatten)]
    pub range: DateRange,
}

impl EventDay {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.range.contains(date)
    }
}

/// Attendance window in absolute time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ScheduleWindow {
    /// Closed interval: both endpoints count as inside
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        now >= self.start && now <= self.end
    }
}

/// The per-category windows a role is entitled to see for the day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleWindows {
    entries: BTreeMap<ActivityKind, ScheduleWindow>,
}

impl ScheduleWindows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: ActivityKind, window: ScheduleWindow) {
        self.entries.insert(kind, window);
    }

    pub fn get(&self, kind: ActivityKind) -> Option<&ScheduleWindow> {
        self.entries.get(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ActivityKind, &ScheduleWindow)> {
        self.entries.iter()
    }
}

/// Announcement published to the school community
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Communique {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub published_at: DateTime<Utc>,
}
