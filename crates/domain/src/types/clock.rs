//! Authoritative clock reading supplied by the school time service
//!
//! Everything time-sensitive in the engine keys off these readings. The
//! device clock is never consulted; a reading arrives from the time service
//! already carrying the campus-local derived fields the schedule logic needs.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// One observation of the school clock with campus-local derived fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockReading {
    pub timestamp: DateTime<Utc>,
    pub local_date: NaiveDate,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub weekday: Weekday,
    pub is_weekend: bool,
}

impl ClockReading {
    /// Derive a reading from a campus-local datetime
    pub fn from_local<Tz: TimeZone>(local: &DateTime<Tz>) -> Self {
        let weekday = local.weekday();
        Self {
            timestamp: local.with_timezone(&Utc),
            local_date: local.date_naive(),
            hour: local.hour(),
            minute: local.minute(),
            second: local.second(),
            weekday,
            is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
        }
    }

    /// Minutes elapsed since campus-local midnight
    pub fn minutes_of_day(&self) -> u32 {
        self.hour * 60 + self.minute
    }
}
