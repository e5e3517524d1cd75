//! Attendance window state evaluation
//!
//! The status shown to the user is a derived value: it is recomputed from
//! the snapshot, the school clock, and the process flag on every tick, and
//! never stored. Guards are checked in a fixed order and the first match
//! wins, which is what makes the nine states mutually exclusive. An event
//! day outranks everything, including weekends; a running fetch outranks
//! missing data, so startup shows "syncing" rather than "loading" while the
//! first snapshot is on the wire.

use chrono::{DateTime, Utc};
use pasalista_common::time::format_duration;
use pasalista_domain::constants::{PENDING_LEAD_SECS, PROGRESS_COMPLETE};
use pasalista_domain::{
    AttendanceProcessFlag, AttendanceState, AttendanceStatus, ClockReading, DailySnapshot,
};

/// Everything one evaluation reads
///
/// Optional pieces model data that has not arrived yet; the evaluation
/// degrades to `Loading` rather than failing.
#[derive(Debug, Clone, Copy)]
pub struct StatusInputs<'a> {
    pub snapshot: Option<&'a DailySnapshot>,
    pub reading: Option<&'a ClockReading>,
    pub process_flag: Option<&'a AttendanceProcessFlag>,
    /// A snapshot fetch is currently on the wire
    pub sync_in_flight: bool,
    /// The attendance capture flow is already open in the interface
    pub capture_open: bool,
    /// Local hour after which a stale snapshot is refreshed instead of
    /// waiting
    pub refresh_hour: u32,
}

/// Evaluate the attendance window state for one instant
///
/// Pure function of its inputs; the caller owns all side effects.
pub fn evaluate(inputs: StatusInputs<'_>) -> AttendanceStatus {
    // 1. Event day: no attendance at all, whatever else holds
    if let (Some(snapshot), Some(reading)) = (inputs.snapshot, inputs.reading) {
        if let Some(event) = snapshot.event_on(reading.local_date) {
            return AttendanceStatus::plain(
                AttendanceState::Event,
                format!("Hoy no hay clases: {}", event.name),
            );
        }
    }

    // 2. A fetch on the wire
    if inputs.sync_in_flight {
        return AttendanceStatus::plain(AttendanceState::Syncing, "Sincronizando el horario de hoy");
    }

    // 3. Something still missing
    let (snapshot, reading) = match (inputs.snapshot, inputs.reading) {
        (Some(snapshot), Some(reading)) => (snapshot, reading),
        _ => return loading(),
    };
    let window = match snapshot.windows.get(snapshot.role.activity_kind()) {
        Some(window) => *window,
        None => return loading(),
    };

    // 4. Weekend
    if reading.is_weekend {
        return AttendanceStatus::plain(
            AttendanceState::NotAvailable,
            "Fin de semana, sin pase de lista",
        );
    }

    // 5. Stale snapshot before the refresh hour
    if !snapshot.is_for(reading.local_date) && reading.hour < inputs.refresh_hour {
        return AttendanceStatus::plain(
            AttendanceState::Preparing,
            format!("El horario de hoy se actualizará a las {}:00", inputs.refresh_hour),
        );
    }

    let now = reading.timestamp;

    // 6. Before the window opens
    if now < window.start {
        return AttendanceStatus {
            state: AttendanceState::Pending,
            description: "El pase de lista aún no abre".to_string(),
            remaining: remaining_text(window.start, now),
            progress: pending_progress(window.start, now),
            action_enabled: false,
        };
    }

    // 7. At or past the closing minute
    if minute_instant(now) >= minute_instant(window.end) {
        return AttendanceStatus::plain(
            AttendanceState::Closed,
            "El pase de lista de hoy ya cerró",
        );
    }

    // 8. Already started today
    let started = inputs
        .process_flag
        .is_some_and(|flag| flag.is_started_on(reading.local_date));
    if started {
        return AttendanceStatus {
            state: AttendanceState::InProcess,
            description: "Pase de lista en curso".to_string(),
            remaining: remaining_text(window.end, now),
            progress: PROGRESS_COMPLETE,
            action_enabled: !inputs.capture_open,
        };
    }

    // 9. Open and waiting
    AttendanceStatus {
        state: AttendanceState::Available,
        description: "Puedes iniciar el pase de lista".to_string(),
        remaining: remaining_text(window.end, now),
        progress: PROGRESS_COMPLETE,
        action_enabled: true,
    }
}

/// Whether the monitor should proactively refresh for a new day
///
/// True when the stored snapshot belongs to an earlier day, the refresh hour
/// has passed, and the day is a working one with no event covering it. The
/// refresh itself is the caller's side effect; this stays a pure predicate.
pub fn needs_day_refresh(inputs: StatusInputs<'_>) -> bool {
    let (Some(snapshot), Some(reading)) = (inputs.snapshot, inputs.reading) else {
        return false;
    };
    if snapshot.is_for(reading.local_date) || reading.is_weekend {
        return false;
    }
    if reading.hour < inputs.refresh_hour {
        return false;
    }
    snapshot.event_on(reading.local_date).is_none()
}

fn loading() -> AttendanceStatus {
    AttendanceStatus::plain(AttendanceState::Loading, "Cargando la información del día")
}

/// Truncate to whole minutes; the closing comparison ignores seconds
fn minute_instant(at: DateTime<Utc>) -> i64 {
    at.timestamp() / 60
}

fn remaining_text(until: DateTime<Utc>, now: DateTime<Utc>) -> Option<String> {
    let left = (until - now).to_std().ok()?;
    Some(format_duration(left))
}

/// Progress through the hour leading up to the window, 0 to 100
fn pending_progress(start: DateTime<Utc>, now: DateTime<Utc>) -> u8 {
    let until_start = (start - now).num_seconds();
    if until_start >= PENDING_LEAD_SECS {
        return 0;
    }
    let complete = i64::from(PROGRESS_COMPLETE);
    (((PENDING_LEAD_SECS - until_start) * complete) / PENDING_LEAD_SECS).clamp(0, complete) as u8
}
