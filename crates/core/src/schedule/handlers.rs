//! Role-specific schedule handlers
//!
//! Every role reads the same daily snapshot through the same surface; what
//! differs is which window is "mine" and how much roster the backend
//! included. Directives additionally get per-member presence checks over the
//! staff roster. The [`handler_for`] factory picks the handler matching the
//! role a snapshot was fetched for, so call sites never branch on role.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use pasalista_domain::{
    ActivityKind, ClockReading, Communique, DailySnapshot, DateRange, EventDay, Role,
    ScheduleWindow, StaffMember, StudentRecord,
};

/// Uniform read surface a role gets over the daily snapshot
pub trait ScheduleHandler: Send + Sync {
    /// Role this handler interprets for
    fn role(&self) -> Role;

    /// The snapshot being interpreted
    fn snapshot(&self) -> &DailySnapshot;

    /// Window for a schedule category, when the backend published it to
    /// this role
    fn window_for(&self, kind: ActivityKind) -> Option<&ScheduleWindow> {
        self.snapshot().windows.get(kind)
    }

    /// Window this role takes attendance under
    fn my_window(&self) -> Option<&ScheduleWindow> {
        self.window_for(self.role().activity_kind())
    }

    /// Closed-interval activity test: both endpoints count as active
    fn is_window_active(&self, kind: ActivityKind, now: DateTime<Utc>) -> bool {
        self.window_for(kind).is_some_and(|window| window.contains(now))
    }

    /// Event day covering the given date, if any
    fn event_today(&self, today: NaiveDate) -> Option<&EventDay> {
        self.snapshot().event_on(today)
    }

    /// Range during which classes are out between school years
    fn outside_school_year(&self) -> Option<&DateRange> {
        self.snapshot().outside_school_year.as_ref()
    }

    /// Mid-year break range, when one is published
    fn mid_year_break(&self) -> Option<&DateRange> {
        self.snapshot().mid_year_break.as_ref()
    }

    /// Announcements published with the snapshot
    fn communiques(&self) -> &[Communique] {
        &self.snapshot().communiques
    }
}

/// Directive view: full rosters plus per-member presence oversight
pub struct DirectiveSchedule {
    snapshot: DailySnapshot,
}

impl DirectiveSchedule {
    pub fn new(snapshot: DailySnapshot) -> Self {
        Self { snapshot }
    }

    /// Staff roster under directive oversight
    pub fn staff(&self) -> &[StaffMember] {
        &self.snapshot.roster.staff
    }

    /// Student roster under directive oversight
    pub fn students(&self) -> &[StudentRecord] {
        &self.snapshot.roster.students
    }

    /// Whether the member should currently be on campus
    ///
    /// Compared at minute granularity against the member's assigned entry
    /// and exit times; the interval is closed at both ends. Members with no
    /// assigned span are never expected.
    pub fn should_be_present(&self, member: &StaffMember, reading: &ClockReading) -> bool {
        member.presence_span().is_some_and(|(entry, exit)| {
            let now = reading.minutes_of_day();
            now >= minute_of_day(entry) && now <= minute_of_day(exit)
        })
    }
}

impl ScheduleHandler for DirectiveSchedule {
    fn role(&self) -> Role {
        Role::Directive
    }

    fn snapshot(&self) -> &DailySnapshot {
        &self.snapshot
    }
}

/// Teacher view: own window plus the group roster the backend included
pub struct TeacherSchedule {
    snapshot: DailySnapshot,
}

impl TeacherSchedule {
    pub fn new(snapshot: DailySnapshot) -> Self {
        Self { snapshot }
    }

    /// Students of the group this teacher takes attendance for
    pub fn students(&self) -> &[StudentRecord] {
        &self.snapshot.roster.students
    }
}

impl ScheduleHandler for TeacherSchedule {
    fn role(&self) -> Role {
        Role::Teacher
    }

    fn snapshot(&self) -> &DailySnapshot {
        &self.snapshot
    }
}

/// Auxiliary staff view: own window only
pub struct AuxiliarySchedule {
    snapshot: DailySnapshot,
}

impl AuxiliarySchedule {
    pub fn new(snapshot: DailySnapshot) -> Self {
        Self { snapshot }
    }
}

impl ScheduleHandler for AuxiliarySchedule {
    fn role(&self) -> Role {
        Role::Auxiliary
    }

    fn snapshot(&self) -> &DailySnapshot {
        &self.snapshot
    }
}

/// Primary student view: own window only
pub struct PrimaryStudentSchedule {
    snapshot: DailySnapshot,
}

impl PrimaryStudentSchedule {
    pub fn new(snapshot: DailySnapshot) -> Self {
        Self { snapshot }
    }
}

impl ScheduleHandler for PrimaryStudentSchedule {
    fn role(&self) -> Role {
        Role::PrimaryStudent
    }

    fn snapshot(&self) -> &DailySnapshot {
        &self.snapshot
    }
}

/// Secondary student view: own window only
pub struct SecondaryStudentSchedule {
    snapshot: DailySnapshot,
}

impl SecondaryStudentSchedule {
    pub fn new(snapshot: DailySnapshot) -> Self {
        Self { snapshot }
    }
}

impl ScheduleHandler for SecondaryStudentSchedule {
    fn role(&self) -> Role {
        Role::SecondaryStudent
    }

    fn snapshot(&self) -> &DailySnapshot {
        &self.snapshot
    }
}

/// Build the handler matching the role the snapshot was fetched for
pub fn handler_for(snapshot: DailySnapshot) -> Box<dyn ScheduleHandler> {
    match snapshot.role {
        Role::Directive => Box::new(DirectiveSchedule::new(snapshot)),
        Role::Teacher => Box::new(TeacherSchedule::new(snapshot)),
        Role::Auxiliary => Box::new(AuxiliarySchedule::new(snapshot)),
        Role::PrimaryStudent => Box::new(PrimaryStudentSchedule::new(snapshot)),
        Role::SecondaryStudent => Box::new(SecondaryStudentSchedule::new(snapshot)),
    }
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}
