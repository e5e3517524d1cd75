//! Domain types and models

pub mod clock;
pub mod geo;
pub mod process;
pub mod role;
pub mod roster;
pub mod schedule;
pub mod snapshot;
pub mod status;

// Re-export the types callers reach for most
pub use clock::ClockReading;
pub use geo::{GeoPoint, GeofencePolygon};
pub use process::{AttendanceProcessFlag, ProcessKind};
pub use role::{ActivityKind, Role};
pub use roster::{Roster, StaffMember, StudentRecord};
pub use schedule::{Communique, DateRange, EventDay, ScheduleWindow, ScheduleWindows};
pub use snapshot::DailySnapshot;
pub use status::{AttendanceState, AttendanceStatus};
