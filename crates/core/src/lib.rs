//! # PasaLista Core
//!
//! Pure scheduling logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - The day-scoped snapshot cache and its port interfaces
//! - Role-specific schedule handlers
//! - The attendance window state evaluation
//! - The realtime session lifecycle
//! - Campus geofence evaluation
//!
//! ## Architecture Principles
//! - Only depends on `pasalista-common` and `pasalista-domain`
//! - No database, HTTP, or socket code
//! - All external dependencies via traits
//! - Pure, testable scheduling logic

pub mod geofence;
pub mod realtime;
pub mod schedule;
pub mod snapshot;

// Infrastructure ports
pub mod clock_ports;

// Re-export specific items to avoid ambiguity
pub use clock_ports::SchoolClock;
pub use geofence::{point_in_polygon, GeofenceEvaluator};
pub use realtime::ports::{RealtimeTransport, SessionCredential, TransportHandle};
pub use realtime::{RealtimeSession, SessionPhase};
pub use schedule::handlers::{
    handler_for, AuxiliarySchedule, DirectiveSchedule, PrimaryStudentSchedule, ScheduleHandler,
    SecondaryStudentSchedule, TeacherSchedule,
};
pub use schedule::monitor::ScheduleMonitor;
pub use schedule::status::{evaluate, needs_day_refresh, StatusInputs};
pub use snapshot::ports::{ProcessStatusSource, SnapshotSource, SnapshotStore};
pub use snapshot::SnapshotCache;
