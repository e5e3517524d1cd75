//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! engine.

// Snapshot cache
pub const SNAPSHOT_SLOT_KEY: &str = "attendance.snapshot.today";
pub const PROCESS_FLAG_KEY_PREFIX: &str = "attendance.process.";

// Schedule evaluation
pub const DEFAULT_REFRESH_HOUR: u32 = 7;
pub const PENDING_LEAD_SECS: i64 = 3_600; // Pending progress spans the hour before the window opens
pub const TICK_INTERVAL_MS: u64 = 1_000;
pub const REFRESH_DEBOUNCE_MS: u64 = 30_000;

// Realtime session
pub const REALTIME_MAX_CONNECT_ATTEMPTS: u32 = 3;
pub const REALTIME_BACKOFF_MS: u64 = 2_000;
pub const REALTIME_SETTLE_MS: u64 = 600;
pub const EVENT_GREETING: &str = "attendance-greeting";
pub const EVENT_ATTENDANCE: &str = "attendance-record";

// Clock service
pub const CLOCK_MAX_READING_AGE_SECS: u64 = 600; // Re-sync with the time service after this

// Progress display
pub const PROGRESS_COMPLETE: u8 = 100;
