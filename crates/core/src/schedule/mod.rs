//! Schedule interpretation and attendance window evaluation

pub mod handlers;
pub mod monitor;
pub mod status;

pub use handlers::*;
pub use monitor::ScheduleMonitor;
pub use status::{evaluate, needs_day_refresh, StatusInputs};
