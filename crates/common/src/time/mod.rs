//! Time utilities and abstractions
//!
//! Duration formatting plus the clock abstraction re-exported from the
//! testing module so production code can depend on one path.

pub mod format;

// Re-export commonly used items
pub use format::{format_duration, format_duration_ms};

// Re-export Clock abstractions from testing module
pub use crate::testing::time::{Clock, MockClock, SystemClock};
