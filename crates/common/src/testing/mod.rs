//! Testing utilities and helpers
//!
//! Time mocking for deterministic tests. Production code may also depend on
//! the [`time::Clock`] trait so an injected clock can be swapped for a mock.

pub mod time;

// Re-export commonly used items
pub use time::{Clock, MockClock, SystemClock};
