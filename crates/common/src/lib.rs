//! Modular common utilities shared across PasaLista crates.
//!
//! Small, generic building blocks with no domain knowledge: retry logic with
//! configurable backoff, duration formatting, and a clock abstraction for
//! deterministic tests.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod resilience;
pub mod testing;
pub mod time;

// Re-export commonly used types and traits for convenience
pub use resilience::{
    retry_with_policy, BackoffStrategy, Jitter, RetryConfig, RetryConfigBuilder, RetryDecision,
    RetryError, RetryExecutor, RetryPolicy, RetryResult,
};
pub use testing::time::{Clock, MockClock, SystemClock};
pub use time::format_duration;
