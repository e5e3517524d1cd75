//! Resilience patterns for fault tolerance
//!
//! Generic, reusable retry logic with configurable backoff strategies,
//! jitter, and customizable retry conditions. The implementations are generic
//! over error types and carry no domain knowledge; callers decide what counts
//! as retryable through a [`RetryPolicy`].

pub mod retry;

// Re-export retry types
pub use retry::{
    policies, retry_with_policy, BackoffStrategy, Jitter, RetryConfig, RetryConfigBuilder,
    RetryDecision, RetryError, RetryExecutor, RetryPolicy, RetryResult,
};
