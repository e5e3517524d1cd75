//! HTTP adapters for the attendance backend
//!
//! The [`ApiClient`] owns authentication, timeouts and transient-failure
//! retries. [`AttendanceApi`] layers the concrete endpoints on top of it and
//! implements the core source ports.

pub mod attendance;
pub mod auth;
pub mod client;
pub mod errors;

pub use attendance::AttendanceApi;
pub use auth::{AccessTokenProvider, StaticTokenProvider};
pub use client::{ApiClient, ApiClientBuilder, ApiClientConfig};
pub use errors::{ApiError, ApiErrorCategory};
