//! # PasaLista Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - HTTP adapters for the attendance, process status, and time services
//! - SQLite implementation of the durable snapshot slot
//! - Configuration loading from environment variables and files
//!
//! ## Architecture
//! - Implements traits defined in `pasalista-core`
//! - Depends on `pasalista-common`, `pasalista-domain` and `pasalista-core`
//! - Contains all "impure" code (network, filesystem, process environment)

pub mod api;
pub mod clock;
pub mod config;
pub mod errors;
pub mod storage;

// Re-export commonly used items
pub use api::{
    AccessTokenProvider, ApiClient, ApiClientConfig, ApiError, AttendanceApi, StaticTokenProvider,
};
pub use clock::RemoteClockService;
pub use errors::InfraError;
pub use storage::{DbManager, SqliteSnapshotStore};
