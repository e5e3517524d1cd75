//! Error types used throughout the engine

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for PasaLista
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum PasaListaError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Clock unavailable: {0}")]
    ClockUnavailable(String),

    #[error("Session not ready: {0}")]
    SessionNotReady(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PasaListaError {
    /// True for failures a caller may retry (connectivity, superseded work)
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Cancelled(_))
    }

    /// True for failures that must end the session rather than degrade
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Result type alias for PasaLista operations
pub type Result<T> = std::result::Result<T, PasaListaError>;
