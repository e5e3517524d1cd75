//! Engine configuration structures
//!
//! All settings the attendance engine consumes, grouped by concern. Loading
//! from the environment or a file lives in the infra crate; this module only
//! defines the shapes and their defaults.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_REFRESH_HOUR, REALTIME_BACKOFF_MS, REALTIME_MAX_CONNECT_ATTEMPTS, REALTIME_SETTLE_MS,
    REFRESH_DEBOUNCE_MS, TICK_INTERVAL_MS,
};
use crate::errors::{PasaListaError, Result};
use crate::types::geo::GeofencePolygon;

/// Top-level configuration for the attendance engine
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub campus: CampusConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub realtime: RealtimeConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl EngineConfig {
    /// Check the configuration for values the engine cannot run with
    ///
    /// # Errors
    /// Returns `PasaListaError::Config` naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            return Err(PasaListaError::Config("api.base_url must not be empty".to_string()));
        }
        if self.campus.refresh_hour > 23 {
            return Err(PasaListaError::Config(format!(
                "campus.refresh_hour must be 0..=23, got {}",
                self.campus.refresh_hour
            )));
        }
        if self.realtime.max_connect_attempts == 0 {
            return Err(PasaListaError::Config(
                "realtime.max_connect_attempts must be at least 1".to_string(),
            ));
        }
        if self.storage.pool_size == 0 {
            return Err(PasaListaError::Config("storage.pool_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Remote attendance API endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: "https://api.pasalista.example".to_string(), timeout_seconds: 30 }
    }
}

/// Campus locale: timezone, refresh hour, and the optional check-in geofence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CampusConfig {
    /// IANA timezone name the school day is interpreted in
    pub timezone: String,
    /// Local hour after which a stale snapshot stops counting as "preparing"
    pub refresh_hour: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geofence: Option<GeofencePolygon>,
}

impl Default for CampusConfig {
    fn default() -> Self {
        Self {
            timezone: "America/Mexico_City".to_string(),
            refresh_hour: DEFAULT_REFRESH_HOUR,
            geofence: None,
        }
    }
}

/// Snapshot fetch and re-evaluation behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub refresh_debounce_ms: u64,
    pub tick_interval_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay_ms: 500,
            refresh_debounce_ms: REFRESH_DEBOUNCE_MS,
            tick_interval_ms: TICK_INTERVAL_MS,
        }
    }
}

/// Realtime session connection behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RealtimeConfig {
    pub max_connect_attempts: u32,
    pub backoff_ms: u64,
    pub settle_ms: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_connect_attempts: REALTIME_MAX_CONNECT_ATTEMPTS,
            backoff_ms: REALTIME_BACKOFF_MS,
            settle_ms: REALTIME_SETTLE_MS,
        }
    }
}

/// Durable local store location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub path: String,
    pub pool_size: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { path: "pasalista.db".to_string(), pool_size: 4 }
    }
}
