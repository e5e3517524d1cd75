//! HTTP-backed implementation of the school clock port

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use parking_lot::RwLock;
use pasalista_core::SchoolClock;
use pasalista_domain::constants::CLOCK_MAX_READING_AGE_SECS;
use pasalista_domain::{CampusConfig, ClockReading, PasaListaError, Result};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::api::ApiClient;

/// Wire format of the time service response
#[derive(Debug, Deserialize)]
struct ServerTime {
    epoch_ms: i64,
}

/// One successful sample of the time service
///
/// `synced_at` is monotonic, so later extrapolation is immune to device
/// clock adjustments.
#[derive(Debug, Clone, Copy)]
struct SyncPoint {
    server_time: DateTime<Utc>,
    synced_at: Instant,
}

/// School clock backed by the backend time service
pub struct RemoteClockService {
    api: Arc<ApiClient>,
    timezone: Tz,
    sync_state: RwLock<Option<SyncPoint>>,
    max_reading_age: Duration,
}

impl RemoteClockService {
    /// Create a clock for the configured campus
    ///
    /// # Errors
    ///
    /// Returns `PasaListaError::Config` if the campus timezone is not a
    /// known IANA name.
    pub fn new(api: Arc<ApiClient>, campus: &CampusConfig) -> Result<Self> {
        let timezone: Tz = campus.timezone.parse().map_err(|_| {
            PasaListaError::Config(format!("unknown campus timezone '{}'", campus.timezone))
        })?;

        Ok(Self {
            api,
            timezone,
            sync_state: RwLock::new(None),
            max_reading_age: Duration::from_secs(CLOCK_MAX_READING_AGE_SECS),
        })
    }

    /// Campus timezone the readings are derived in
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Sample the time service and record a fresh sync point
    ///
    /// # Errors
    ///
    /// Returns `PasaListaError::ClockUnavailable` when the service cannot
    /// be reached or answers with an unusable timestamp.
    #[instrument(skip(self))]
    pub async fn sync(&self) -> Result<DateTime<Utc>> {
        let response: ServerTime = self.api.get("/time").await.map_err(|err| {
            warn!(error = %err, "Time service unreachable");
            PasaListaError::ClockUnavailable(err.to_string())
        })?;

        let server_time =
            Utc.timestamp_millis_opt(response.epoch_ms).single().ok_or_else(|| {
                PasaListaError::ClockUnavailable(format!(
                    "time service returned unusable epoch {}",
                    response.epoch_ms
                ))
            })?;

        *self.sync_state.write() = Some(SyncPoint { server_time, synced_at: Instant::now() });
        info!(server_time = %server_time, "School clock synced");
        Ok(server_time)
    }

    /// Current school time extrapolated from the last sync, if still fresh
    fn current(&self) -> Option<DateTime<Utc>> {
        let point = (*self.sync_state.read())?;

        let elapsed = point.synced_at.elapsed();
        if elapsed > self.max_reading_age {
            debug!(elapsed_secs = elapsed.as_secs(), "Clock sync is stale");
            return None;
        }

        let offset = chrono::Duration::from_std(elapsed).ok()?;
        Some(point.server_time + offset)
    }
}

#[async_trait]
impl SchoolClock for RemoteClockService {
    async fn reading(&self) -> Result<ClockReading> {
        let now = match self.current() {
            Some(now) => now,
            None => {
                self.sync().await?;
                self.current().ok_or_else(|| {
                    PasaListaError::ClockUnavailable(
                        "sync produced no usable reading".to_string(),
                    )
                })?
            }
        };

        Ok(ClockReading::from_local(&now.with_timezone(&self.timezone)))
    }
}
