//! Attendance endpoint adapters
//!
//! Implements the snapshot and process-status source ports from
//! `pasalista-core` on top of the shared [`ApiClient`].

use std::sync::Arc;

use async_trait::async_trait;
use pasalista_core::{ProcessStatusSource, SnapshotSource};
use pasalista_domain::{
    AttendanceProcessFlag, DailySnapshot, PasaListaError, ProcessKind, Result, Role,
};
use tracing::{debug, info};

use super::client::ApiClient;

/// Remote source for daily snapshots and the process status ledger
pub struct AttendanceApi {
    client: Arc<ApiClient>,
}

impl AttendanceApi {
    /// Create a new attendance API over a shared client
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SnapshotSource for AttendanceApi {
    async fn fetch_today(&self, role: Role) -> Result<DailySnapshot> {
        debug!(role = %role, "Fetching today's snapshot");

        let path = format!("/attendance/today?role={role}");
        let snapshot: DailySnapshot = self.client.get(&path).await.map_err(PasaListaError::from)?;

        info!(role = %role, calendar_date = %snapshot.calendar_date, "Fetched daily snapshot");
        Ok(snapshot)
    }
}

#[async_trait]
impl ProcessStatusSource for AttendanceApi {
    async fn fetch_status(&self, kind: ProcessKind) -> Result<AttendanceProcessFlag> {
        debug!(kind = %kind, "Fetching process status");

        let path = format!("/attendance/process/{kind}");
        let flag: AttendanceProcessFlag =
            self.client.get(&path).await.map_err(PasaListaError::from)?;

        debug!(kind = %kind, date = %flag.date, started = flag.started, "Fetched process status");
        Ok(flag)
    }

    async fn push_status(&self, flag: &AttendanceProcessFlag) -> Result<()> {
        debug!(kind = %flag.kind, started = flag.started, "Pushing process status");

        let path = format!("/attendance/process/{}", flag.kind);
        self.client.post::<_, ()>(&path, flag).await.map_err(PasaListaError::from)?;

        info!(kind = %flag.kind, date = %flag.date, "Process status pushed");
        Ok(())
    }
}
