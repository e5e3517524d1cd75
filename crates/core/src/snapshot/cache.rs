//! Day-scoped snapshot cache - core offline-first logic
//!
//! One snapshot occupies a single "today" slot in durable storage. Validity
//! is decided purely by calendar date against the school clock, and the
//! remote backend stays the source of truth: a fetch replaces the slot, it
//! never merges. On weekends the stored snapshot is served as-is so the app
//! keeps working while the backend publishes nothing.

use std::sync::Arc;

use chrono::NaiveDate;
use pasalista_domain::{
    AttendanceProcessFlag, DailySnapshot, PasaListaError, ProcessKind, Result, Role,
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::ports::{ProcessStatusSource, SnapshotSource, SnapshotStore};
use crate::clock_ports::SchoolClock;

/// Read-through cache over the single "today" snapshot slot
pub struct SnapshotCache {
    store: Arc<dyn SnapshotStore>,
    source: Arc<dyn SnapshotSource>,
    process_source: Arc<dyn ProcessStatusSource>,
    clock: Arc<dyn SchoolClock>,
    fetch_state: Mutex<FetchState>,
}

/// Guard for the at-most-one in-flight fetch
///
/// The generation counter lets a finished fetch tell whether the guard it
/// holds is still its own or has been taken over by a superseding call.
struct FetchState {
    in_flight: Option<CancellationToken>,
    generation: u64,
}

impl SnapshotCache {
    /// Create a cache over the given ports
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        source: Arc<dyn SnapshotSource>,
        process_source: Arc<dyn ProcessStatusSource>,
        clock: Arc<dyn SchoolClock>,
    ) -> Self {
        Self {
            store,
            source,
            process_source,
            clock,
            fetch_state: Mutex::new(FetchState { in_flight: None, generation: 0 }),
        }
    }

    /// Snapshot for today, fetching from the backend only when the stored
    /// one is missing or belongs to another day
    ///
    /// On weekends a stored snapshot is returned unconditionally, whatever
    /// its date. A caller whose fetch is superseded by a newer call receives
    /// `PasaListaError::Cancelled`.
    pub async fn get_snapshot(&self, role: Role) -> Result<DailySnapshot> {
        let reading = self.clock.reading().await?;
        let today = reading.local_date;
        let stored = self.store.load_snapshot().await.map_err(escalate_storage)?;

        if reading.is_weekend {
            if let Some(snapshot) = stored {
                debug!(date = %snapshot.calendar_date, "Weekend: serving stored snapshot without refresh");
                return Ok(snapshot);
            }
        }

        match stored {
            Some(snapshot) if snapshot.is_for(today) => {
                debug!(date = %today, "Snapshot cache hit");
                Ok(snapshot)
            }
            Some(snapshot) => {
                debug!(stored = %snapshot.calendar_date, today = %today, "Stored snapshot is stale");
                self.fetch_and_store(role, today).await
            }
            None => {
                debug!(today = %today, "No stored snapshot");
                self.fetch_and_store(role, today).await
            }
        }
    }

    /// Persist a snapshot into the slot, replacing whatever it held
    pub async fn save_snapshot(&self, snapshot: &DailySnapshot) -> Result<()> {
        self.store.save_snapshot(snapshot).await.map_err(escalate_storage)
    }

    /// Empty the slot, forcing the next read to fetch
    pub async fn clear(&self) -> Result<()> {
        self.store.clear_snapshot().await.map_err(escalate_storage)
    }

    /// Fetch a fresh snapshot unless one is already being fetched
    ///
    /// Used by the schedule monitor for proactive new-day refreshes. Returns
    /// `Ok(false)` when skipped because a fetch was already running.
    pub async fn try_refresh(&self, role: Role) -> Result<bool> {
        if self.fetch_in_flight().await {
            debug!("Refresh skipped, fetch already in flight");
            return Ok(false);
        }

        let reading = self.clock.reading().await?;
        self.fetch_and_store(role, reading.local_date).await?;
        Ok(true)
    }

    /// True while a snapshot fetch is running
    pub async fn fetch_in_flight(&self) -> bool {
        self.fetch_state.lock().await.in_flight.is_some()
    }

    /// Stored snapshot without any fetch side effect
    ///
    /// The periodic evaluation reads through this so a stale snapshot shows
    /// up as a derived state instead of triggering a fetch on every tick.
    pub async fn peek_snapshot(&self) -> Result<Option<DailySnapshot>> {
        self.store.load_snapshot().await.map_err(escalate_storage)
    }

    /// Stored process flag without the remote read-through
    pub async fn peek_process_flag(
        &self,
        kind: ProcessKind,
    ) -> Result<Option<AttendanceProcessFlag>> {
        self.store.load_flag(kind).await.map_err(escalate_storage)
    }

    /// Flag for a process ledger, read through to the backend when the
    /// stored one is missing or from another day
    ///
    /// When the backend cannot answer, a not-started flag for today is
    /// synthesized and persisted so the app degrades to a usable default
    /// instead of erroring.
    pub async fn get_process_flag(&self, kind: ProcessKind) -> Result<AttendanceProcessFlag> {
        let today = self.clock.reading().await?.local_date;
        self.flag_for(kind, today).await
    }

    /// Record whether the process was started today, locally and upstream
    ///
    /// The local write is authoritative; a failed upstream report is logged
    /// and dropped.
    pub async fn set_process_flag(
        &self,
        kind: ProcessKind,
        started: bool,
    ) -> Result<AttendanceProcessFlag> {
        let today = self.clock.reading().await?.local_date;
        let flag = AttendanceProcessFlag { kind, date: today, started };
        self.store.save_flag(&flag).await.map_err(escalate_storage)?;
        info!(kind = %kind, started, "Process flag updated");

        if let Err(err) = self.process_source.push_status(&flag).await {
            warn!(kind = %kind, error = %err, "Failed to report process status upstream");
        }
        Ok(flag)
    }

    /// True when the process ledger records a start for today
    pub async fn is_process_started_today(&self, kind: ProcessKind) -> Result<bool> {
        let today = self.clock.reading().await?.local_date;
        let flag = self.flag_for(kind, today).await?;
        Ok(flag.is_started_on(today))
    }

    async fn flag_for(&self, kind: ProcessKind, today: NaiveDate) -> Result<AttendanceProcessFlag> {
        if let Some(flag) = self.store.load_flag(kind).await.map_err(escalate_storage)? {
            if flag.date == today {
                return Ok(flag);
            }
            debug!(kind = %kind, stored = %flag.date, "Stored process flag is from another day");
        }

        let flag = match self.process_source.fetch_status(kind).await {
            Ok(flag) => flag,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                warn!(kind = %kind, error = %err, "Process status fetch failed, defaulting to not started");
                AttendanceProcessFlag::not_started(kind, today)
            }
        };
        self.store.save_flag(&flag).await.map_err(escalate_storage)?;
        Ok(flag)
    }

    /// Run one fetch, superseding any fetch already in flight
    async fn fetch_and_store(&self, role: Role, today: NaiveDate) -> Result<DailySnapshot> {
        let (token, my_generation) = {
            let mut state = self.fetch_state.lock().await;
            if let Some(previous) = state.in_flight.take() {
                debug!("Superseding in-flight snapshot fetch");
                previous.cancel();
            }
            let token = CancellationToken::new();
            state.in_flight = Some(token.clone());
            state.generation += 1;
            (token, state.generation)
        };

        let fetched = tokio::select! {
            _ = token.cancelled() => {
                Err(PasaListaError::Cancelled("snapshot fetch superseded".to_string()))
            }
            fetched = self.source.fetch_today(role) => fetched,
        };

        // Release the guard only if a superseding fetch has not taken it over
        {
            let mut state = self.fetch_state.lock().await;
            if state.generation == my_generation {
                state.in_flight = None;
            }
        }

        let snapshot = match fetched {
            Ok(snapshot) => snapshot,
            Err(err) => {
                if matches!(err, PasaListaError::Cancelled(_)) {
                    debug!(role = %role, "Snapshot fetch superseded");
                } else {
                    warn!(role = %role, error = %err, "Snapshot fetch failed");
                }
                return Err(err);
            }
        };

        if !snapshot.is_for(today) {
            warn!(fetched = %snapshot.calendar_date, today = %today, "Fetched snapshot is not for today");
        }

        self.store.save_snapshot(&snapshot).await.map_err(escalate_storage)?;
        info!(role = %role, date = %snapshot.calendar_date, "Snapshot refreshed");
        Ok(snapshot)
    }
}

/// Storage failures end the flow; surface them loudly before propagating
fn escalate_storage(err: PasaListaError) -> PasaListaError {
    error!(error = %err, "Snapshot store operation failed");
    err
}
