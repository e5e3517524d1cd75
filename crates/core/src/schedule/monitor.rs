//! Schedule monitor driving the periodic status evaluation
//!
//! Owns the tick loop: once per interval it gathers the stored snapshot,
//! the school clock reading, and the process flag, evaluates the attendance
//! status, and publishes it for the interface layer to read. The monitor is
//! also where the one allowed side effect of a stale snapshot lives: when a
//! new school day is detected after the refresh hour, it refreshes the
//! cache, debounced so a failing backend is not hammered once per second.
//!
//! Join handles are tracked and cancellation is explicit; dropping a
//! running monitor cancels its loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use pasalista_common::{Clock, SystemClock};
use pasalista_domain::{AttendanceStatus, EngineConfig, PasaListaError, Result, Role};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::status::{evaluate, needs_day_refresh, StatusInputs};
use crate::clock_ports::SchoolClock;
use crate::snapshot::SnapshotCache;

/// Periodic attendance status evaluation with proactive new-day refresh
pub struct ScheduleMonitor {
    core: Arc<MonitorCore>,
    cancellation: CancellationToken,
    tick_handle: Option<JoinHandle<()>>,
}

struct MonitorCore {
    cache: Arc<SnapshotCache>,
    clock: Arc<dyn SchoolClock>,
    /// Monotonic clock for the refresh debounce, swappable in tests
    wall: Arc<dyn Clock>,
    role: Role,
    refresh_hour: u32,
    tick_interval: Duration,
    refresh_debounce: Duration,
    status: RwLock<AttendanceStatus>,
    capture_open: AtomicBool,
    last_refresh: Mutex<Option<Instant>>,
}

impl ScheduleMonitor {
    /// Create a monitor for the given role over the shared cache
    pub fn new(
        cache: Arc<SnapshotCache>,
        clock: Arc<dyn SchoolClock>,
        role: Role,
        config: &EngineConfig,
    ) -> Self {
        Self::with_wall_clock(cache, clock, Arc::new(SystemClock), role, config)
    }

    /// Create a monitor with an explicit monotonic clock for the debounce
    pub fn with_wall_clock(
        cache: Arc<SnapshotCache>,
        clock: Arc<dyn SchoolClock>,
        wall: Arc<dyn Clock>,
        role: Role,
        config: &EngineConfig,
    ) -> Self {
        let refresh_hour = config.campus.refresh_hour;
        let initial = evaluate(StatusInputs {
            snapshot: None,
            reading: None,
            process_flag: None,
            sync_in_flight: false,
            capture_open: false,
            refresh_hour,
        });
        let core = MonitorCore {
            cache,
            clock,
            wall,
            role,
            refresh_hour,
            tick_interval: Duration::from_millis(config.sync.tick_interval_ms),
            refresh_debounce: Duration::from_millis(config.sync.refresh_debounce_ms),
            status: RwLock::new(initial),
            capture_open: AtomicBool::new(false),
            last_refresh: Mutex::new(None),
        };
        Self { core: Arc::new(core), cancellation: CancellationToken::new(), tick_handle: None }
    }

    /// Start the tick loop
    pub async fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Err(PasaListaError::Internal("schedule monitor already running".to_string()));
        }
        self.cancellation = CancellationToken::new();

        // Publish a first evaluation so the interface never sees a gap
        // between construction and the first tick
        let (status, _) = self.core.observe().await;
        self.core.publish(status).await;

        let core = self.core.clone();
        let cancel = self.cancellation.clone();
        let handle = tokio::spawn(async move {
            run_tick_loop(core, cancel).await;
        });
        self.tick_handle = Some(handle);
        info!(role = %self.core.role, "Schedule monitor started");
        Ok(())
    }

    /// Stop the tick loop and wait for it to finish
    pub async fn stop(&mut self) -> Result<()> {
        let handle = match self.tick_handle.take() {
            Some(handle) => handle,
            None => {
                return Err(PasaListaError::Internal(
                    "schedule monitor is not running".to_string(),
                ));
            }
        };

        self.cancellation.cancel();
        if let Err(err) = handle.await {
            warn!(error = %err, "Schedule monitor tick task ended abnormally");
        }
        info!(role = %self.core.role, "Schedule monitor stopped");
        Ok(())
    }

    /// Whether the tick loop is active
    pub fn is_running(&self) -> bool {
        self.tick_handle.is_some()
    }

    /// Latest published attendance status
    pub async fn current_status(&self) -> AttendanceStatus {
        self.core.status.read().await.clone()
    }

    /// Tell the evaluation whether the capture flow is open in the interface
    pub fn set_capture_open(&self, open: bool) {
        self.core.capture_open.store(open, Ordering::SeqCst);
    }
}

impl Drop for ScheduleMonitor {
    fn drop(&mut self) {
        if self.is_running() {
            warn!(role = %self.core.role, "Schedule monitor dropped while running, cancelling its loop");
            self.cancellation.cancel();
        }
    }
}

async fn run_tick_loop(core: Arc<MonitorCore>, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(core.tick_interval);
    // A slow inline refresh must not cause a burst of catch-up ticks
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Schedule monitor loop cancelled");
                break;
            }
            _ = interval.tick() => {
                core.tick().await;
            }
        }
    }
}

impl MonitorCore {
    /// One evaluation pass, refreshing first when a new day calls for it
    async fn tick(&self) {
        let (status, refresh_needed) = self.observe().await;
        self.publish(status).await;

        if refresh_needed && self.debounce_allows().await {
            self.run_refresh().await;
            let (status, _) = self.observe().await;
            self.publish(status).await;
        }
    }

    /// Gather inputs and evaluate, without side effects
    async fn observe(&self) -> (AttendanceStatus, bool) {
        let reading = match self.clock.reading().await {
            Ok(reading) => Some(reading),
            Err(err) => {
                debug!(error = %err, "No clock reading for this tick");
                None
            }
        };
        // Storage failures already logged by the cache; shown as loading
        let snapshot = self.cache.peek_snapshot().await.ok().flatten();
        let flag = self.cache.peek_process_flag(self.role.process_kind()).await.ok().flatten();
        let sync_in_flight = self.cache.fetch_in_flight().await;

        let inputs = StatusInputs {
            snapshot: snapshot.as_ref(),
            reading: reading.as_ref(),
            process_flag: flag.as_ref(),
            sync_in_flight,
            capture_open: self.capture_open.load(Ordering::SeqCst),
            refresh_hour: self.refresh_hour,
        };
        (evaluate(inputs), needs_day_refresh(inputs))
    }

    async fn publish(&self, status: AttendanceStatus) {
        let mut current = self.status.write().await;
        if current.state != status.state {
            info!(from = %current.state, to = %status.state, "Attendance state changed");
        }
        *current = status;
    }

    /// One refresh per debounce interval, measured on the monotonic clock
    async fn debounce_allows(&self) -> bool {
        let mut last = self.last_refresh.lock().await;
        let now = self.wall.now();
        match *last {
            Some(at) if now.duration_since(at) < self.refresh_debounce => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    async fn run_refresh(&self) {
        info!(role = %self.role, "New school day detected, refreshing snapshot");
        match self.cache.try_refresh(self.role).await {
            Ok(true) => {}
            Ok(false) => debug!("Refresh skipped, a fetch was already in flight"),
            Err(err) if err.is_transient() => {
                warn!(error = %err, "Proactive snapshot refresh failed");
            }
            Err(err) => {
                error!(error = %err, "Proactive snapshot refresh failed");
            }
        }
    }
}
