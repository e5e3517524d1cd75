//! Realtime session state machine
//!
//! Wraps a [`RealtimeTransport`] with connection lifecycle management:
//! - Bounded connect attempts with a fixed delay between them
//! - A short settle period after the socket opens, before the session
//!   reports ready
//! - Fail-fast emits: once the handle is gone, every emit returns
//!   `SessionNotReady` instead of queueing silently
//! - Explicit reconnect that tears down the old connection first
//!
//! Phase changes are published through a watch channel so callers can
//! react to transitions instead of polling.

use std::sync::Arc;
use std::time::Duration;

use pasalista_domain::constants::{EVENT_ATTENDANCE, EVENT_GREETING};
use pasalista_domain::{impl_domain_status_conversions, PasaListaError, RealtimeConfig, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{watch, RwLock};
use tracing::{debug, error, info, warn};

use super::ports::{RealtimeTransport, SessionCredential, TransportHandle};

/// Where the session currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    Failed,
}

impl_domain_status_conversions!(SessionPhase {
    Disconnected => "disconnected",
    Connecting => "connecting",
    Connected => "connected",
    Reconnecting => "reconnecting",
    Failed => "failed",
});

struct SessionState {
    phase: SessionPhase,
    handle: Option<Arc<dyn TransportHandle>>,
}

/// Manages one realtime connection on behalf of the attendance flow
///
/// Constructed with the credential the transport presents upstream; the
/// same credential is re-presented on every reconnect. The session never
/// reconnects on its own. When the connection drops or an emit fails, the
/// handle is cleared and callers see `SessionNotReady` until someone calls
/// [`connect`](Self::connect) or [`reconnect`](Self::reconnect) again.
pub struct RealtimeSession {
    transport: Arc<dyn RealtimeTransport>,
    credential: SessionCredential,
    config: RealtimeConfig,
    state: RwLock<SessionState>,
    phase_tx: watch::Sender<SessionPhase>,
}

impl RealtimeSession {
    pub fn new(
        transport: Arc<dyn RealtimeTransport>,
        credential: SessionCredential,
        config: RealtimeConfig,
    ) -> Self {
        let (phase_tx, _) = watch::channel(SessionPhase::Disconnected);
        Self {
            transport,
            credential,
            config,
            state: RwLock::new(SessionState {
                phase: SessionPhase::Disconnected,
                handle: None,
            }),
            phase_tx,
        }
    }

    /// Current lifecycle phase
    pub async fn phase(&self) -> SessionPhase {
        self.state.read().await.phase
    }

    /// Subscribe to lifecycle transitions
    ///
    /// The receiver starts at the current phase and observes every change
    /// published after subscription.
    pub fn watch_phase(&self) -> watch::Receiver<SessionPhase> {
        self.phase_tx.subscribe()
    }

    /// Whether emits would currently be accepted
    pub async fn is_ready(&self) -> bool {
        let state = self.state.read().await;
        state.phase == SessionPhase::Connected && state.handle.is_some()
    }

    /// Open the connection if it is not already open
    ///
    /// Runs up to `max_connect_attempts` attempts with a fixed delay
    /// between them. On success the session waits `settle_ms` before
    /// reporting ready. When every attempt fails the session lands in
    /// `Failed` and stays there until the next explicit call.
    pub async fn connect(&self) -> Result<()> {
        {
            let state = self.state.read().await;
            match state.phase {
                SessionPhase::Connected => return Ok(()),
                SessionPhase::Connecting | SessionPhase::Reconnecting => {
                    return Err(PasaListaError::Internal(
                        "a realtime connection attempt is already running".to_string(),
                    ));
                }
                SessionPhase::Disconnected | SessionPhase::Failed => {}
            }
        }
        self.establish(SessionPhase::Connecting).await
    }

    /// Tear down the current connection and build a fresh one
    pub async fn reconnect(&self) -> Result<()> {
        self.teardown().await;
        self.establish(SessionPhase::Reconnecting).await
    }

    /// Close the connection and clear the cached handle
    pub async fn disconnect(&self) {
        self.teardown().await;
        info!("Realtime session disconnected");
    }

    /// Emit the greeting event used when a member is recognized
    pub async fn emit_greeting(&self, payload: Value) -> Result<()> {
        self.emit(EVENT_GREETING, payload).await
    }

    /// Emit an attendance record event
    pub async fn emit_attendance_event(&self, payload: Value) -> Result<()> {
        self.emit(EVENT_ATTENDANCE, payload).await
    }

    async fn emit(&self, event: &str, payload: Value) -> Result<()> {
        let handle = {
            let state = self.state.read().await;
            if state.phase != SessionPhase::Connected {
                return Err(PasaListaError::SessionNotReady(format!(
                    "session is {}",
                    state.phase
                )));
            }
            state.handle.clone().ok_or_else(|| {
                PasaListaError::SessionNotReady("no live transport handle".to_string())
            })?
        };

        if let Err(err) = handle.emit(event, payload).await {
            warn!(event, error = %err, "Realtime emit failed, dropping the connection");
            let mut state = self.state.write().await;
            state.handle = None;
            state.phase = SessionPhase::Disconnected;
            self.phase_tx.send_replace(SessionPhase::Disconnected);
            return Err(err);
        }

        debug!(event, "Realtime event emitted");
        Ok(())
    }

    async fn establish(&self, attempt_phase: SessionPhase) -> Result<()> {
        self.set_phase(attempt_phase).await;

        let max_attempts = self.config.max_connect_attempts.max(1);
        let backoff = Duration::from_millis(self.config.backoff_ms);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            debug!(attempt, max_attempts, "Opening realtime connection");
            match self.transport.connect(&self.credential).await {
                Ok(handle) => {
                    // Let the channel finish its own handshake chatter
                    // before callers start emitting.
                    tokio::time::sleep(Duration::from_millis(self.config.settle_ms)).await;
                    let mut state = self.state.write().await;
                    state.handle = Some(handle);
                    state.phase = SessionPhase::Connected;
                    self.phase_tx.send_replace(SessionPhase::Connected);
                    info!(attempt, "Realtime session connected");
                    return Ok(());
                }
                Err(err) => {
                    warn!(attempt, max_attempts, error = %err, "Realtime connection attempt failed");
                    last_error = Some(err);
                    if attempt < max_attempts {
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
        }

        self.set_phase(SessionPhase::Failed).await;
        error!(attempts = max_attempts, "Realtime session gave up connecting");
        Err(last_error.unwrap_or_else(|| {
            PasaListaError::Network("realtime connection never attempted".to_string())
        }))
    }

    async fn teardown(&self) {
        let handle = {
            let mut state = self.state.write().await;
            state.phase = SessionPhase::Disconnected;
            self.phase_tx.send_replace(SessionPhase::Disconnected);
            state.handle.take()
        };
        if let Some(handle) = handle {
            if let Err(err) = handle.close().await {
                debug!(error = %err, "Error closing previous realtime connection");
            }
        }
    }

    async fn set_phase(&self, phase: SessionPhase) {
        self.state.write().await.phase = phase;
        self.phase_tx.send_replace(phase);
    }
}
