//! Attendance window states presented to the interface layer

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// The nine mutually exclusive attendance window states
///
/// Exactly one holds at any instant; the evaluation order that guarantees
/// this lives with the evaluator, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceState {
    Event,
    Syncing,
    Loading,
    NotAvailable,
    Preparing,
    Pending,
    Closed,
    InProcess,
    Available,
}

impl_domain_status_conversions!(AttendanceState {
    Event => "event",
    Syncing => "syncing",
    Loading => "loading",
    NotAvailable => "not_available",
    Preparing => "preparing",
    Pending => "pending",
    Closed => "closed",
    InProcess => "in_process",
    Available => "available",
});

/// Derived attendance status: the state plus presentation metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceStatus {
    pub state: AttendanceState,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining: Option<String>,
    pub progress: u8,
    pub action_enabled: bool,
}

impl AttendanceStatus {
    /// Status with no metadata beyond the state and its description
    pub fn plain(state: AttendanceState, description: impl Into<String>) -> Self {
        Self {
            state,
            description: description.into(),
            remaining: None,
            progress: 0,
            action_enabled: false,
        }
    }
}
