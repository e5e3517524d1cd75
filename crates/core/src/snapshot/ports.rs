//! Port interfaces for snapshot caching
//!
//! These traits define the boundaries between the cache logic and the
//! storage / network implementations.

use async_trait::async_trait;
use pasalista_domain::{AttendanceProcessFlag, DailySnapshot, ProcessKind, Result, Role};

/// Trait for the durable local slot holding today's snapshot and the
/// per-sector process flags
///
/// The slot is single-occupancy: saving replaces whatever was stored, no
/// history is kept. Implementations report failures as
/// `PasaListaError::Storage`, which the cache treats as fatal.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the stored snapshot, if the slot is occupied
    async fn load_snapshot(&self) -> Result<Option<DailySnapshot>>;

    /// Persist a snapshot, replacing any stored one
    async fn save_snapshot(&self, snapshot: &DailySnapshot) -> Result<()>;

    /// Empty the snapshot slot
    async fn clear_snapshot(&self) -> Result<()>;

    /// Load the stored flag for a process ledger
    async fn load_flag(&self, kind: ProcessKind) -> Result<Option<AttendanceProcessFlag>>;

    /// Persist a process flag, replacing any stored one for its ledger
    async fn save_flag(&self, flag: &AttendanceProcessFlag) -> Result<()>;
}

/// Trait for fetching the daily snapshot from the backend
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch today's snapshot scoped to the given role
    async fn fetch_today(&self, role: Role) -> Result<DailySnapshot>;
}

/// Trait for the remote process status ledger
#[async_trait]
pub trait ProcessStatusSource: Send + Sync {
    /// Fetch the current flag for a process ledger
    async fn fetch_status(&self, kind: ProcessKind) -> Result<AttendanceProcessFlag>;

    /// Report a flag change upstream
    async fn push_status(&self, flag: &AttendanceProcessFlag) -> Result<()>;
}
