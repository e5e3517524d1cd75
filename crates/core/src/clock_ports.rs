//! Port interface for the school time service
//!
//! The engine never consults the device clock. Every decision about what
//! "today" means comes through this trait, so a skewed phone clock cannot
//! open an attendance window early or mark a weekday as a weekend.

use async_trait::async_trait;
use pasalista_domain::{ClockReading, Result};

/// Trait for obtaining authoritative campus-local time
#[async_trait]
pub trait SchoolClock: Send + Sync {
    /// Current reading with campus-local derived fields
    ///
    /// Implementations return `PasaListaError::ClockUnavailable` when no
    /// trustworthy reading can be produced.
    async fn reading(&self) -> Result<ClockReading>;
}
