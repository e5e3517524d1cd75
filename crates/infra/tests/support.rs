//! Shared helpers for infra integration tests.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use pasalista_core::SchoolClock;
use pasalista_domain::{ClockReading, Result};
use pasalista_infra::storage::DbManager;
use tempfile::TempDir;

/// Install a subscriber once so failing tests come with engine logs.
pub fn init_tracing() {
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("pasalista=debug")
            .with_test_writer()
            .try_init();
    });
}

/// Clock pinned to one instant, for driving the cache deterministically.
pub struct FixedClock {
    reading: ClockReading,
}

impl FixedClock {
    /// Monday 2025-07-07, 08:00 local.
    pub fn monday() -> Arc<Self> {
        Self::at(2025, 7, 7, 8, 0)
    }

    /// Saturday 2025-07-05, 10:00 local.
    pub fn saturday() -> Arc<Self> {
        Self::at(2025, 7, 5, 10, 0)
    }

    pub fn at(y: i32, m: u32, d: u32, hour: u32, minute: u32) -> Arc<Self> {
        let local = Utc
            .with_ymd_and_hms(y, m, d, hour, minute, 0)
            .single()
            .expect("test instant should be unambiguous");
        Arc::new(Self { reading: ClockReading::from_local(&local) })
    }
}

#[async_trait]
impl SchoolClock for FixedClock {
    async fn reading(&self) -> Result<ClockReading> {
        Ok(self.reading)
    }
}

/// Temporary slot database that keeps its directory alive for the test.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new temporary slot database with default pool size.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("slot.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}
