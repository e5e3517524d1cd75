//! Snapshot slot repository implementation
//!
//! Persists the daily snapshot and the per-sector process flags as JSON
//! rows in `kv_store`. All rusqlite work runs on blocking threads; the
//! async surface only marshals values.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use pasalista_core::SnapshotStore;
use pasalista_domain::constants::SNAPSHOT_SLOT_KEY;
use pasalista_domain::{
    AttendanceProcessFlag, DailySnapshot, PasaListaError, ProcessKind, Result as DomainResult,
};
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::task;
use tracing::debug;

use crate::errors::InfraError;

use super::manager::DbManager;

/// SQLite-backed snapshot and process-flag slot
pub struct SqliteSnapshotStore {
    db: Arc<DbManager>,
}

impl SqliteSnapshotStore {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn load_snapshot(&self) -> DomainResult<Option<DailySnapshot>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Option<DailySnapshot>> {
            let conn = db.get_connection()?;
            read_json(&conn, SNAPSHOT_SLOT_KEY).map_err(PasaListaError::from)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn save_snapshot(&self, snapshot: &DailySnapshot) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let snapshot = snapshot.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            write_json(&conn, SNAPSHOT_SLOT_KEY, &snapshot).map_err(PasaListaError::from)?;
            debug!(calendar_date = %snapshot.calendar_date, "Snapshot slot replaced");
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn clear_snapshot(&self) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            delete_key(&conn, SNAPSHOT_SLOT_KEY).map_err(PasaListaError::from)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn load_flag(&self, kind: ProcessKind) -> DomainResult<Option<AttendanceProcessFlag>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Option<AttendanceProcessFlag>> {
            let conn = db.get_connection()?;
            read_json(&conn, &kind.storage_key()).map_err(PasaListaError::from)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn save_flag(&self, flag: &AttendanceProcessFlag) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let flag = *flag;

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            write_json(&conn, &flag.kind.storage_key(), &flag).map_err(PasaListaError::from)?;
            debug!(kind = %flag.kind, date = %flag.date, started = flag.started, "Process flag saved");
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

// ============================================================================
// SQL Operations (synchronous)
// ============================================================================

fn read_json<T: DeserializeOwned>(conn: &Connection, key: &str) -> Result<Option<T>, InfraError> {
    let sql = "SELECT value FROM kv_store WHERE key = ?1";

    match conn.query_row(sql, params![key], |row| row.get::<_, String>(0)) {
        Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn write_json<T: Serialize>(conn: &Connection, key: &str, value: &T) -> Result<(), InfraError> {
    let raw = serde_json::to_string(value)?;
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, raw, Utc::now().timestamp()],
    )?;
    Ok(())
}

fn delete_key(conn: &Connection, key: &str) -> Result<(), InfraError> {
    conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
    Ok(())
}

// ============================================================================
// Error Mapping
// ============================================================================

fn map_join_error(err: task::JoinError) -> PasaListaError {
    if err.is_cancelled() {
        PasaListaError::Internal("blocking task cancelled".into())
    } else {
        PasaListaError::Internal(format!("blocking task failed: {err}"))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pasalista_domain::Role;
    use tempfile::TempDir;

    use super::*;

    fn setup_store() -> (SqliteSnapshotStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let manager = DbManager::new(dir.path().join("slot.db"), 2).unwrap();
        (SqliteSnapshotStore::new(Arc::new(manager)), dir)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_empty_slot_loads_none() {
        let (store, _dir) = setup_store();
        assert!(store.load_snapshot().await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_snapshot_round_trip() {
        let (store, _dir) = setup_store();
        let snapshot = DailySnapshot::new(Role::Teacher, date(2025, 7, 7));

        store.save_snapshot(&snapshot).await.unwrap();
        let loaded = store.load_snapshot().await.unwrap().unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_save_replaces_previous_snapshot() {
        let (store, _dir) = setup_store();
        store.save_snapshot(&DailySnapshot::new(Role::Teacher, date(2025, 7, 4))).await.unwrap();
        store.save_snapshot(&DailySnapshot::new(Role::Teacher, date(2025, 7, 7))).await.unwrap();

        let loaded = store.load_snapshot().await.unwrap().unwrap();
        assert_eq!(loaded.calendar_date, date(2025, 7, 7));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_clear_empties_the_slot() {
        let (store, _dir) = setup_store();
        store.save_snapshot(&DailySnapshot::new(Role::Directive, date(2025, 7, 7))).await.unwrap();

        store.clear_snapshot().await.unwrap();
        assert!(store.load_snapshot().await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_clear_on_empty_slot_is_harmless() {
        let (store, _dir) = setup_store();
        store.clear_snapshot().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_flags_are_stored_per_ledger() {
        let (store, _dir) = setup_store();
        let staff = AttendanceProcessFlag {
            kind: ProcessKind::Staff,
            date: date(2025, 7, 7),
            started: true,
        };
        let primary =
            AttendanceProcessFlag::not_started(ProcessKind::PrimaryStudents, date(2025, 7, 7));

        store.save_flag(&staff).await.unwrap();
        store.save_flag(&primary).await.unwrap();

        assert_eq!(store.load_flag(ProcessKind::Staff).await.unwrap().unwrap(), staff);
        assert_eq!(store.load_flag(ProcessKind::PrimaryStudents).await.unwrap().unwrap(), primary);
        assert!(store.load_flag(ProcessKind::SecondaryStudents).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_flag_save_replaces_same_ledger() {
        let (store, _dir) = setup_store();
        let friday = AttendanceProcessFlag {
            kind: ProcessKind::Staff,
            date: date(2025, 7, 4),
            started: true,
        };
        let monday = AttendanceProcessFlag::not_started(ProcessKind::Staff, date(2025, 7, 7));

        store.save_flag(&friday).await.unwrap();
        store.save_flag(&monday).await.unwrap();

        assert_eq!(store.load_flag(ProcessKind::Staff).await.unwrap().unwrap(), monday);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_snapshot_and_flags_do_not_collide() {
        let (store, _dir) = setup_store();
        let snapshot = DailySnapshot::new(Role::Teacher, date(2025, 7, 7));
        let flag = AttendanceProcessFlag {
            kind: ProcessKind::Staff,
            date: date(2025, 7, 7),
            started: true,
        };

        store.save_snapshot(&snapshot).await.unwrap();
        store.save_flag(&flag).await.unwrap();
        store.clear_snapshot().await.unwrap();

        assert_eq!(store.load_flag(ProcessKind::Staff).await.unwrap().unwrap(), flag);
    }
}
