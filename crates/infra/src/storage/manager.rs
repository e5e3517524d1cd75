//! SQLite database manager
//!
//! Owns the connection pool and the schema lifecycle for the slot database.

use std::path::{Path, PathBuf};

use pasalista_domain::{Result, StorageConfig};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::{debug, info};

use crate::errors::InfraError;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Manages SQLite connections and migrations
pub struct DbManager {
    pool: Pool<SqliteConnectionManager>,
    path: PathBuf,
}

impl DbManager {
    /// Open (or create) the database at `path` and apply the schema
    ///
    /// # Errors
    ///
    /// Returns `PasaListaError::Storage` if the pool cannot be built or
    /// the migrations fail.
    pub fn new(path: impl AsRef<Path>, pool_size: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        debug!(path = %path.display(), "Opening slot database");

        let manager = SqliteConnectionManager::file(&path);
        let pool =
            Pool::builder().max_size(pool_size.max(1)).build(manager).map_err(InfraError::from)?;

        let db = Self { pool, path };
        db.run_migrations()?;

        info!(path = %db.path.display(), version = SCHEMA_VERSION, "Slot database ready");
        Ok(db)
    }

    /// Open the database described by the storage configuration
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        Self::new(&config.path, config.pool_size)
    }

    /// Get a pooled connection
    pub fn get_connection(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        let conn = self.pool.get().map_err(InfraError::from)?;
        Ok(conn)
    }

    /// Check the database answers queries
    pub fn health_check(&self) -> Result<bool> {
        let conn = self.get_connection()?;
        let result: i32 =
            conn.query_row("SELECT 1", [], |row| row.get(0)).map_err(InfraError::from)?;
        Ok(result == 1)
    }

    /// Filesystem path of the database
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.get_connection()?;
        conn.execute_batch(SCHEMA_SQL).map_err(InfraError::from)?;
        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version, applied_at)
             VALUES (?1, CAST(strftime('%s','now') AS INTEGER))",
            [SCHEMA_VERSION],
        )
        .map_err(InfraError::from)?;
        Ok(())
    }
}
