//! Local slot storage
//!
//! SQLite-backed persistence for the single "today" snapshot and the
//! per-sector process flags. All values live as JSON in one small
//! key/value table.

pub mod manager;
pub mod snapshot_repository;

pub use manager::DbManager;
pub use snapshot_repository::SqliteSnapshotStore;
