//! Day-scoped snapshot caching

pub mod cache;
pub mod ports;

pub use cache::SnapshotCache;
pub use ports::*;
