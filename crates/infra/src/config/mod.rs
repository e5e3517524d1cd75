//! Configuration loading
//!
//! Environment-first loading with file fallback, mirroring how the engine
//! is deployed: school machines carry a `.env` or a `pasalista.toml` next
//! to the binary.

pub mod loader;

pub use loader::{load, load_from_env, load_from_file};
