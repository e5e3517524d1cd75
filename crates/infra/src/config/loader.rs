//! Configuration loader
//!
//! Loads engine configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the required variables are missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `PASALISTA_API_BASE_URL`: Attendance backend base URL (required)
//! - `PASALISTA_DB_PATH`: Slot database file path (required)
//! - `PASALISTA_API_TIMEOUT_SECONDS`: HTTP request timeout
//! - `PASALISTA_TIMEZONE`: Campus IANA timezone name
//! - `PASALISTA_REFRESH_HOUR`: Campus-local hour the day refresh fires
//! - `PASALISTA_DB_POOL_SIZE`: Connection pool size
//! - `PASALISTA_SYNC_MAX_RETRIES`: Transient-failure retries per request
//! - `PASALISTA_SYNC_RETRY_DELAY_MS`: Delay between retries
//! - `PASALISTA_REFRESH_DEBOUNCE_MS`: Minimum spacing between day refreshes
//! - `PASALISTA_TICK_INTERVAL_MS`: Schedule evaluation cadence
//! - `PASALISTA_REALTIME_MAX_CONNECT_ATTEMPTS`: Socket connect attempts
//! - `PASALISTA_REALTIME_BACKOFF_MS`: Delay between connect attempts
//! - `PASALISTA_REALTIME_SETTLE_MS`: Post-connect settle delay
//!
//! The campus geofence polygon is file-only; it does not fit an env var.
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./pasalista.json` or `./pasalista.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use pasalista_domain::{
    ApiConfig, CampusConfig, EngineConfig, PasaListaError, RealtimeConfig, Result, StorageConfig,
    SyncConfig,
};

/// Load configuration with automatic fallback strategy
///
/// Reads a `.env` file if one is present, then attempts to load from
/// environment variables. If the required variables are missing, falls
/// back to loading from a config file.
///
/// # Errors
/// Returns `PasaListaError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Validation rejects the loaded values
pub fn load() -> Result<EngineConfig> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(_) => tracing::debug!("No .env file found"),
    }

    // Try loading from environment first
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            // Fall back to file
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The base URL and database path must be present; every other value
/// falls back to its default when unset.
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `PasaListaError::Config` if required variables are missing,
/// values do not parse, or validation rejects the result.
pub fn load_from_env() -> Result<EngineConfig> {
    let defaults = EngineConfig::default();

    let base_url = env_var("PASALISTA_API_BASE_URL")?;
    let db_path = env_var("PASALISTA_DB_PATH")?;

    let config = EngineConfig {
        api: ApiConfig {
            base_url,
            timeout_seconds: env_parse(
                "PASALISTA_API_TIMEOUT_SECONDS",
                defaults.api.timeout_seconds,
            )?,
        },
        campus: CampusConfig {
            timezone: std::env::var("PASALISTA_TIMEZONE").unwrap_or(defaults.campus.timezone),
            refresh_hour: env_parse("PASALISTA_REFRESH_HOUR", defaults.campus.refresh_hour)?,
            geofence: None,
        },
        sync: SyncConfig {
            max_retries: env_parse("PASALISTA_SYNC_MAX_RETRIES", defaults.sync.max_retries)?,
            retry_delay_ms: env_parse(
                "PASALISTA_SYNC_RETRY_DELAY_MS",
                defaults.sync.retry_delay_ms,
            )?,
            refresh_debounce_ms: env_parse(
                "PASALISTA_REFRESH_DEBOUNCE_MS",
                defaults.sync.refresh_debounce_ms,
            )?,
            tick_interval_ms: env_parse(
                "PASALISTA_TICK_INTERVAL_MS",
                defaults.sync.tick_interval_ms,
            )?,
        },
        realtime: RealtimeConfig {
            max_connect_attempts: env_parse(
                "PASALISTA_REALTIME_MAX_CONNECT_ATTEMPTS",
                defaults.realtime.max_connect_attempts,
            )?,
            backoff_ms: env_parse("PASALISTA_REALTIME_BACKOFF_MS", defaults.realtime.backoff_ms)?,
            settle_ms: env_parse("PASALISTA_REALTIME_SETTLE_MS", defaults.realtime.settle_ms)?,
        },
        storage: StorageConfig {
            path: db_path,
            pool_size: env_parse("PASALISTA_DB_POOL_SIZE", defaults.storage.pool_size)?,
        },
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
/// Sections and fields absent from the file keep their defaults.
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `PasaListaError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Validation rejects the loaded values
pub fn load_from_file(path: Option<PathBuf>) -> Result<EngineConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PasaListaError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PasaListaError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PasaListaError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `PasaListaError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<EngineConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PasaListaError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PasaListaError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(PasaListaError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches for config files in the following locations (in order):
/// 1. Current working directory (`./config.{json,toml}`,
///    `./pasalista.{json,toml}`)
/// 2. Parent directories (up to 2 levels)
/// 3. Relative to executable location
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    // Try current working directory
    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("pasalista.json"),
            cwd.join("pasalista.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
            cwd.join("../../config.json"),
            cwd.join("../../config.toml"),
        ]);
    }

    // Try relative to executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("pasalista.json"),
                exe_dir.join("pasalista.toml"),
                exe_dir.join("../config.json"),
                exe_dir.join("../config.toml"),
                exe_dir.join("../../config.json"),
                exe_dir.join("../../config.toml"),
            ]);
        }
    }

    // Return first existing candidate
    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `PasaListaError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        PasaListaError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse an optional environment variable, keeping `default` when unset
///
/// # Errors
/// Returns `PasaListaError::Config` when the variable is set but does not
/// parse.
fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| PasaListaError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: &[&str] = &[
        "PASALISTA_API_BASE_URL",
        "PASALISTA_DB_PATH",
        "PASALISTA_API_TIMEOUT_SECONDS",
        "PASALISTA_TIMEZONE",
        "PASALISTA_REFRESH_HOUR",
        "PASALISTA_DB_POOL_SIZE",
        "PASALISTA_SYNC_MAX_RETRIES",
        "PASALISTA_SYNC_RETRY_DELAY_MS",
        "PASALISTA_REFRESH_DEBOUNCE_MS",
        "PASALISTA_TICK_INTERVAL_MS",
        "PASALISTA_REALTIME_MAX_CONNECT_ATTEMPTS",
        "PASALISTA_REALTIME_BACKOFF_MS",
        "PASALISTA_REALTIME_SETTLE_MS",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_load_from_env_with_required_only() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("PASALISTA_API_BASE_URL", "https://api.example.test");
        std::env::set_var("PASALISTA_DB_PATH", "/tmp/pasalista-test.db");

        let config = load_from_env().expect("required vars suffice");
        assert_eq!(config.api.base_url, "https://api.example.test");
        assert_eq!(config.storage.path, "/tmp/pasalista-test.db");
        // Everything else keeps its default
        assert_eq!(config.campus.timezone, "America/Mexico_City");
        assert_eq!(config.sync.max_retries, 2);

        clear_env();
    }

    #[test]
    fn test_load_from_env_overrides() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("PASALISTA_API_BASE_URL", "https://api.example.test");
        std::env::set_var("PASALISTA_DB_PATH", "/tmp/pasalista-test.db");
        std::env::set_var("PASALISTA_TIMEZONE", "America/Monterrey");
        std::env::set_var("PASALISTA_REFRESH_HOUR", "6");
        std::env::set_var("PASALISTA_DB_POOL_SIZE", "8");
        std::env::set_var("PASALISTA_REALTIME_MAX_CONNECT_ATTEMPTS", "5");

        let config = load_from_env().expect("overrides parse");
        assert_eq!(config.campus.timezone, "America/Monterrey");
        assert_eq!(config.campus.refresh_hour, 6);
        assert_eq!(config.storage.pool_size, 8);
        assert_eq!(config.realtime.max_connect_attempts, 5);

        clear_env();
    }

    #[test]
    fn test_load_from_env_missing_required() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let result = load_from_env();
        assert!(matches!(result, Err(PasaListaError::Config(_))));
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("PASALISTA_API_BASE_URL", "https://api.example.test");
        std::env::set_var("PASALISTA_DB_PATH", "/tmp/pasalista-test.db");
        std::env::set_var("PASALISTA_REFRESH_HOUR", "not-a-number");

        let result = load_from_env();
        assert!(matches!(result, Err(PasaListaError::Config(_))));

        clear_env();
    }

    #[test]
    fn test_load_from_env_validation_enforced() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("PASALISTA_API_BASE_URL", "https://api.example.test");
        std::env::set_var("PASALISTA_DB_PATH", "/tmp/pasalista-test.db");
        std::env::set_var("PASALISTA_REFRESH_HOUR", "24"); // Hours run 0-23

        let result = load_from_env();
        assert!(matches!(result, Err(PasaListaError::Config(_))));

        clear_env();
    }

    fn write_config(contents: &str, extension: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        path
    }

    #[test]
    fn test_load_from_file_toml() {
        let toml_content = r#"
[api]
base_url = "https://api.example.test"
timeout_seconds = 15

[campus]
timezone = "America/Mexico_City"
refresh_hour = 6
geofence = [
    { latitude = 19.43, longitude = -99.13 },
    { latitude = 19.44, longitude = -99.13 },
    { latitude = 19.44, longitude = -99.12 },
]

[storage]
path = "school.db"
pool_size = 2
"#;
        let path = write_config(toml_content, "toml");

        let config = load_from_file(Some(path.clone())).expect("TOML config loads");
        assert_eq!(config.api.base_url, "https://api.example.test");
        assert_eq!(config.api.timeout_seconds, 15);
        assert_eq!(config.campus.refresh_hour, 6);
        assert_eq!(config.campus.geofence.as_ref().map(|g| g.vertices().len()), Some(3));
        assert_eq!(config.storage.path, "school.db");
        // Absent sections keep defaults
        assert_eq!(config.sync.max_retries, 2);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_json() {
        let json_content = r#"{
            "api": { "base_url": "https://api.example.test" },
            "storage": { "path": "school.db" }
        }"#;
        let path = write_config(json_content, "json");

        let config = load_from_file(Some(path.clone())).expect("JSON config loads");
        assert_eq!(config.api.base_url, "https://api.example.test");
        assert_eq!(config.storage.path, "school.db");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/config.json")));

        let err = result.unwrap_err();
        assert!(matches!(err, PasaListaError::Config(_)));
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let path = write_config(r#"{ "this is": "not valid json" "#, "json");

        let result = load_from_file(Some(path.clone()));
        assert!(result.is_err());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_validation_enforced() {
        let toml_content = r#"
[api]
base_url = "https://api.example.test"

[campus]
refresh_hour = 24
"#;
        let path = write_config(toml_content, "toml");

        let result = load_from_file(Some(path.clone()));
        assert!(matches!(result, Err(PasaListaError::Config(_))));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("some content", &PathBuf::from("test.yaml"));
        assert!(result.is_err());
    }
}
