//! Configuration loader
//!
//! Loads [`ClientConfig`] from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `NIMBUS_IDENTITY_URL`: identity service root (required)
//! - `NIMBUS_USERNAME`: account user name (required)
//! - `NIMBUS_API_KEY` / `NIMBUS_PASSWORD`: one of the two is required
//! - `NIMBUS_TENANT`: tenant to scope the token to
//! - `NIMBUS_REGION`: region used to pick catalog endpoints
//! - `NIMBUS_TIMEOUT_SECS`: per-request timeout in seconds
//! - `NIMBUS_POLL_INTERVAL_MS`: interval between status polls
//! - `NIMBUS_USE_INTERNAL_URL`: use internal catalog URLs (true/false)
//!
//! ## File Locations
//! The loader probes, in order, `nimbus.{json,toml}` and
//! `config.{json,toml}` in the working directory and its two parents, then
//! the same names next to the executable.

use std::path::{Path, PathBuf};

use nimbus_domain::constants::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_REQUEST_TIMEOUT_SECS};
use nimbus_domain::{ClientConfig, IdentityConfig, NimbusError, Result, TransportConfig};

const CONFIG_FILE_NAMES: [&str; 4] = ["nimbus.json", "nimbus.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `NimbusError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `NimbusError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<ClientConfig> {
    let identity = IdentityConfig {
        url: env_var("NIMBUS_IDENTITY_URL")?,
        username: env_var("NIMBUS_USERNAME")?,
        api_key: env_opt("NIMBUS_API_KEY"),
        password: env_opt("NIMBUS_PASSWORD"),
        tenant_id: env_opt("NIMBUS_TENANT"),
    };
    identity.credentials()?;

    let transport = TransportConfig {
        timeout_secs: env_u64("NIMBUS_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
        poll_interval_ms: env_u64("NIMBUS_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?,
        use_internal_url: env_bool("NIMBUS_USE_INTERNAL_URL", false),
    };

    let config =
        ClientConfig { identity, region: env_opt("NIMBUS_REGION"), transport, client_id: None };
    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `NimbusError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(NimbusError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            NimbusError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| NimbusError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    validate(&config)?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| NimbusError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| NimbusError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(NimbusError::Config(format!("Unsupported config format: {}", extension))),
    }
}

fn validate(config: &ClientConfig) -> Result<()> {
    url::Url::parse(&config.identity.url).map_err(|e| {
        NimbusError::Config(format!("Invalid identity URL {:?}: {}", config.identity.url, e))
    })?;
    config.identity.credentials()?;
    if config.transport.timeout_secs == 0 {
        return Err(NimbusError::Config("timeout_secs must be greater than zero".to_string()));
    }
    if config.transport.poll_interval_ms == 0 {
        return Err(NimbusError::Config("poll_interval_ms must be greater than zero".to_string()));
    }
    Ok(())
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        for dir in [cwd.clone(), cwd.join(".."), cwd.join("../..")] {
            candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| dir.join(name)));
        }
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| NimbusError::Config(format!("Missing required environment variable: {}", key)))
}

/// Optional variable; empty values count as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_u64(key: &str, default: u64) -> Result<u64> {
    match env_opt(key) {
        Some(value) => value
            .parse::<u64>()
            .map_err(|e| NimbusError::Config(format!("Invalid value for {}: {}", key, e))),
        None => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
