//! Client configuration structures

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::errors::{NimbusError, Result};

/// Configuration shared by every service client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub identity: IdentityConfig,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub transport: TransportConfig,
    /// Identifies this client to the queue service; generated when absent.
    #[serde(default)]
    pub client_id: Option<Uuid>,
}

/// Where and how to authenticate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Root of the v2.0 identity API, e.g. `https://identity.example.com/v2.0`.
    pub url: String,
    pub username: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

/// Credentials resolved from an [`IdentityConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    ApiKey { username: String, api_key: String },
    Password { username: String, password: String },
}

impl IdentityConfig {
    /// Pick the credential kind; an API key wins over a password.
    ///
    /// # Errors
    /// Returns `NimbusError::Config` if neither secret is set or the
    /// username is empty.
    pub fn credentials(&self) -> Result<Credentials> {
        if self.username.trim().is_empty() {
            return Err(NimbusError::Config("identity username cannot be empty".to_string()));
        }
        match (&self.api_key, &self.password) {
            (Some(api_key), _) => Ok(Credentials::ApiKey {
                username: self.username.clone(),
                api_key: api_key.clone(),
            }),
            (None, Some(password)) => Ok(Credentials::Password {
                username: self.username.clone(),
                password: password.clone(),
            }),
            (None, None) => Err(NimbusError::Config(
                "identity configuration needs an api_key or a password".to_string(),
            )),
        }
    }
}

/// HTTP and polling knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Use the catalog's internal (service network) URLs.
    #[serde(default)]
    pub use_internal_url: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            use_internal_url: false,
        }
    }
}

impl TransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(api_key: Option<&str>, password: Option<&str>) -> IdentityConfig {
        IdentityConfig {
            url: "https://identity.example.com/v2.0".into(),
            username: "demo".into(),
            api_key: api_key.map(str::to_string),
            password: password.map(str::to_string),
            tenant_id: None,
        }
    }

    #[test]
    fn test_api_key_preferred() {
        let creds = identity(Some("key"), Some("pw")).credentials().unwrap();
        assert!(matches!(creds, Credentials::ApiKey { .. }));
    }

    #[test]
    fn test_password_fallback() {
        let creds = identity(None, Some("pw")).credentials().unwrap();
        assert_eq!(creds, Credentials::Password { username: "demo".into(), password: "pw".into() });
    }

    #[test]
    fn test_missing_secret_is_config_error() {
        let err = identity(None, None).credentials().unwrap_err();
        assert!(matches!(err, NimbusError::Config(_)));
    }

    #[test]
    fn test_transport_defaults() {
        let transport = TransportConfig::default();
        assert_eq!(transport.timeout(), Duration::from_secs(30));
        assert_eq!(transport.poll_interval(), Duration::from_secs(1));
        assert!(!transport.use_internal_url);
    }
}
