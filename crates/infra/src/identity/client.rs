//! v2.0 identity service client
//!
//! Authenticates with API-key or password credentials and keeps the
//! resulting token and service catalog until the token is close to expiry.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use nimbus_domain::constants::TOKEN_REFRESH_THRESHOLD_SECS;
use nimbus_domain::{Credentials, IdentityConfig, NimbusError, Result, UserAccess};
use parking_lot::RwLock;
use reqwest::header::ACCEPT;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use super::provider::AccessTokenProvider;
use crate::errors::status_error;
use crate::http::HttpClient;

#[derive(Debug, Deserialize)]
struct AuthenticationResponse {
    access: UserAccess,
}

/// Token provider backed by a v2.0 identity service.
///
/// One instance holds one cached [`UserAccess`]; a token within five minutes
/// of expiry is replaced on next use. Two callers refreshing at once both
/// authenticate and the last one stored wins.
pub struct IdentityClient {
    http: HttpClient,
    tokens_url: String,
    credentials: Credentials,
    tenant_id: Option<String>,
    cached: RwLock<Option<UserAccess>>,
}

impl std::fmt::Debug for IdentityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityClient")
            .field("tokens_url", &self.tokens_url)
            .field("tenant_id", &self.tenant_id)
            .finish_non_exhaustive()
    }
}

impl IdentityClient {
    /// # Errors
    /// Returns `NimbusError::Config` if the configuration has no usable
    /// credentials.
    pub fn new(http: HttpClient, config: &IdentityConfig) -> Result<Self> {
        Ok(Self {
            http,
            tokens_url: format!("{}/tokens", config.url.trim_end_matches('/')),
            credentials: config.credentials()?,
            tenant_id: config.tenant_id.clone(),
            cached: RwLock::new(None),
        })
    }

    /// Return the cached access, authenticating first if it is missing or
    /// about to expire.
    ///
    /// # Errors
    /// - `Auth` when the identity service rejects the credentials
    /// - `Transport`, `Decode` or `Cancelled` from the exchange
    pub async fn user_access(&self, cancel: &CancellationToken) -> Result<UserAccess> {
        let threshold = Duration::seconds(TOKEN_REFRESH_THRESHOLD_SECS);
        let cached = self.cached.read().clone();
        if let Some(access) = cached {
            if !access.token.expires_within(threshold, Utc::now()) {
                return Ok(access);
            }
            debug!(expires = %access.token.expires, "access token near expiry, refreshing");
        }

        let access = self.authenticate(cancel).await?;
        *self.cached.write() = Some(access.clone());
        Ok(access)
    }

    async fn authenticate(&self, cancel: &CancellationToken) -> Result<UserAccess> {
        let request = self
            .http
            .request(Method::POST, &self.tokens_url)
            .header(ACCEPT, "application/json")
            .json(&self.request_body());

        let response = self.http.send(request, cancel).await?;
        if !matches!(response.status, StatusCode::OK | StatusCode::NON_AUTHORITATIVE_INFORMATION) {
            return Err(status_error(response.status, &response.url, &response.text()));
        }

        let body: AuthenticationResponse = response.json()?;
        info!(
            expires = %body.access.token.expires,
            services = body.access.service_catalog.len(),
            "authenticated with identity service"
        );
        Ok(body.access)
    }

    fn request_body(&self) -> Value {
        let mut auth = match &self.credentials {
            Credentials::ApiKey { username, api_key } => json!({
                "RAX-KSKEY:apiKeyCredentials": { "username": username, "apiKey": api_key }
            }),
            Credentials::Password { username, password } => json!({
                "passwordCredentials": { "username": username, "password": password }
            }),
        };
        if let (Some(tenant), Some(object)) = (&self.tenant_id, auth.as_object_mut()) {
            object.insert("tenantId".to_string(), Value::String(tenant.clone()));
        }
        json!({ "auth": auth })
    }
}

#[async_trait]
impl AccessTokenProvider for IdentityClient {
    fn invalidate(&self) {
        if self.cached.write().take().is_some() {
            debug!("cached access token invalidated");
        }
    }

    async fn access_token(&self, cancel: &CancellationToken) -> Result<String> {
        Ok(self.user_access(cancel).await?.token.id)
    }

    async fn resolve_base_address(
        &self,
        service_type: &str,
        region: Option<&str>,
        internal: bool,
        cancel: &CancellationToken,
    ) -> Result<Url> {
        let access = self.user_access(cancel).await?;
        let endpoint = access.find_endpoint(service_type, region).ok_or_else(|| {
            NimbusError::Authorization(format!(
                "service catalog has no {service_type} endpoint for region {}",
                region.unwrap_or("<any>")
            ))
        })?;

        let address = if internal {
            endpoint.internal_url.as_deref().ok_or_else(|| {
                NimbusError::Authorization(format!("{service_type} endpoint has no internal URL"))
            })?
        } else {
            endpoint.public_url.as_str()
        };

        Url::parse(address)
            .map_err(|e| NimbusError::Decode(format!("invalid catalog URL {address:?}: {e}")))
    }
}
