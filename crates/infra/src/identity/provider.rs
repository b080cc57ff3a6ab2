use std::collections::HashMap;

use async_trait::async_trait;
use nimbus_domain::{NimbusError, Result};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Trait for providing access tokens and service base addresses
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token
    ///
    /// Implementations refresh the token themselves when it is close to
    /// expiry.
    async fn access_token(&self, cancel: &CancellationToken) -> Result<String>;

    /// Resolve the base address of a service from the service catalog.
    ///
    /// # Errors
    /// Returns `NimbusError::Authorization` when the catalog has no endpoint
    /// for `service_type` in `region`.
    async fn resolve_base_address(
        &self,
        service_type: &str,
        region: Option<&str>,
        internal: bool,
        cancel: &CancellationToken,
    ) -> Result<Url>;

    /// Forget any cached token so the next call obtains a fresh one.
    ///
    /// The pipeline calls this after a service answers 401.
    fn invalidate(&self) {}
}

/// Fixed token with an explicit endpoint map.
///
/// Region and the internal flag are ignored; each service type maps to
/// exactly one address.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
    endpoints: HashMap<String, Url>,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            endpoints: HashMap::new(),
        }
    }

    /// Register the base address for a service type.
    ///
    /// # Errors
    /// Returns `NimbusError::Config` if `address` is not an absolute URL.
    pub fn with_endpoint(
        mut self,
        service_type: impl Into<String>,
        address: &str,
    ) -> Result<Self> {
        let url = Url::parse(address)
            .map_err(|e| NimbusError::Config(format!("invalid endpoint {address:?}: {e}")))?;
        self.endpoints.insert(service_type.into(), url);
        Ok(self)
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self, cancel: &CancellationToken) -> Result<String> {
        if cancel.is_cancelled() {
            return Err(NimbusError::Cancelled);
        }
        Ok(self.token.clone())
    }

    async fn resolve_base_address(
        &self,
        service_type: &str,
        _region: Option<&str>,
        _internal: bool,
        cancel: &CancellationToken,
    ) -> Result<Url> {
        if cancel.is_cancelled() {
            return Err(NimbusError::Cancelled);
        }
        self.endpoints.get(service_type).cloned().ok_or_else(|| {
            NimbusError::Authorization(format!("no endpoint registered for {service_type}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_provider_resolves_registered_service() {
        let provider = StaticTokenProvider::new("token")
            .with_endpoint("rax:dns", "https://dns.example.com/v1.0/1234")
            .unwrap();
        let cancel = CancellationToken::new();

        assert_eq!(provider.access_token(&cancel).await.unwrap(), "token");
        let url =
            provider.resolve_base_address("rax:dns", Some("ORD"), false, &cancel).await.unwrap();
        assert_eq!(url.as_str(), "https://dns.example.com/v1.0/1234");

        let err =
            provider.resolve_base_address("rax:queues", None, false, &cancel).await.unwrap_err();
        assert!(matches!(err, NimbusError::Authorization(_)));
    }

    #[test]
    fn static_provider_rejects_relative_endpoint() {
        let err = StaticTokenProvider::new("token").with_endpoint("rax:dns", "/v1.0").unwrap_err();
        assert!(matches!(err, NimbusError::Config(_)));
    }

    #[tokio::test]
    async fn static_provider_honours_cancellation() {
        let provider = StaticTokenProvider::new("token");
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(provider.access_token(&cancel).await.unwrap_err(), NimbusError::Cancelled);
    }
}
