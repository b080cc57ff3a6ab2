//! Wiring for all service clients from one [`ClientConfig`]

use std::sync::Arc;

use nimbus_domain::{ClientConfig, Result};
use tracing::info;
use uuid::Uuid;

use crate::dns::DnsClient;
use crate::http::HttpClient;
use crate::identity::{AccessTokenProvider, IdentityClient};
use crate::load_balancers::LoadBalancerClient;
use crate::queues::QueueClient;

/// One authenticated account, shared by the service clients it creates.
///
/// Clients created from the same session share the token cache; each
/// client keeps its own base-address cache.
#[derive(Clone)]
pub struct Session {
    config: ClientConfig,
    http: HttpClient,
    auth: Arc<dyn AccessTokenProvider>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity_url", &self.config.identity.url)
            .field("region", &self.config.region)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Build a session that authenticates against the configured identity
    /// service.
    ///
    /// # Errors
    /// `Config` for missing credentials or an HTTP client that cannot be
    /// built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = HttpClient::builder().timeout(config.transport.timeout()).build()?;
        let identity = IdentityClient::new(http.clone(), &config.identity)?;
        info!(identity = %config.identity.url, region = ?config.region, "session created");
        Ok(Self {
            config,
            http,
            auth: Arc::new(identity),
        })
    }

    /// Build a session around an existing token provider.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_provider(config: ClientConfig, auth: Arc<dyn AccessTokenProvider>) -> Result<Self> {
        let http = HttpClient::builder().timeout(config.transport.timeout()).build()?;
        Ok(Self { config, http, auth })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn token_provider(&self) -> Arc<dyn AccessTokenProvider> {
        self.auth.clone()
    }

    /// Queue client using the configured client id, or a fresh one.
    ///
    /// # Errors
    /// `Config` if the client id cannot be sent as a header.
    pub fn queues(&self) -> Result<QueueClient> {
        let client_id = self.config.client_id.unwrap_or_else(Uuid::new_v4);
        QueueClient::new(
            self.http.clone(),
            self.auth.clone(),
            self.config.region.clone(),
            self.config.transport.use_internal_url,
            client_id,
        )
    }

    pub fn dns(&self) -> DnsClient {
        DnsClient::new(
            self.http.clone(),
            self.auth.clone(),
            self.config.region.clone(),
            self.config.transport.use_internal_url,
        )
        .with_poll_interval(self.config.transport.poll_interval())
    }

    pub fn load_balancers(&self) -> LoadBalancerClient {
        LoadBalancerClient::new(
            self.http.clone(),
            self.auth.clone(),
            self.config.region.clone(),
            self.config.transport.use_internal_url,
        )
        .with_poll_interval(self.config.transport.poll_interval())
    }
}
