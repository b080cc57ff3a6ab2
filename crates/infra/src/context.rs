//! Per-client resolution state
//!
//! Each service client owns one [`ServiceContext`]. The base address is
//! resolved from the identity provider on first use and then reused; the
//! queue client additionally keeps the service's home document here.
//! Both slots are write-once with no invalidation. Concurrent first uses
//! may both resolve; the values are identical so the last write wins.

use std::sync::Arc;

use nimbus_domain::{HomeDocument, Result};
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::identity::AccessTokenProvider;

/// Lazily populated caches for one service client.
#[derive(Debug)]
pub struct ServiceContext {
    service_type: String,
    region: Option<String>,
    internal: bool,
    base_address: RwLock<Option<Url>>,
    home_document: RwLock<Option<Arc<HomeDocument>>>,
}

impl ServiceContext {
    pub fn new(service_type: impl Into<String>, region: Option<String>, internal: bool) -> Self {
        Self {
            service_type: service_type.into(),
            region,
            internal,
            base_address: RwLock::new(None),
            home_document: RwLock::new(None),
        }
    }

    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// The cached base address, if it has been resolved.
    pub fn cached_base_address(&self) -> Option<Url> {
        self.base_address.read().clone()
    }

    /// Resolve the base address through `auth` once and cache it.
    ///
    /// # Errors
    /// Propagates the provider's error; nothing is cached on failure.
    pub async fn base_address(
        &self,
        auth: &dyn AccessTokenProvider,
        cancel: &CancellationToken,
    ) -> Result<Url> {
        if let Some(url) = self.cached_base_address() {
            return Ok(url);
        }

        let url = auth
            .resolve_base_address(&self.service_type, self.region.as_deref(), self.internal, cancel)
            .await?;
        debug!(service = %self.service_type, base = %url, "resolved service base address");
        *self.base_address.write() = Some(url.clone());
        Ok(url)
    }

    pub fn cached_home_document(&self) -> Option<Arc<HomeDocument>> {
        self.home_document.read().clone()
    }

    pub fn store_home_document(&self, document: HomeDocument) -> Arc<HomeDocument> {
        let document = Arc::new(document);
        *self.home_document.write() = Some(document.clone());
        document
    }
}
