use std::sync::Arc;
use std::time::Duration;

use nimbus_core::{PollOutcome, StatePoller};
use nimbus_domain::constants::{DEFAULT_POLL_INTERVAL_MS, DNS_SERVICE_TYPE};
use nimbus_domain::{
    DnsJob, Domain, DomainConfiguration, DomainId, DomainsPage, NimbusError, Result,
};
use reqwest::StatusCode;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::context::ServiceContext;
use crate::http::{ApiRequest, HttpClient, Pipeline};
use crate::identity::AccessTokenProvider;

/// Filter and paging options for [`DnsClient::list_domains`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListDomainsOptions {
    /// Only domains whose name contains this value.
    pub name: Option<String>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

/// Client for the DNS service.
#[derive(Debug, Clone)]
pub struct DnsClient {
    pipeline: Pipeline,
    poll_interval: Duration,
}

impl DnsClient {
    pub fn new(
        http: HttpClient,
        auth: Arc<dyn AccessTokenProvider>,
        region: Option<String>,
        internal: bool,
    ) -> Self {
        let context = Arc::new(ServiceContext::new(DNS_SERVICE_TYPE, region, internal));
        Self {
            pipeline: Pipeline::new(http, auth, context),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Interval between job status polls.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// # Errors
    /// Any pipeline error.
    pub async fn list_domains(
        &self,
        options: &ListDomainsOptions,
        cancel: &CancellationToken,
    ) -> Result<DomainsPage> {
        let request = ApiRequest::get("domains")
            .query_opt("name", options.name.as_deref())
            .query_opt("offset", options.offset)
            .query_opt("limit", options.limit)
            .expect_status(&[StatusCode::OK]);
        self.pipeline.execute_json(&request, cancel).await
    }

    /// # Errors
    /// `NotFound` for an unknown domain, or any pipeline error.
    pub async fn get_domain(&self, domain: DomainId, cancel: &CancellationToken) -> Result<Domain> {
        let request = ApiRequest::get(format!("domains/{domain}")).expect_status(&[StatusCode::OK]);
        self.pipeline.execute_json(&request, cancel).await
    }

    /// Start creating one or more domains.
    ///
    /// # Errors
    /// `Validation` for an empty batch, or any pipeline error.
    pub async fn create_domains(
        &self,
        domains: &[DomainConfiguration],
        cancel: &CancellationToken,
    ) -> Result<DnsJob> {
        if domains.is_empty() {
            return Err(NimbusError::Validation("at least one domain is required".into()));
        }
        let request = ApiRequest::post("domains")
            .json(&json!({ "domains": domains }))?
            .expect_status(&[StatusCode::ACCEPTED]);
        let job: DnsJob = self.pipeline.execute_json(&request, cancel).await?;
        info!(job = %job.job_id, count = domains.len(), "domain creation accepted");
        Ok(job)
    }

    /// Start deleting a domain.
    ///
    /// # Errors
    /// Any pipeline error.
    pub async fn delete_domain(
        &self,
        domain: DomainId,
        delete_subdomains: bool,
        cancel: &CancellationToken,
    ) -> Result<DnsJob> {
        let request = ApiRequest::delete(format!("domains/{domain}"))
            .query("deleteSubdomains", delete_subdomains)
            .expect_status(&[StatusCode::ACCEPTED]);
        let job: DnsJob = self.pipeline.execute_json(&request, cancel).await?;
        info!(job = %job.job_id, domain = %domain, "domain deletion accepted");
        Ok(job)
    }

    /// Fetch a job's status, including its result payload once complete.
    ///
    /// # Errors
    /// Any pipeline error.
    pub async fn get_job(&self, job_id: &str, cancel: &CancellationToken) -> Result<DnsJob> {
        let request = ApiRequest::get(format!("status/{job_id}"))
            .query("showDetails", true)
            .expect_status(&[StatusCode::OK, StatusCode::ACCEPTED]);
        self.pipeline.execute_json(&request, cancel).await
    }

    /// Poll a job until it is `COMPLETED` or `ERROR`.
    ///
    /// A job ending in `ERROR` is a completed poll; inspect
    /// [`DnsJob::error`].
    ///
    /// # Errors
    /// `IdentityMismatch` if the service answers with another job, or any
    /// fetch error.
    pub async fn wait_for_job(
        &self,
        job: &DnsJob,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome<DnsJob>> {
        self.wait_for_job_with(job, |_| {}, cancel).await
    }

    /// [`wait_for_job`](Self::wait_for_job) with a progress observer that
    /// sees every fetched snapshot.
    ///
    /// # Errors
    /// See [`wait_for_job`](Self::wait_for_job).
    pub async fn wait_for_job_with<'a>(
        &'a self,
        job: &'a DnsJob,
        observer: impl FnMut(&DnsJob) + Send + 'a,
        cancel: &'a CancellationToken,
    ) -> Result<PollOutcome<DnsJob>> {
        debug!(job = %job.job_id, status = %job.status, "waiting for DNS job");
        StatePoller::<DnsJob>::new(self.poll_interval)
            .with_observer(observer)
            .poll(
                &job.job_id,
                || self.get_job(&job.job_id, cancel),
                |snapshot: &DnsJob| snapshot.status.is_terminal(),
                cancel,
            )
            .await
    }
}
