use std::sync::Arc;
use std::time::Duration;

use nimbus_core::{PollOutcome, StatePoller};
use nimbus_domain::constants::{DEFAULT_POLL_INTERVAL_MS, LOAD_BALANCER_SERVICE_TYPE};
use nimbus_domain::{
    LoadBalancer, LoadBalancerConfiguration, LoadBalancerId, LoadBalancerStatus, NimbusError,
    Node, NodeConfiguration, NodeId, Result,
};
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::wire::{
    AddNodes, CreateLoadBalancer, LoadBalancerEnvelope, LoadBalancerListing, NodeListing,
};
use crate::context::ServiceContext;
use crate::http::{ApiRequest, HttpClient, Pipeline};
use crate::identity::AccessTokenProvider;

/// Client for the load balancer service.
///
/// Mutations are accepted asynchronously; the load balancer passes through
/// `BUILD`/`PENDING_UPDATE`/`PENDING_DELETE` before settling. Use
/// [`wait_for_status_exit`](Self::wait_for_status_exit) to observe that.
#[derive(Debug, Clone)]
pub struct LoadBalancerClient {
    pipeline: Pipeline,
    poll_interval: Duration,
}

impl LoadBalancerClient {
    pub fn new(
        http: HttpClient,
        auth: Arc<dyn AccessTokenProvider>,
        region: Option<String>,
        internal: bool,
    ) -> Self {
        let context = Arc::new(ServiceContext::new(LOAD_BALANCER_SERVICE_TYPE, region, internal));
        Self {
            pipeline: Pipeline::new(http, auth, context),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// # Errors
    /// Any pipeline error.
    pub async fn list_load_balancers(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<LoadBalancer>> {
        let request = ApiRequest::get("loadbalancers").expect_status(&[StatusCode::OK]);
        let listing: LoadBalancerListing = self.pipeline.execute_json(&request, cancel).await?;
        Ok(listing.load_balancers)
    }

    /// # Errors
    /// `NotFound` for an unknown load balancer, or any pipeline error.
    pub async fn get_load_balancer(
        &self,
        id: LoadBalancerId,
        cancel: &CancellationToken,
    ) -> Result<LoadBalancer> {
        let request =
            ApiRequest::get(format!("loadbalancers/{id}")).expect_status(&[StatusCode::OK]);
        let envelope: LoadBalancerEnvelope = self.pipeline.execute_json(&request, cancel).await?;
        Ok(envelope.load_balancer)
    }

    /// Start provisioning a load balancer. The returned snapshot is usually
    /// in `BUILD`.
    ///
    /// # Errors
    /// `Validation` without a virtual IP, or any pipeline error.
    pub async fn create_load_balancer(
        &self,
        configuration: &LoadBalancerConfiguration,
        cancel: &CancellationToken,
    ) -> Result<LoadBalancer> {
        if configuration.virtual_ips.is_empty() {
            return Err(NimbusError::Validation(
                "a load balancer needs at least one virtual IP".into(),
            ));
        }
        let request = ApiRequest::post("loadbalancers")
            .json(&CreateLoadBalancer {
                load_balancer: configuration,
            })?
            .expect_status(&[StatusCode::OK, StatusCode::ACCEPTED]);
        let envelope: LoadBalancerEnvelope = self.pipeline.execute_json(&request, cancel).await?;
        info!(
            load_balancer = %envelope.load_balancer.id,
            status = %envelope.load_balancer.status,
            "load balancer creation accepted"
        );
        Ok(envelope.load_balancer)
    }

    /// # Errors
    /// Any pipeline error.
    pub async fn delete_load_balancer(
        &self,
        id: LoadBalancerId,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let request = ApiRequest::delete(format!("loadbalancers/{id}"))
            .expect_status(&[StatusCode::ACCEPTED, StatusCode::NO_CONTENT]);
        self.pipeline.execute(&request, cancel).await?;
        info!(load_balancer = %id, "load balancer deletion accepted");
        Ok(())
    }

    /// Add back-end nodes; returns the nodes as created by the service.
    ///
    /// # Errors
    /// `Validation` for an empty list, or any pipeline error.
    pub async fn add_nodes(
        &self,
        id: LoadBalancerId,
        nodes: &[NodeConfiguration],
        cancel: &CancellationToken,
    ) -> Result<Vec<Node>> {
        if nodes.is_empty() {
            return Err(NimbusError::Validation("at least one node is required".into()));
        }
        let request = ApiRequest::post(format!("loadbalancers/{id}/nodes"))
            .json(&AddNodes { nodes })?
            .expect_status(&[StatusCode::OK, StatusCode::ACCEPTED]);
        let listing: NodeListing = self.pipeline.execute_json(&request, cancel).await?;
        debug!(load_balancer = %id, added = listing.nodes.len(), "nodes added");
        Ok(listing.nodes)
    }

    /// # Errors
    /// Any pipeline error.
    pub async fn remove_node(
        &self,
        id: LoadBalancerId,
        node: NodeId,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let request = ApiRequest::delete(format!("loadbalancers/{id}/nodes/{node}"))
            .expect_status(&[StatusCode::ACCEPTED, StatusCode::NO_CONTENT]);
        self.pipeline.execute(&request, cancel).await?;
        debug!(load_balancer = %id, node = %node, "node removal accepted");
        Ok(())
    }

    /// Poll until the load balancer's status differs from `status`, e.g.
    /// until it leaves `BUILD`.
    ///
    /// # Errors
    /// `IdentityMismatch` if the service answers with another load
    /// balancer, or any fetch error.
    pub async fn wait_for_status_exit(
        &self,
        id: LoadBalancerId,
        status: &LoadBalancerStatus,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome<LoadBalancer>> {
        self.wait_for_status_exit_with(id, status, |_| {}, cancel).await
    }

    /// [`wait_for_status_exit`](Self::wait_for_status_exit) with a progress
    /// observer.
    ///
    /// # Errors
    /// See [`wait_for_status_exit`](Self::wait_for_status_exit).
    pub async fn wait_for_status_exit_with<'a>(
        &'a self,
        id: LoadBalancerId,
        status: &'a LoadBalancerStatus,
        observer: impl FnMut(&LoadBalancer) + Send + 'a,
        cancel: &'a CancellationToken,
    ) -> Result<PollOutcome<LoadBalancer>> {
        debug!(load_balancer = %id, leaving = %status, "waiting for status change");
        StatePoller::<LoadBalancer>::new(self.poll_interval)
            .with_observer(observer)
            .poll(
                &id,
                || self.get_load_balancer(id, cancel),
                |snapshot: &LoadBalancer| &snapshot.status != status,
                cancel,
            )
            .await
    }

    /// Poll until the load balancer reports `DELETED` or `ERROR`.
    ///
    /// # Errors
    /// As [`wait_for_status_exit`](Self::wait_for_status_exit); a load
    /// balancer the service no longer knows surfaces as `NotFound`.
    pub async fn wait_for_deleted(
        &self,
        id: LoadBalancerId,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome<LoadBalancer>> {
        debug!(load_balancer = %id, "waiting for deletion");
        StatePoller::<LoadBalancer>::new(self.poll_interval)
            .poll(
                &id,
                || self.get_load_balancer(id, cancel),
                |snapshot: &LoadBalancer| {
                    matches!(
                        snapshot.status,
                        LoadBalancerStatus::Deleted | LoadBalancerStatus::Error
                    )
                },
                cancel,
            )
            .await
    }
}
