//! Shared helpers for `nimbus-infra` integration tests.
//!
//! Every client is pointed at a wiremock server through a
//! [`StaticTokenProvider`], so tests exercise the real pipeline without an
//! identity service.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use nimbus_domain::constants::{DNS_SERVICE_TYPE, LOAD_BALANCER_SERVICE_TYPE, QUEUES_SERVICE_TYPE};
use nimbus_infra::{DnsClient, HttpClient, LoadBalancerClient, QueueClient, StaticTokenProvider};
use uuid::Uuid;
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";
pub const TENANT_PATH: &str = "/v1/123456";

pub fn provider(server: &MockServer) -> Arc<StaticTokenProvider> {
    let base = format!("{}{}", server.uri(), TENANT_PATH);
    Arc::new(
        StaticTokenProvider::new(TOKEN)
            .with_endpoint(QUEUES_SERVICE_TYPE, &base)
            .and_then(|p| p.with_endpoint(DNS_SERVICE_TYPE, &base))
            .and_then(|p| p.with_endpoint(LOAD_BALANCER_SERVICE_TYPE, &base))
            .expect("valid endpoints"),
    )
}

pub fn http() -> HttpClient {
    HttpClient::builder().timeout(Duration::from_secs(5)).build().expect("http client")
}

pub fn queue_client(server: &MockServer, client_id: Uuid) -> Arc<QueueClient> {
    let client = QueueClient::new(http(), provider(server), None, false, client_id);
    Arc::new(client.expect("queue client"))
}

pub fn dns_client(server: &MockServer) -> DnsClient {
    DnsClient::new(http(), provider(server), None, false)
        .with_poll_interval(Duration::from_millis(10))
}

pub fn lb_client(server: &MockServer) -> LoadBalancerClient {
    LoadBalancerClient::new(http(), provider(server), None, false)
        .with_poll_interval(Duration::from_millis(10))
}

/// Path under the tenant prefix.
pub fn tenant(path: &str) -> String {
    format!("{TENANT_PATH}/{}", path.trim_start_matches('/'))
}

/// Route `tracing` output through the test harness; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
