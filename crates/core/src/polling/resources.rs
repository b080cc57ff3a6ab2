//! Resources that can be observed by the poller

use std::fmt::Display;

use nimbus_domain::{DnsJob, LoadBalancer, LoadBalancerId};

/// A remote resource identified by a stable identity.
pub trait PolledResource {
    /// Identity type compared on every fetched snapshot.
    type Id: PartialEq + Display;

    fn resource_id(&self) -> Self::Id;
}

impl PolledResource for DnsJob {
    type Id = String;

    fn resource_id(&self) -> String {
        self.job_id.clone()
    }
}

impl PolledResource for LoadBalancer {
    type Id = LoadBalancerId;

    fn resource_id(&self) -> LoadBalancerId {
        self.id
    }
}
