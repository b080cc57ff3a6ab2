//! `{"loadBalancer": ...}` style envelopes

use nimbus_domain::{LoadBalancer, LoadBalancerConfiguration, Node, NodeConfiguration};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoadBalancerEnvelope {
    pub load_balancer: LoadBalancer,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateLoadBalancer<'a> {
    pub load_balancer: &'a LoadBalancerConfiguration,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoadBalancerListing {
    #[serde(default)]
    pub load_balancers: Vec<LoadBalancer>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AddNodes<'a> {
    pub nodes: &'a [NodeConfiguration],
}

#[derive(Debug, Deserialize)]
pub(crate) struct NodeListing {
    #[serde(default)]
    pub nodes: Vec<Node>,
}
