//! Load balancer service types

use serde::{Deserialize, Serialize};

use crate::extensible_enum;

/// Numeric load balancer identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoadBalancerId(pub u64);

impl std::fmt::Display for LoadBalancerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric node identity within a load balancer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

extensible_enum! {
    /// Provisioning state of a load balancer
    pub enum LoadBalancerStatus {
        Active => "ACTIVE",
        Build => "BUILD",
        PendingUpdate => "PENDING_UPDATE",
        PendingDelete => "PENDING_DELETE",
        Suspended => "SUSPENDED",
        Error => "ERROR",
        Deleted => "DELETED",
    }
}

impl LoadBalancerStatus {
    /// States in which the service is still working on the load balancer.
    pub fn is_transitional(&self) -> bool {
        matches!(self, Self::Build | Self::PendingUpdate | Self::PendingDelete)
    }
}

extensible_enum! {
    /// Whether a node receives traffic
    pub enum NodeCondition {
        Enabled => "ENABLED",
        Disabled => "DISABLED",
        Draining => "DRAINING",
    }
}

extensible_enum! {
    /// Traffic distribution algorithm
    pub enum LoadBalancingAlgorithm {
        LeastConnections => "LEAST_CONNECTIONS",
        Random => "RANDOM",
        RoundRobin => "ROUND_ROBIN",
        WeightedLeastConnections => "WEIGHTED_LEAST_CONNECTIONS",
        WeightedRoundRobin => "WEIGHTED_ROUND_ROBIN",
    }
}

extensible_enum! {
    /// Network a virtual IP is exposed on
    pub enum VirtualIpType {
        Public => "PUBLIC",
        ServiceNet => "SERVICENET",
    }
}

/// A back-end node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub address: String,
    pub port: u16,
    pub condition: NodeCondition,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub weight: Option<u32>,
}

/// Parameters for adding a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfiguration {
    pub address: String,
    pub port: u16,
    pub condition: NodeCondition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

/// A virtual IP attached to a load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualIp {
    pub id: u64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(rename = "type")]
    pub ip_type: VirtualIpType,
    #[serde(default)]
    pub ip_version: Option<String>,
}

/// Virtual IP request for a new load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualIpConfiguration {
    #[serde(rename = "type")]
    pub ip_type: VirtualIpType,
}

/// A load balancer snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancer {
    pub id: LoadBalancerId,
    pub name: String,
    pub status: LoadBalancerStatus,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub algorithm: Option<LoadBalancingAlgorithm>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub virtual_ips: Vec<VirtualIp>,
}

/// Parameters for creating a load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerConfiguration {
    pub name: String,
    pub protocol: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<LoadBalancingAlgorithm>,
    pub virtual_ips: Vec<VirtualIpConfiguration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeConfiguration>,
}
