//! Domain types and models
//!
//! Wire shapes for every service the SDK talks to. Types that carry an
//! identity extracted from a resource locator deserialize through a private
//! wire struct so the identity is resolved exactly once.

pub mod claim;
pub mod dns;
pub mod identity;
pub mod load_balancer;
pub mod message;
pub mod queue;

pub use claim::{ClaimBody, ClaimId, ClaimRequest, ClaimSnapshot};
pub use dns::{
    DnsJob, DnsJobError, DnsJobStatus, Domain, DomainConfiguration, DomainId, DomainsPage,
};
pub use identity::{AccessToken, Endpoint, ServiceCatalogEntry, Tenant, UserAccess};
pub use load_balancer::{
    LoadBalancer, LoadBalancerConfiguration, LoadBalancerId, LoadBalancerStatus,
    LoadBalancingAlgorithm, Node, NodeCondition, NodeConfiguration, NodeId, VirtualIp,
    VirtualIpConfiguration, VirtualIpType,
};
pub use message::{Message, MessageId, MessagesPage, PostedMessages, QueuedMessage};
pub use queue::{
    HomeDocument, MessageAgeStatistics, MessageStatistics, Queue, QueueName, QueueStatistics,
    QueuesPage,
};

/// Declares a string-backed identifier newtype.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

pub(crate) use string_id;
