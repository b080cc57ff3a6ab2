//! # Nimbus Infrastructure
//!
//! HTTP implementations of the Nimbus service clients.
//!
//! This crate contains:
//! - The HTTP transport and the staged request pipeline
//! - Identity (token and service catalog) providers
//! - Queue, DNS and load balancer clients
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `nimbus-core`
//! - Depends on `nimbus-domain` and `nimbus-core`
//! - Contains all I/O

pub mod config;
pub mod context;
pub mod dns;
pub mod errors;
pub mod http;
pub mod identity;
pub mod load_balancers;
pub mod queues;
pub mod session;

// Re-export commonly used items
pub use context::ServiceContext;
pub use dns::{DnsClient, ListDomainsOptions};
pub use errors::InfraError;
pub use http::{ApiRequest, HttpClient, HttpResponse, Pipeline};
pub use identity::{AccessTokenProvider, IdentityClient, StaticTokenProvider};
pub use load_balancers::LoadBalancerClient;
pub use queues::{ListMessagesOptions, ListQueuesOptions, QueueClient};
pub use session::Session;
