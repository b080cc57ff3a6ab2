//! DNS service client
//!
//! Domain mutations return a [`DnsJob`](nimbus_domain::DnsJob);
//! [`DnsClient::wait_for_job`] polls it to completion.

pub mod client;

pub use client::{DnsClient, ListDomainsOptions};
