//! DNS service types
//!
//! Domain mutations on the DNS service are asynchronous: the server answers
//! with a [`DnsJob`] that must be polled until it reaches a terminal status.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extensible_enum;

/// Numeric domain identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainId(pub u64);

impl std::fmt::Display for DomainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A DNS domain (zone).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: DomainId,
    pub name: String,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub account_id: Option<u64>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

/// Parameters for creating a domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainConfiguration {
    pub name: String,
    pub email_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// One page of a domain listing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainsPage {
    #[serde(default)]
    pub domains: Vec<Domain>,
    #[serde(default)]
    pub total_entries: Option<u64>,
}

extensible_enum! {
    /// Lifecycle of an asynchronous DNS job
    pub enum DnsJobStatus {
        Initialized => "INITIALIZED",
        Running => "RUNNING",
        Completed => "COMPLETED",
        Error => "ERROR",
    }
}

impl DnsJobStatus {
    /// Completed and Error are final; every other value, known or not, may
    /// still change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// Failure details attached to an `ERROR` job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsJobError {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

/// An asynchronous DNS job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsJob {
    pub job_id: String,
    pub status: DnsJobStatus,
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default)]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub request_url: Option<String>,
    /// Result payload, present once the job completed (with `showDetails`).
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default)]
    pub error: Option<DnsJobError>,
}
