//! Claim (lease) types

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::message::QueuedMessage;
use super::string_id;
use crate::errors::{NimbusError, Result};
use crate::utils::{href::id_from_href, seconds};

string_id!(
    /// Server-assigned claim identity
    ClaimId
);

/// Parameters for claiming messages from a queue.
///
/// Fields are plain values; they are validated when the claim is acquired so
/// that a bad request fails before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimRequest {
    /// Maximum number of messages to claim. `None` lets the server choose.
    pub limit: Option<u32>,
    /// How long the server holds the claim.
    pub ttl: Duration,
    /// Extra lifetime granted to claimed messages whose own TTL would expire
    /// while the claim is still held.
    pub grace: Duration,
}

impl ClaimRequest {
    pub fn new(ttl: Duration, grace: Duration) -> Self {
        Self {
            limit: None,
            ttl,
            grace,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Request body for claim creation and renewal.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ClaimBody {
    #[serde(with = "seconds")]
    pub ttl: Duration,
    #[serde(with = "seconds::option", skip_serializing_if = "Option::is_none")]
    pub grace: Option<Duration>,
}

/// Server view of a claim: identity, timing, and the messages it holds.
///
/// A snapshot always has an identity; "nothing to claim" is represented by
/// the absence of a snapshot, never by a snapshot without one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ClaimDocument")]
pub struct ClaimSnapshot {
    pub id: ClaimId,
    #[serde(with = "seconds")]
    pub ttl: Duration,
    #[serde(with = "seconds")]
    pub age: Duration,
    pub messages: Vec<QueuedMessage>,
}

/// `GET .../claims/{id}` response body.
#[derive(Debug, Deserialize)]
struct ClaimDocument {
    href: String,
    #[serde(with = "seconds")]
    ttl: Duration,
    #[serde(with = "seconds")]
    age: Duration,
    #[serde(default)]
    messages: Vec<QueuedMessage>,
}

impl TryFrom<ClaimDocument> for ClaimSnapshot {
    type Error = NimbusError;

    fn try_from(document: ClaimDocument) -> Result<Self> {
        let id = id_from_href(&document.href).ok_or_else(|| {
            NimbusError::Decode(format!("claim href has no identity: {:?}", document.href))
        })?;
        Ok(Self {
            id: ClaimId::new(id),
            ttl: document.ttl,
            age: document.age,
            messages: document.messages,
        })
    }
}
