//! Queue types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::MAX_QUEUE_NAME_LENGTH;
use crate::errors::{NimbusError, Result};

/// Validated queue name.
///
/// Names are 1-64 characters of ASCII letters, digits, `_` and `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QueueName(String);

impl QueueName {
    /// # Errors
    /// Returns `NimbusError::Validation` for an empty, over-long or
    /// otherwise malformed name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(NimbusError::Validation("queue name cannot be empty".to_string()));
        }
        if name.len() > MAX_QUEUE_NAME_LENGTH {
            return Err(NimbusError::Validation(format!(
                "queue name exceeds {MAX_QUEUE_NAME_LENGTH} characters: {name}"
            )));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(NimbusError::Validation(format!(
                "queue name may only contain letters, digits, '_' and '-': {name}"
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueueName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for QueueName {
    type Error = NimbusError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for QueueName {
    type Error = NimbusError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<QueueName> for String {
    fn from(name: QueueName) -> Self {
        name.0
    }
}

/// Queue snapshot as reported by a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Queue {
    pub name: QueueName,
    pub href: String,
    /// Present only for detailed listings.
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// One page of a queue listing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueuesPage {
    pub queues: Vec<Queue>,
    pub next_marker: Option<String>,
}

/// `GET .../queues/{name}/stats` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatistics {
    pub messages: MessageStatistics,
}

/// Message counters for a queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageStatistics {
    pub claimed: u64,
    pub free: u64,
    pub total: u64,
    #[serde(default)]
    pub oldest: Option<MessageAgeStatistics>,
    #[serde(default)]
    pub newest: Option<MessageAgeStatistics>,
}

/// Age summary of the oldest or newest message in a queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAgeStatistics {
    pub href: String,
    pub age: i64,
    pub created: String,
}

/// The service's capability ("home") document.
///
/// Only the resource relations are modelled; the raw document is kept for
/// callers that need the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeDocument {
    #[serde(default)]
    pub resources: BTreeMap<String, Value>,
}

impl HomeDocument {
    /// Whether the service advertises a resource relation, matched by its
    /// trailing name (e.g. `queues` for `rel/queues`).
    pub fn supports(&self, relation: &str) -> bool {
        self.resources.keys().any(|key| key == relation || key.ends_with(&format!("/{relation}")))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_queue_name_validation() {
        assert!(QueueName::new("fizbit").is_ok());
        assert!(QueueName::new("orders_2024-q1").is_ok());
        assert!(QueueName::new("").unwrap_err().is_validation());
        assert!(QueueName::new("has space").unwrap_err().is_validation());
        assert!(QueueName::new("a".repeat(65)).unwrap_err().is_validation());
        assert!(QueueName::new("a".repeat(64)).is_ok());
    }

    #[test]
    fn test_queue_name_deserialization_validates() {
        let parsed: std::result::Result<QueueName, _> = serde_json::from_value(json!("bad/name"));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_home_document_supports_relation() {
        let home: HomeDocument = serde_json::from_value(json!({
            "resources": {
                "rel/queues": {"href-template": "/v1/queues{?marker,limit,detailed}"},
                "rel/claim": {"href-template": "/v1/queues/{queue_name}/claims{?limit}"}
            }
        }))
        .unwrap();

        assert!(home.supports("queues"));
        assert!(home.supports("claim"));
        assert!(!home.supports("post_message"));
    }
}
