//! Queue message types
//!
//! [`Message`] is what a producer posts. [`QueuedMessage`] is the read-only
//! snapshot of a message as the server reports it from list, get and claim
//! responses.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::string_id;
use crate::errors::{NimbusError, Result};
use crate::utils::{href::id_from_href, seconds};

string_id!(
    /// Server-assigned message identity
    MessageId
);

/// Outbound message: an opaque body plus its time-to-live.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    #[serde(with = "seconds")]
    ttl: Duration,
    body: Value,
}

impl Message {
    /// Create a message. The time-to-live must be a positive whole number
    /// of seconds.
    ///
    /// # Errors
    /// Returns `NimbusError::Validation` for a zero, negative or fractional
    /// `ttl`.
    pub fn new(ttl: Duration, body: Value) -> Result<Self> {
        if ttl <= Duration::zero() {
            return Err(NimbusError::Validation(format!(
                "message ttl must be positive, got {}s",
                ttl.num_seconds()
            )));
        }
        if !seconds::is_whole(ttl) {
            return Err(NimbusError::Validation(format!(
                "message ttl must be whole seconds, got {}ms",
                ttl.num_milliseconds()
            )));
        }
        Ok(Self { ttl, body })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn body(&self) -> &Value {
        &self.body
    }
}

/// Server-observed message snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QueuedMessageWire", into = "QueuedMessageWire")]
pub struct QueuedMessage {
    id: MessageId,
    href: String,
    ttl: Duration,
    age: Duration,
    body: Value,
}

impl QueuedMessage {
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Elapsed time since the message became visible.
    pub fn age(&self) -> Duration {
        self.age
    }

    pub fn body(&self) -> &Value {
        &self.body
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct QueuedMessageWire {
    href: String,
    #[serde(with = "seconds")]
    ttl: Duration,
    #[serde(with = "seconds")]
    age: Duration,
    #[serde(default)]
    body: Value,
}

impl TryFrom<QueuedMessageWire> for QueuedMessage {
    type Error = NimbusError;

    fn try_from(wire: QueuedMessageWire) -> Result<Self> {
        let id = id_from_href(&wire.href).ok_or_else(|| {
            NimbusError::Decode(format!("message href has no identity: {:?}", wire.href))
        })?;
        Ok(Self {
            id: MessageId::new(id),
            href: wire.href,
            ttl: wire.ttl,
            age: wire.age,
            body: wire.body,
        })
    }
}

impl From<QueuedMessage> for QueuedMessageWire {
    fn from(message: QueuedMessage) -> Self {
        Self {
            href: message.href,
            ttl: message.ttl,
            age: message.age,
            body: message.body,
        }
    }
}

/// Result of a batch post: the identities the server created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessages {
    /// True when the server accepted only part of the batch.
    pub partial: bool,
    pub ids: Vec<MessageId>,
}

/// One page of a message listing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessagesPage {
    pub messages: Vec<QueuedMessage>,
    /// Marker for the next page, when the server reported one.
    pub next_marker: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_message_rejects_non_positive_ttl() {
        assert!(Message::new(Duration::zero(), json!({})).unwrap_err().is_validation());
        assert!(Message::new(Duration::seconds(-5), json!({})).unwrap_err().is_validation());
    }

    #[test]
    fn test_message_rejects_fractional_ttl() {
        let err = Message::new(Duration::milliseconds(500), json!({})).unwrap_err();
        assert!(err.is_validation());
        assert!(Message::new(Duration::milliseconds(1500), json!({})).is_err());
    }

    #[test]
    fn test_message_serializes_ttl_as_seconds() {
        let message =
            Message::new(Duration::seconds(300), json!({"event": "BackupStarted"})).unwrap();
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value, json!({"ttl": 300, "body": {"event": "BackupStarted"}}));
    }

    #[test]
    fn test_queued_message_identity_from_href() {
        let message: QueuedMessage = serde_json::from_value(json!({
            "href": "/v1/queues/demo/messages/50b68a50d6f5b8c8a7c62b01?claim_id=a28ee94e",
            "ttl": 800,
            "age": 790,
            "body": {"event": "ActivateAccount"}
        }))
        .unwrap();

        assert_eq!(message.id().as_str(), "50b68a50d6f5b8c8a7c62b01");
        assert_eq!(message.ttl(), Duration::seconds(800));
        assert_eq!(message.age(), Duration::seconds(790));
        assert_eq!(message.body()["event"], "ActivateAccount");
    }

    #[test]
    fn test_queued_message_without_identity_fails_to_decode() {
        let result: std::result::Result<QueuedMessage, _> =
            serde_json::from_value(json!({"href": "", "ttl": 60, "age": 0, "body": null}));
        assert!(result.is_err());
    }
}
