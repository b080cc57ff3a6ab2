//! Port interface for the claim endpoints of the queue service

use async_trait::async_trait;
use chrono::Duration;
use nimbus_domain::{ClaimId, ClaimRequest, ClaimSnapshot, MessageId, QueueName, Result};
use tokio_util::sync::CancellationToken;

/// Network operations the claim protocol needs from the queue service.
///
/// Implementations perform exactly one exchange per call, never retry, and
/// return `NimbusError::Cancelled` when `cancel` fires before the exchange
/// completes.
#[async_trait]
pub trait MessageQueuePort: Send + Sync {
    /// Claim up to `request.limit` unclaimed messages.
    ///
    /// Returns `None` when the server reports nothing was available.
    async fn create_claim(
        &self,
        queue: &QueueName,
        request: &ClaimRequest,
        cancel: &CancellationToken,
    ) -> Result<Option<ClaimSnapshot>>;

    /// Fetch the current server view of a claim.
    async fn query_claim(
        &self,
        queue: &QueueName,
        claim: &ClaimId,
        cancel: &CancellationToken,
    ) -> Result<ClaimSnapshot>;

    /// Set a new TTL on a claim; the server resets its age to zero.
    async fn renew_claim(
        &self,
        queue: &QueueName,
        claim: &ClaimId,
        ttl: Duration,
        cancel: &CancellationToken,
    ) -> Result<()>;

    /// Release a claim, making its undeleted messages visible again.
    async fn release_claim(
        &self,
        queue: &QueueName,
        claim: &ClaimId,
        cancel: &CancellationToken,
    ) -> Result<()>;

    /// Delete one message.
    ///
    /// With `claim`, the server deletes only if that claim holds the
    /// message. Without it, the server deletes only if nobody holds it.
    /// Either mismatch is `NimbusError::ClaimMismatch`.
    async fn delete_message(
        &self,
        queue: &QueueName,
        message: &MessageId,
        claim: Option<&ClaimId>,
        cancel: &CancellationToken,
    ) -> Result<()>;
}
