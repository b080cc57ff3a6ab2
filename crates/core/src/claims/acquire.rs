//! Lease acquisition

use std::sync::Arc;

use nimbus_domain::{ClaimRequest, QueueName, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use super::claim::Claim;
use super::ports::MessageQueuePort;
use crate::validation::validate_claim_request;

/// Claim up to `request.limit` currently unclaimed messages from `queue`.
///
/// The request is validated before anything is sent. On success the claim's
/// age is zero and its messages are exactly what the server returned. When
/// nothing was available the result is an empty claim with no identity.
///
/// The grace period is forwarded to the server and kept on the claim for
/// display; it is not enforced locally.
///
/// # Errors
/// - `Validation` for a zero limit, non-positive TTL or negative grace
/// - transport, status and cancellation errors from the port; no claim
///   exists locally in that case
#[instrument(
    skip(port, cancel),
    fields(queue = %queue, limit = ?request.limit, ttl = request.ttl.num_seconds())
)]
pub async fn acquire_claim(
    port: Arc<dyn MessageQueuePort>,
    queue: &QueueName,
    request: &ClaimRequest,
    cancel: &CancellationToken,
) -> Result<Claim> {
    validate_claim_request(request)?;

    let snapshot = port.create_claim(queue, request, cancel).await?;
    let claim = Claim::acquired(port, queue.clone(), request.ttl, request.grace, snapshot);

    match claim.id() {
        Some(id) => info!(claim = %id, messages = claim.messages().len(), "claim acquired"),
        None => info!("no messages available to claim"),
    }
    Ok(claim)
}
