//! Scoped claim usage with guaranteed release

use std::sync::Arc;

use futures::future::BoxFuture;
use nimbus_domain::{ClaimRequest, QueueName, Result};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::acquire::acquire_claim;
use super::claim::Claim;
use super::ports::MessageQueuePort;

/// Acquire a claim, run `body` with it, and release it on every exit path.
///
/// The release runs whether `body` returns `Ok` or `Err`, and also when
/// `body` already released the claim (the second release is a no-op). It is
/// issued with its own cancellation token so a cancelled `body` still hands
/// its messages back; the HTTP timeout bounds it.
///
/// If `body` fails, its error is returned and a release failure is only
/// logged. If `body` succeeds, a release failure is returned.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use chrono::Duration;
/// # use nimbus_core::{with_claim, CancellationToken, MessageQueuePort};
/// # use nimbus_domain::{ClaimRequest, QueueName, Result};
/// # async fn demo(port: Arc<dyn MessageQueuePort>, queue: QueueName) -> Result<usize> {
/// let cancel = CancellationToken::new();
/// let request = ClaimRequest::new(Duration::seconds(300), Duration::seconds(60)).with_limit(10);
/// with_claim(port, &queue, &request, &cancel, |claim| {
///     Box::pin(async move {
///         for message in claim.messages().to_vec() {
///             claim.delete_message(message.id(), &CancellationToken::new()).await?;
///         }
///         Ok(claim.messages().len())
///     })
/// })
/// .await
/// # }
/// ```
///
/// # Errors
/// Acquisition errors, the body's error, or the release error.
pub async fn with_claim<T, F>(
    port: Arc<dyn MessageQueuePort>,
    queue: &QueueName,
    request: &ClaimRequest,
    cancel: &CancellationToken,
    body: F,
) -> Result<T>
where
    F: for<'c> FnOnce(&'c mut Claim) -> BoxFuture<'c, Result<T>>,
{
    let mut claim = acquire_claim(port, queue, request, cancel).await?;

    let outcome = body(&mut claim).await;
    let released = claim.release(&CancellationToken::new()).await;

    match (outcome, released) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(release_err)) => Err(release_err),
        (Err(body_err), Ok(())) => Err(body_err),
        (Err(body_err), Err(release_err)) => {
            warn!(queue = %queue, error = %release_err, "failed to release claim after error");
            Err(body_err)
        }
    }
}
