//! The claim handle and its lease operations

use std::sync::Arc;

use chrono::Duration;
use nimbus_domain::{
    ClaimId, ClaimSnapshot, MessageId, NimbusError, QueueName, QueuedMessage, Result,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::ports::MessageQueuePort;
use crate::validation::validate_renewal_ttl;

/// A time-bounded, renewable, releasable lease over a set of messages.
///
/// # State
///
/// ```text
/// [Acquired] --renew/query--> [Acquired]
/// [Acquired] --release------> [Released]   (terminal)
/// [Released] --release------> [Released]   (no-op)
/// [Released] --renew/query--> error
/// ```
///
/// A claim acquired when nothing was available has no identity and no
/// messages; renew and release on it are no-ops and query fails.
///
/// # Concurrency
///
/// Lease operations take `&mut self`, so a single claim is serialized by
/// the borrow checker. Callers that share a claim across tasks must wrap it
/// in their own lock; two different claims never need coordination.
///
/// Dropping a claim that still holds a lease does not release it. Use
/// [`Claim::release`] or [`super::with_claim`].
pub struct Claim {
    port: Arc<dyn MessageQueuePort>,
    queue: QueueName,
    id: Option<ClaimId>,
    ttl: Duration,
    age: Duration,
    grace: Duration,
    messages: Vec<QueuedMessage>,
    released: bool,
}

impl Claim {
    /// Build the handle from the server's answer to a claim request.
    ///
    /// `snapshot == None` means nothing was available to claim. Age always
    /// starts at zero.
    pub(crate) fn acquired(
        port: Arc<dyn MessageQueuePort>,
        queue: QueueName,
        ttl: Duration,
        grace: Duration,
        snapshot: Option<ClaimSnapshot>,
    ) -> Self {
        let (id, messages) = match snapshot {
            Some(snapshot) => (Some(snapshot.id), snapshot.messages),
            None => (None, Vec::new()),
        };
        Self {
            port,
            queue,
            id,
            ttl,
            age: Duration::zero(),
            grace,
            messages,
            released: false,
        }
    }

    /// Claim identity; `None` when nothing was available to claim.
    pub fn id(&self) -> Option<&ClaimId> {
        self.id.as_ref()
    }

    pub fn queue(&self) -> &QueueName {
        &self.queue
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn age(&self) -> Duration {
        self.age
    }

    /// Grace period requested at acquisition. Kept for display only; the
    /// server enforces it.
    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Messages held as of the last acquisition or query.
    pub fn messages(&self) -> &[QueuedMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Refresh messages, TTL and age from the server.
    ///
    /// The local snapshot is replaced only after the whole response has been
    /// decoded.
    ///
    /// # Errors
    /// - `InvalidState` if the claim was released or has no identity
    /// - any error from the port (transport, not found, cancelled)
    #[instrument(skip(self, cancel), fields(queue = %self.queue, claim = ?self.id))]
    pub async fn query(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.ensure_not_released("query")?;
        let id = self.id.as_ref().ok_or_else(|| {
            NimbusError::InvalidState("cannot query a claim that holds no messages".to_string())
        })?;

        let snapshot = self.port.query_claim(&self.queue, id, cancel).await?;
        if &snapshot.id != id {
            return Err(NimbusError::IdentityMismatch {
                expected: id.to_string(),
                observed: snapshot.id.to_string(),
            });
        }

        debug!(
            messages = snapshot.messages.len(),
            ttl = snapshot.ttl.num_seconds(),
            "claim refreshed"
        );
        self.ttl = snapshot.ttl;
        self.age = snapshot.age;
        self.messages = snapshot.messages;
        Ok(())
    }

    /// Set a new TTL; the server resets the claim's age to zero.
    ///
    /// A claim without identity has nothing to renew and returns `Ok`.
    ///
    /// # Errors
    /// - `InvalidState` if the claim was released
    /// - `Validation` if `ttl` is negative
    /// - any error from the port; `NotFound` means the lease already expired
    #[instrument(
        skip(self, cancel),
        fields(queue = %self.queue, claim = ?self.id, ttl = ttl.num_seconds())
    )]
    pub async fn renew(&mut self, ttl: Duration, cancel: &CancellationToken) -> Result<()> {
        self.ensure_not_released("renew")?;
        validate_renewal_ttl(ttl)?;
        let Some(id) = self.id.as_ref() else {
            debug!("claim holds no messages; nothing to renew");
            return Ok(());
        };

        self.port.renew_claim(&self.queue, id, ttl, cancel).await?;
        self.ttl = ttl;
        self.age = Duration::zero();
        info!("claim renewed");
        Ok(())
    }

    /// Release the claim. Idempotent.
    ///
    /// The first successful call makes one network request; later calls
    /// return `Ok` without touching the network. A lease the server already
    /// expired (`NotFound`) counts as released. On any other failure the
    /// claim stays unreleased so the caller may try again.
    ///
    /// # Errors
    /// Transport, status and cancellation errors from the port.
    #[instrument(skip(self, cancel), fields(queue = %self.queue, claim = ?self.id))]
    pub async fn release(&mut self, cancel: &CancellationToken) -> Result<()> {
        if self.released {
            debug!("claim already released");
            return Ok(());
        }
        let Some(id) = self.id.as_ref() else {
            self.released = true;
            return Ok(());
        };

        match self.port.release_claim(&self.queue, id, cancel).await {
            Ok(()) => info!("claim released"),
            Err(NimbusError::NotFound(_)) => info!("claim already expired on the server"),
            Err(err) => return Err(err),
        }
        self.released = true;
        Ok(())
    }

    /// Delete one of this claim's messages, verified against the claim.
    ///
    /// # Errors
    /// See [`delete_message`].
    pub async fn delete_message(
        &self,
        message: &MessageId,
        cancel: &CancellationToken,
    ) -> Result<()> {
        delete_message(self.port.as_ref(), &self.queue, message, Some(self), cancel).await
    }

    fn ensure_not_released(&self, operation: &str) -> Result<()> {
        if self.released {
            return Err(NimbusError::InvalidState(format!("cannot {operation} a released claim")));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Claim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Claim")
            .field("queue", &self.queue)
            .field("id", &self.id)
            .field("ttl", &self.ttl)
            .field("age", &self.age)
            .field("grace", &self.grace)
            .field("messages", &self.messages.len())
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        if !self.released {
            if let Some(id) = &self.id {
                warn!(
                    queue = %self.queue,
                    claim = %id,
                    "claim dropped without release; messages stay locked until its ttl elapses"
                );
            }
        }
    }
}

/// Delete a message, optionally verifying ownership through a claim.
///
/// With `claim`, the server deletes the message only if that exact claim
/// holds it. Without one, deletion only succeeds for a message nobody holds.
/// A claim without identity holds nothing, so passing one fails locally.
///
/// # Errors
/// - `InvalidState` if `claim` was released
/// - `ClaimMismatch` if the ownership check fails
/// - transport, status and cancellation errors from the port
#[instrument(skip(port, claim, cancel), fields(queue = %queue, message = %message))]
pub async fn delete_message(
    port: &dyn MessageQueuePort,
    queue: &QueueName,
    message: &MessageId,
    claim: Option<&Claim>,
    cancel: &CancellationToken,
) -> Result<()> {
    let claim_id = match claim {
        Some(claim) => {
            claim.ensure_not_released("delete through")?;
            let id = claim.id().ok_or_else(|| {
                NimbusError::ClaimMismatch(format!(
                    "message {message} is not held by an empty claim"
                ))
            })?;
            Some(id)
        }
        None => None,
    };

    port.delete_message(queue, message, claim_id, cancel).await?;
    debug!(claimed = claim_id.is_some(), "message deleted");
    Ok(())
}
