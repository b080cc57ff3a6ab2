//! The polling loop

use std::future::Future;
use std::time::Duration;

use nimbus_domain::{NimbusError, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::resources::PolledResource;

/// How a poll ended without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<R> {
    /// A terminal snapshot was observed.
    Completed(R),
    /// The cancellation signal fired first.
    Cancelled,
}

impl<R> PollOutcome<R> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The terminal snapshot, if polling completed.
    pub fn completed(self) -> Option<R> {
        match self {
            Self::Completed(resource) => Some(resource),
            Self::Cancelled => None,
        }
    }
}

type Observer<'a, R> = Box<dyn FnMut(&R) + Send + 'a>;

/// Fixed-interval poller with an optional progress observer.
///
/// The interval is constant: no backoff, no jitter. That suits short
/// provisioning waits; many concurrent waiters against one service would
/// want something gentler.
pub struct StatePoller<'a, R> {
    interval: Duration,
    observer: Option<Observer<'a, R>>,
}

impl<'a, R> StatePoller<'a, R>
where
    R: PolledResource,
{
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            observer: None,
        }
    }

    /// Called once per fetched snapshot, terminal one included, before the
    /// terminal check.
    #[must_use]
    pub fn with_observer(mut self, observer: impl FnMut(&R) + Send + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Fetch snapshots of `expected` until `is_terminal` holds or `cancel`
    /// fires.
    ///
    /// Each iteration checks `cancel`, fetches, verifies identity, notifies
    /// the observer, then tests for a terminal state before sleeping.
    /// Cancellation during a fetch does not abort it unless `fetch` itself
    /// honours the token; a fetch that reports `Cancelled` ends the poll the
    /// same way.
    ///
    /// # Errors
    /// - `IdentityMismatch` as soon as a snapshot's identity differs from
    ///   `expected`; polling stops regardless of that snapshot's status
    /// - any other error from `fetch`, unretried
    pub async fn poll<F, Fut, P>(
        mut self,
        expected: &R::Id,
        mut fetch: F,
        is_terminal: P,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome<R>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R>>,
        P: Fn(&R) -> bool,
    {
        let mut attempt: u64 = 0;
        loop {
            if cancel.is_cancelled() {
                debug!(resource = %expected, attempt, "poll cancelled");
                return Ok(PollOutcome::Cancelled);
            }

            attempt += 1;
            let snapshot = match fetch().await {
                Ok(snapshot) => snapshot,
                Err(NimbusError::Cancelled) => return Ok(PollOutcome::Cancelled),
                Err(err) => return Err(err),
            };

            let observed = snapshot.resource_id();
            if &observed != expected {
                warn!(
                    expected = %expected,
                    observed = %observed,
                    "poll observed a different resource"
                );
                return Err(NimbusError::IdentityMismatch {
                    expected: expected.to_string(),
                    observed: observed.to_string(),
                });
            }

            if let Some(observer) = self.observer.as_mut() {
                observer(&snapshot);
            }

            if is_terminal(&snapshot) {
                debug!(resource = %expected, attempt, "poll reached terminal state");
                return Ok(PollOutcome::Completed(snapshot));
            }

            tokio::select! {
                () = cancel.cancelled() => {
                    debug!(resource = %expected, attempt, "poll cancelled while waiting");
                    return Ok(PollOutcome::Cancelled);
                }
                () = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}

/// Poll without an observer. See [`StatePoller::poll`].
///
/// # Errors
/// See [`StatePoller::poll`].
pub async fn poll_until_terminal<R, F, Fut, P>(
    expected: &R::Id,
    fetch: F,
    is_terminal: P,
    interval: Duration,
    cancel: &CancellationToken,
) -> Result<PollOutcome<R>>
where
    R: PolledResource,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<R>>,
    P: Fn(&R) -> bool,
{
    StatePoller::new(interval).poll(expected, fetch, is_terminal, cancel).await
}
