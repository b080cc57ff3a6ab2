//! # Nimbus Core
//!
//! Client-side protocol logic - no HTTP or identity code.
//!
//! This crate contains:
//! - The message-claim lease protocol ([`Claim`], [`acquire_claim`],
//!   [`with_claim`], [`delete_message`])
//! - The terminal-state poller used to wait on long-running server
//!   operations ([`StatePoller`], [`poll_until_terminal`])
//! - Port traits the infrastructure layer implements
//!
//! ## Architecture Principles
//! - Only depends on `nimbus-domain`
//! - All network access goes through ports
//! - No internal retries; every error reaches the caller
//! - Every network-issuing operation takes a `CancellationToken`

pub mod claims;
pub mod polling;
pub mod validation;

// Re-export specific items to avoid ambiguity
pub use claims::ports::MessageQueuePort;
pub use claims::{acquire_claim, delete_message, with_claim, Claim};
pub use polling::{poll_until_terminal, PollOutcome, PolledResource, StatePoller};
pub use tokio_util::sync::CancellationToken;
