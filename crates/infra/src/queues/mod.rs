//! Queue service client
//!
//! [`QueueClient`] covers queue management and message operations, and
//! implements `nimbus_core::MessageQueuePort` so the claim protocol in
//! `nimbus-core` runs against the real service.

pub mod claims;
pub mod client;
mod wire;

pub use client::{ListMessagesOptions, ListQueuesOptions, QueueClient};
