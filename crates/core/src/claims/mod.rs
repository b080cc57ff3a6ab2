//! Message-claim lease protocol
//!
//! A [`Claim`] is a client-held handle on a server-side lease over a set of
//! queue messages. It is acquired with [`acquire_claim`], refreshed and
//! renewed in place, and ended by [`Claim::release`]. [`with_claim`] wraps
//! the whole lifecycle so the claim is released on every exit path.

pub mod acquire;
pub mod claim;
pub mod ports;
pub mod scoped;

pub use acquire::acquire_claim;
pub use claim::{delete_message, Claim};
pub use ports::MessageQueuePort;
pub use scoped::with_claim;
