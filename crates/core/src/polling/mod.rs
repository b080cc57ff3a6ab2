//! Terminal-state polling
//!
//! Long-running server operations (DNS jobs, load balancer provisioning) are
//! observed by repeatedly fetching a status-bearing snapshot until it reaches
//! a terminal state, the caller cancels, or the server hands back a different
//! resource than the one being waited on.

pub mod poller;
pub mod resources;

pub use poller::{poll_until_terminal, PollOutcome, StatePoller};
pub use resources::PolledResource;
