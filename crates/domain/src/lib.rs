//! # Nimbus Domain
//!
//! Wire types and models shared by every Nimbus crate.
//!
//! This crate contains:
//! - Queue, message and claim data types
//! - DNS domain/job and load balancer data types
//! - Identity (token and service catalog) data types
//! - Domain error types and Result definitions
//! - Client configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other Nimbus crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::href::{id_from_href, query_param_from_href};

#[doc(hidden)]
pub mod __private {
    pub use serde;
}
