//! Infrastructure error handling
//!
//! External library errors are converted into [`NimbusError`] here so the
//! rest of the crate only ever propagates the domain error.
//!
//! [`NimbusError`]: nimbus_domain::NimbusError

pub mod conversions;

pub use conversions::{status_error, InfraError};
