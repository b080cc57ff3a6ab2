//! Error types used throughout the SDK

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Nimbus
///
/// Every fallible operation in the workspace reports one of these variants.
/// Nothing in the SDK retries on any of them; retry policy belongs to the
/// caller.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum NimbusError {
    /// Malformed caller input, detected before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The HTTP exchange itself failed (connect, timeout, TLS, body read).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a status the operation does not expect.
    #[error("Unexpected HTTP status {status}: {message}")]
    Http { status: u16, message: String },

    /// The response payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Token acquisition failed or the token was rejected.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The service catalog has no usable endpoint for the requested service.
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// A delete-with-claim failed the server-side ownership check.
    #[error("Claim mismatch: {0}")]
    ClaimMismatch(String),

    /// A polled snapshot carried a different identity than the one awaited.
    #[error("Identity mismatch: expected {expected}, observed {observed}")]
    IdentityMismatch { expected: String, observed: String },

    /// The operation is not valid in the current local state (e.g. a released
    /// claim).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The caller's cancellation signal fired before completion.
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl NimbusError {
    /// True when the caller's cancellation signal ended the operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias for Nimbus operations
pub type Result<T> = std::result::Result<T, NimbusError>;
