//! Input validation shared by the claim operations
//!
//! Every check here runs before any network call and fails with
//! `NimbusError::Validation`.

use chrono::Duration;
use nimbus_domain::utils::seconds;
use nimbus_domain::{ClaimRequest, NimbusError, Result};

/// Validate a claim acquisition request.
///
/// # Errors
/// Fails if the limit is zero, the TTL is not strictly positive, the grace
/// period is negative, or either duration has a sub-second part.
pub fn validate_claim_request(request: &ClaimRequest) -> Result<()> {
    if request.limit == Some(0) {
        return Err(NimbusError::Validation(
            "claim limit must be greater than zero".to_string(),
        ));
    }
    ensure_positive("claim ttl", request.ttl)?;
    ensure_whole("claim ttl", request.ttl)?;
    ensure_non_negative("claim grace period", request.grace)?;
    ensure_whole("claim grace period", request.grace)
}

/// Validate a renewal TTL.
///
/// # Errors
/// Fails if `ttl` is negative or has a sub-second part.
pub fn validate_renewal_ttl(ttl: Duration) -> Result<()> {
    ensure_non_negative("claim ttl", ttl)?;
    ensure_whole("claim ttl", ttl)
}

fn ensure_positive(what: &str, value: Duration) -> Result<()> {
    if value <= Duration::zero() {
        return Err(NimbusError::Validation(format!(
            "{what} must be positive, got {}s",
            value.num_seconds()
        )));
    }
    Ok(())
}

// The wire carries whole seconds; anything finer would be truncated.
fn ensure_whole(what: &str, value: Duration) -> Result<()> {
    if !seconds::is_whole(value) {
        return Err(NimbusError::Validation(format!(
            "{what} must be whole seconds, got {}ms",
            value.num_milliseconds()
        )));
    }
    Ok(())
}

fn ensure_non_negative(what: &str, value: Duration) -> Result<()> {
    if value < Duration::zero() {
        return Err(NimbusError::Validation(format!(
            "{what} cannot be negative, got {}s",
            value.num_seconds()
        )));
    }
    Ok(())
}
