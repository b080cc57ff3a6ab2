//! Conversions from external infrastructure errors into domain errors.

use nimbus_domain::NimbusError;
use reqwest::Error as HttpError;
use reqwest::StatusCode;
use serde_json::Error as JsonError;
use thiserror::Error;
use url::ParseError as UrlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct InfraError(pub NimbusError);

impl From<InfraError> for NimbusError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<NimbusError> for InfraError {
    fn from(value: NimbusError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoNimbusError {
    fn into_nimbus(self) -> NimbusError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → NimbusError */
/* -------------------------------------------------------------------------- */

impl IntoNimbusError for HttpError {
    fn into_nimbus(self) -> NimbusError {
        if self.is_timeout() {
            return NimbusError::Transport("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return NimbusError::Transport(format!("HTTP connection failure: {self}"));
        }

        if self.is_decode() {
            return NimbusError::Decode(self.to_string());
        }

        if self.is_builder() {
            return NimbusError::Internal(format!("invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            return status_error(status, self.url().map_or("", |u| u.as_str()), "");
        }

        NimbusError::Transport(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_nimbus())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → NimbusError */
/* -------------------------------------------------------------------------- */

impl IntoNimbusError for JsonError {
    fn into_nimbus(self) -> NimbusError {
        NimbusError::Decode(format!("invalid JSON payload: {self}"))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_nimbus())
    }
}

/* -------------------------------------------------------------------------- */
/* url::ParseError → NimbusError */
/* -------------------------------------------------------------------------- */

impl IntoNimbusError for UrlError {
    fn into_nimbus(self) -> NimbusError {
        NimbusError::Config(format!("invalid service URL: {self}"))
    }
}

impl From<UrlError> for InfraError {
    fn from(value: UrlError) -> Self {
        InfraError(value.into_nimbus())
    }
}

/* -------------------------------------------------------------------------- */
/* Unexpected status codes */
/* -------------------------------------------------------------------------- */

/// Map a status the operation did not expect into a domain error.
pub fn status_error(status: StatusCode, url: &str, body: &str) -> NimbusError {
    let message = if body.is_empty() {
        format!("{url} returned status {status}")
    } else {
        format!("{url} returned status {status}: {body}")
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => NimbusError::Auth(message),
        StatusCode::NOT_FOUND => NimbusError::NotFound(message),
        _ => NimbusError::Http {
            status: status.as_u16(),
            message,
        },
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
