use std::time::Duration;

use nimbus_domain::constants::{DEFAULT_REQUEST_TIMEOUT_SECS, USER_AGENT};
use nimbus_domain::NimbusError;
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::InfraError;

/// HTTP client with a fixed timeout and cancellation support.
///
/// Requests are sent exactly once; retry policy belongs to the caller.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
}

/// A fully-read HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub url: String,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Decode the body as JSON.
    ///
    /// # Errors
    /// Returns `NimbusError::Decode` if the payload does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, NimbusError> {
        serde_json::from_slice(&self.body).map_err(|err| InfraError::from(err).into())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The `Location` header, if present and valid UTF-8.
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|value| value.to_str().ok())
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    ///
    /// # Errors
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, NimbusError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the request and read the full body.
    ///
    /// Cancellation aborts the in-flight exchange (including the body read)
    /// and yields `NimbusError::Cancelled`.
    ///
    /// # Errors
    /// - `Cancelled` if `cancel` fires first
    /// - `Transport` for connection failures and timeouts
    pub async fn send(
        &self,
        builder: RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, NimbusError> {
        let request = builder.build().map_err(InfraError::from)?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        let exchange = async {
            let response = self.client.execute(request).await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?.to_vec();
            Ok::<_, reqwest::Error>(HttpResponse {
                status,
                headers,
                url: url.to_string(),
                body,
            })
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(%method, %url, "HTTP request cancelled");
                Err(NimbusError::Cancelled)
            }
            result = exchange => match result {
                Ok(response) => {
                    debug!(%method, %url, status = %response.status, "received HTTP response");
                    Ok(response)
                }
                Err(err) => {
                    debug!(%method, %url, error = %err, "HTTP request failed");
                    Err(InfraError::from(err).into())
                }
            }
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: None,
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// # Errors
    /// Returns an error if the underlying reqwest client cannot be built.
    pub fn build(self) -> Result<HttpClient, NimbusError> {
        let mut builder = ReqwestClient::builder()
            .timeout(self.timeout)
            .no_proxy()
            .user_agent(self.user_agent.unwrap_or_else(|| USER_AGENT.to_string()));

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(InfraError::from)?;

        Ok(HttpClient { client })
    }
}
