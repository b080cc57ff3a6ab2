//! Request pipeline shared by the service clients
//!
//! Every call runs the same four stages, each returning `Result`:
//!
//! 1. [`Pipeline::authenticate`] - bearer token and service base address
//! 2. [`Pipeline::build`] - method, URL, headers and optional JSON body
//! 3. [`Pipeline::send`] - one cancellable HTTP exchange
//! 4. [`Pipeline::parse`] - status check against the expected set
//!
//! [`Pipeline::execute`] runs them in order; clients decode the payload with
//! [`HttpResponse::json`] or [`Pipeline::execute_json`].

use std::sync::Arc;

use nimbus_domain::{NimbusError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::client::{HttpClient, HttpResponse};
use crate::context::ServiceContext;
use crate::errors::{status_error, InfraError};
use crate::identity::AccessTokenProvider;

/// One API call, relative to the service base address.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    expected: Vec<StatusCode>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            expected: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn head(path: impl Into<String>) -> Self {
        Self::new(Method::HEAD, path)
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Add a query parameter only when `value` is present.
    #[must_use]
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    /// Returns `NimbusError::Internal` if `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| NimbusError::Internal(format!("failed to encode request body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Statuses accepted by [`Pipeline::parse`]. Without this, any 2xx is
    /// accepted.
    #[must_use]
    pub fn expect_status(mut self, statuses: &[StatusCode]) -> Self {
        self.expected = statuses.to_vec();
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn accepts(&self, status: StatusCode) -> bool {
        if self.expected.is_empty() {
            status.is_success()
        } else {
            self.expected.contains(&status)
        }
    }
}

/// Output of the authenticate stage.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub token: String,
    pub base_address: Url,
}

/// The staged request pipeline for one service client.
#[derive(Clone)]
pub struct Pipeline {
    http: HttpClient,
    auth: Arc<dyn AccessTokenProvider>,
    context: Arc<ServiceContext>,
    headers: HeaderMap,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("service", &self.context.service_type())
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(
        http: HttpClient,
        auth: Arc<dyn AccessTokenProvider>,
        context: Arc<ServiceContext>,
    ) -> Self {
        Self {
            http,
            auth,
            context,
            headers: HeaderMap::new(),
        }
    }

    /// Add a header sent with every request of this pipeline.
    ///
    /// # Errors
    /// Returns `NimbusError::Config` for an invalid header name or value.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| NimbusError::Config(format!("invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| NimbusError::Config(format!("invalid header value {value:?}: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn context(&self) -> &ServiceContext {
        &self.context
    }

    /// Stage 1: obtain the bearer token and the service base address.
    ///
    /// # Errors
    /// `Auth`/`Authorization` from the identity provider, or `Cancelled`.
    pub async fn authenticate(&self, cancel: &CancellationToken) -> Result<Authenticated> {
        let token = self.auth.access_token(cancel).await?;
        let base_address = self.context.base_address(self.auth.as_ref(), cancel).await?;
        Ok(Authenticated {
            token,
            base_address,
        })
    }

    /// Stage 2: turn an [`ApiRequest`] into a ready-to-send request.
    ///
    /// # Errors
    /// Returns `NimbusError::Validation` if the path does not form a valid
    /// URL against the base address.
    pub fn build(&self, auth: &Authenticated, request: &ApiRequest) -> Result<RequestBuilder> {
        let mut url = resolve(&auth.base_address, &request.path)?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .headers(self.headers.clone())
            .header(AUTHORIZATION, format!("Bearer {}", auth.token))
            .header("X-Auth-Token", auth.token.as_str())
            .header(ACCEPT, "application/json");

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        Ok(builder)
    }

    /// Stage 3: one exchange, aborted by `cancel`.
    ///
    /// # Errors
    /// `Transport` or `Cancelled`.
    pub async fn send(
        &self,
        builder: RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse> {
        self.http.send(builder, cancel).await
    }

    /// Stage 4: reject statuses the request does not expect.
    ///
    /// # Errors
    /// `Auth` for 401/403, `NotFound` for 404, otherwise `Http`.
    pub fn parse(request: &ApiRequest, response: HttpResponse) -> Result<HttpResponse> {
        if request.accepts(response.status) {
            Ok(response)
        } else {
            Err(status_error(response.status, &response.url, &response.text()))
        }
    }

    /// Run all four stages.
    ///
    /// A 401 from the service invalidates the provider's cached token before
    /// the `Auth` error is returned; the request itself is not repeated.
    ///
    /// # Errors
    /// The first stage error.
    pub async fn execute(
        &self,
        request: &ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse> {
        let auth = self.authenticate(cancel).await?;
        let builder = self.build(&auth, request)?;
        let response = self.send(builder, cancel).await?;
        if response.status == StatusCode::UNAUTHORIZED {
            self.auth.invalidate();
        }
        Self::parse(request, response)
    }

    /// Run all stages and decode the JSON payload.
    ///
    /// # Errors
    /// The first stage error, or `Decode`.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<T> {
        self.execute(request, cancel).await?.json()
    }
}

/// Join a relative path (or server-provided absolute path) onto a base
/// address, keeping the base's own path prefix.
fn resolve(base: &Url, path: &str) -> Result<Url> {
    if path.starts_with("http://") || path.starts_with("https://") {
        return Url::parse(path).map_err(|e| InfraError::from(e).into());
    }

    let joined =
        format!("{}/{}", base.as_str().trim_end_matches('/'), path.trim_start_matches('/'));
    Url::parse(&joined)
        .map_err(|e| NimbusError::Validation(format!("invalid request path {path:?}: {e}")))
}
