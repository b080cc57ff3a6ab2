//! HTTP transport
//!
//! [`HttpClient`] performs one exchange per request, bounded by a fixed
//! timeout and abortable through a `CancellationToken`. [`pipeline`]
//! composes it with authentication and decoding for the service clients.

pub mod client;
pub mod pipeline;

pub use client::{HttpClient, HttpClientBuilder, HttpResponse};
pub use pipeline::{ApiRequest, Authenticated, Pipeline};
