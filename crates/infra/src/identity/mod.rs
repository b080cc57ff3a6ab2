//! Identity: bearer tokens and service endpoint resolution
//!
//! Service clients depend on the [`AccessTokenProvider`] trait only.
//! [`IdentityClient`] talks to a v2.0 identity service;
//! [`StaticTokenProvider`] serves a pre-issued token and fixed endpoints.

pub mod client;
pub mod provider;

pub use client::IdentityClient;
pub use provider::{AccessTokenProvider, StaticTokenProvider};
