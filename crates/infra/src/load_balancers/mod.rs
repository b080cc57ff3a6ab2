//! Load balancer service client

pub mod client;
mod wire;

pub use client::LoadBalancerClient;
