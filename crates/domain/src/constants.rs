//! SDK constants
//!
//! Service catalog keys, default timings and server-side limits used across
//! the workspace.

// Service catalog types
pub const QUEUES_SERVICE_TYPE: &str = "rax:queues";
pub const DNS_SERVICE_TYPE: &str = "rax:dns";
pub const LOAD_BALANCER_SERVICE_TYPE: &str = "rax:load-balancer";

// Transport defaults
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const USER_AGENT: &str = concat!("nimbus-sdk/", env!("CARGO_PKG_VERSION"));

// Identity
pub const TOKEN_REFRESH_THRESHOLD_SECS: i64 = 300;

// Queue service limits
pub const MAX_QUEUE_NAME_LENGTH: usize = 64;
pub const CLIENT_ID_HEADER: &str = "Client-ID";
