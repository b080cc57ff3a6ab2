//! Shared test helpers for `nimbus-core` integration tests.
//!
//! Provides an in-memory queue service so the claim protocol can be exercised
//! against realistic server semantics without HTTP.

pub mod queue;

pub use queue::InMemoryQueueService;

/// Route `tracing` output through the test harness; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
