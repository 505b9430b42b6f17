//! Optional `tracing` subscriber for applications without one of their own.
//!
//! The library only emits events; installing a subscriber is the caller's
//! choice. [`init`] is a convenience that reads the filter from `QBLAS_LOG`
//! (same syntax as `RUST_LOG`) and defaults to `warn`.

use tracing_subscriber::EnvFilter;

pub const ENV_LOG: &str = "QBLAS_LOG";

/// Install a global `fmt` subscriber. Returns `false` if one was already set.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
