//! Tracing setup for binaries and tests embedding this crate.
//!
//! The crate itself never installs a global subscriber - it only emits
//! `tracing` events. This module is a convenience initializer for callers
//! that want a sensible default (env-filtered, human-readable, stderr).

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs a global `tracing` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call once per process; subsequent calls are no-ops if a subscriber
/// is already installed.
pub fn init() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init();
}
