//! Tracing subscriber setup.
//!
//! The engine and the driver only emit `tracing` events; binaries and tests
//! decide where they go. Filtering follows `RUST_LOG`, e.g.
//! `RUST_LOG=greedy_search=trace` for per-branch pipeline decisions.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber: `RUST_LOG` filter (default `warn`),
/// compact output on stderr with thread names.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init() {
    tracing_subscriber::registry()
        .with(filter())
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_names(true)
                .compact(),
        )
        .init();
}

/// Install a subscriber that writes through the test harness capture.
/// Safe to call from every test; only the first call installs.
pub fn init_for_tests() {
    let _ = tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_test_writer().with_thread_names(true))
        .try_init();
}
