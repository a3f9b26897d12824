//! Tracing subscriber initialization for binaries, tools and tests.
//!
//! The mapping engine only emits events through the `tracing` macros; it
//! never installs a subscriber. Whoever embeds it picks one of:
//! - `init_dev_subscriber()` - stderr logging at DEBUG and above
//! - `init_dev_subscriber_with_env_filter()` - stderr logging filtered by `RUST_LOG`
//! - `init_test_subscriber()` - captured test output, safe to call from every test
//!
//! # Usage
//!
//! ```no_run
//! use cellmap_core::telemetry;
//!
//! fn main() {
//!     telemetry::init_dev_subscriber_with_env_filter();
//!     tracing::info!("Application started");
//! }
//! ```

use tracing::Subscriber;
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Default filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "debug";

/// Initialize a stderr subscriber at [`DEFAULT_FILTER`] for development.
///
/// # Panics
/// Panics if a global subscriber has already been set.
pub fn init_dev_subscriber() {
    install(dev_subscriber(EnvFilter::new(DEFAULT_FILTER)));
}

/// Initialize a stderr subscriber that respects `RUST_LOG`.
///
/// Falls back to [`DEFAULT_FILTER`] when the variable is missing or invalid.
/// Set `RUST_LOG=cellmap=trace` to see every row conversion.
///
/// # Panics
/// Panics if a global subscriber has already been set.
pub fn init_dev_subscriber_with_env_filter() {
    install(dev_subscriber(env_filter()));
}

/// Stderr output with target, file and line of every event.
fn dev_subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .finish()
}

fn install(subscriber: impl Subscriber + Send + Sync + 'static) {
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Initialize a subscriber whose output is captured by the test harness.
///
/// Unlike the dev subscribers this never panics: integration tests call it
/// at the top of every test and only the first call installs anything.
/// Returns `true` if this call installed the subscriber.
pub fn init_test_subscriber() -> bool {
    fmt::Subscriber::builder()
        .with_env_filter(env_filter())
        .with_test_writer()
        .with_target(true)
        .try_init()
        .is_ok()
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
