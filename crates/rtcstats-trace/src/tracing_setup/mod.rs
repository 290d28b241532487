//! Tracing setup: structured logging with span definitions and event helpers.

pub mod events;
pub mod spans;

use rtcstats_core::config::ObservabilityConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted for the log filter.
pub const LOG_ENV: &str = "RTCSTATS_LOG";

pub type InitResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Install a JSON subscriber filtered by `RTCSTATS_LOG` (default `info`).
///
/// Fails if a global subscriber is already set.
pub fn init_tracing() -> InitResult {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .try_init()
}

/// Install a JSON subscriber with a custom filter string (for tests or embedding).
pub fn init_tracing_with_filter(filter: &str) -> InitResult {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(true)
        .json()
        .try_init()
}

/// Install a subscriber as described by the `[observability]` config section.
/// `RTCSTATS_LOG` still wins over `log_level` when set.
pub fn init_from_config(config: &ObservabilityConfig) -> InitResult {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}
