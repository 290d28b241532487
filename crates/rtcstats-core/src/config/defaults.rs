// Single source of truth for all default values.

use crate::constants;

// --- Transport ---
pub const DEFAULT_ENDPOINT: &str = "wss://localhost:3000";
pub const DEFAULT_PATH: &str = "/";
pub const DEFAULT_USE_LEGACY: bool = false;
pub const DEFAULT_PING_INTERVAL_MS: u64 = constants::DEFAULT_PING_INTERVAL_MS;
pub const DEFAULT_BUFFER_LIMIT: usize = constants::BUFFER_LIMIT;
pub const DEFAULT_MAX_RECONNECT_TIME_MS: u64 = constants::MAX_RECONNECT_TIME_MS;
pub const DEFAULT_BACKOFF_BASE_MS: u64 = constants::DEFAULT_BACKOFF_BASE_MS;
pub const DEFAULT_BACKOFF_JITTER_MS: u64 = constants::DEFAULT_BACKOFF_JITTER_MS;
pub const DEFAULT_CLOSE_TIMEOUT_MS: u64 = constants::DEFAULT_CLOSE_TIMEOUT_MS;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;

/// User agent attached to the websocket handshake.
pub fn default_user_agent() -> String {
    format!("rtcstats-rs/{}", constants::VERSION)
}
