use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants::PROTOCOL_ITERATION;

/// Connection, buffering and reconnect settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Websocket endpoint, e.g. `wss://rtcstats.example.com`.
    pub endpoint: String,
    /// Path appended to the endpoint (the page path in browser deployments).
    pub path: String,
    /// Use the legacy report flavour of the protocol.
    pub use_legacy: bool,
    /// User agent sent with the handshake.
    pub user_agent: String,
    /// Keepalive interval in ms.
    pub ping_interval_ms: u64,
    /// Maximum number of unacknowledged envelopes kept for replay.
    pub buffer_limit: usize,
    /// Total reconnect budget in ms, measured from the start of the session.
    pub max_reconnect_time_ms: u64,
    /// Base of the exponential backoff in ms.
    pub backoff_base_ms: u64,
    /// Upper bound of the random jitter in ms. Zero disables jitter.
    pub backoff_jitter_ms: u64,
    /// Time a requested close may wait for the peer's confirmation in ms.
    pub close_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::DEFAULT_ENDPOINT.to_string(),
            path: defaults::DEFAULT_PATH.to_string(),
            use_legacy: defaults::DEFAULT_USE_LEGACY,
            user_agent: defaults::default_user_agent(),
            ping_interval_ms: defaults::DEFAULT_PING_INTERVAL_MS,
            buffer_limit: defaults::DEFAULT_BUFFER_LIMIT,
            max_reconnect_time_ms: defaults::DEFAULT_MAX_RECONNECT_TIME_MS,
            backoff_base_ms: defaults::DEFAULT_BACKOFF_BASE_MS,
            backoff_jitter_ms: defaults::DEFAULT_BACKOFF_JITTER_MS,
            close_timeout_ms: defaults::DEFAULT_CLOSE_TIMEOUT_MS,
        }
    }
}

impl TransportConfig {
    /// Subprotocol announced during the handshake.
    pub fn protocol_version(&self) -> String {
        if self.use_legacy {
            format!("{PROTOCOL_ITERATION}_LEGACY")
        } else {
            format!("{PROTOCOL_ITERATION}_STANDARD")
        }
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval_ms)
    }

    pub fn reconnect_budget(&self) -> Duration {
        Duration::from_millis(self.max_reconnect_time_ms)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn backoff_jitter(&self) -> Duration {
        Duration::from_millis(self.backoff_jitter_ms)
    }

    pub fn close_timeout(&self) -> Duration {
        Duration::from_millis(self.close_timeout_ms)
    }
}
