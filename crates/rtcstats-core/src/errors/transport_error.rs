//! Transport-level failures. None of these are retried synchronously: the
//! controller turns them into a close event and lets the reconnect logic run.

use super::error_code::{self, RtcStatsErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connect to {url} failed: {reason}")]
    ConnectFailed { url: String, reason: String },

    #[error("send failed: {reason}")]
    SendFailed { reason: String },

    #[error("transport already closed")]
    Closed,
}

impl RtcStatsErrorCode for TransportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConnectFailed { .. } => error_code::CONNECT_FAILED,
            Self::SendFailed { .. } => error_code::SEND_FAILED,
            Self::Closed => error_code::TRANSPORT_CLOSED,
        }
    }
}
