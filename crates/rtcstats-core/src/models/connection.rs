//! Connection lifecycle types.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::CUSTOM_ERROR_CODES;

/// Transport state. Only the connection controller moves between these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Never connected.
    Disconnected,
    /// Handshake in flight.
    Connecting,
    /// Socket open. Data flows only after the initial ack.
    Open,
    /// Owner-requested close, waiting for the socket to go away.
    Closing,
    /// Backoff timer armed, waiting to reconnect.
    ReconnectWait,
    /// No further automatic activity.
    Terminated,
}

impl ConnectionState {
    /// Whether the state forbids any further sends.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closing | Self::Terminated)
    }

    /// Whether a socket exists (or is being established) for this state.
    pub fn has_transport(&self) -> bool {
        matches!(self, Self::Connecting | Self::Open | Self::Closing)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closing => "closing",
            Self::ReconnectWait => "reconnect_wait",
            Self::Terminated => "terminated",
        };
        f.write_str(s)
    }
}

/// Generation counter of connection attempts. Events tagged with an older
/// generation belong to a socket that has been replaced and are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A close reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseEvent {
    pub code: u16,
    pub reason: String,
}

impl CloseEvent {
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Codes in the do-not-retry set skip the backoff path entirely.
    pub fn is_retryable(&self) -> bool {
        !CUSTOM_ERROR_CODES.contains(&self.code)
    }
}

/// Events a transport delivers back to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Open,
    Message(String),
    Closed(CloseEvent),
}

/// Why the controller stopped for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationCause {
    /// The owner called `close()`.
    ClosedByOwner,
    /// The remote closed with a code from the do-not-retry set.
    DoNotRetry,
    /// An ack could not be reconciled with the buffer.
    SequenceGap,
    /// The reconnect budget ran out.
    BudgetExhausted,
}

/// What happens after a close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    Reconnecting { attempt: u32, delay: Duration },
    Terminated(TerminationCause),
}

/// Delivered to the owner's close callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseNotice {
    pub code: u16,
    pub reason: String,
    pub outcome: CloseOutcome,
}

impl CloseNotice {
    pub fn is_terminal(&self) -> bool {
        matches!(self.outcome, CloseOutcome::Terminated(_))
    }
}
