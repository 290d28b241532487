//! Wire protocol errors.

use super::error_code::{self, RtcStatsErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// An inbound frame could not be decoded.
    #[error("malformed frame: {reason}")]
    MalformedFrame { reason: String },

    /// The server acknowledged a sequence number the buffer cannot reconcile.
    /// `first`/`last` are the buffered range, or the last appended sequence
    /// number twice when the buffer is empty.
    #[error("sequence gap: server acked {acked}, buffer holds {first}..={last}")]
    SequenceGap { acked: u64, first: u64, last: u64 },
}

impl RtcStatsErrorCode for ProtocolError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedFrame { .. } => error_code::MALFORMED_FRAME,
            Self::SequenceGap { .. } => error_code::SEQUENCE_GAP,
        }
    }
}
