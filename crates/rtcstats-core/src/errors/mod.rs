//! Error handling for rtcstats.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod error_code;
pub mod protocol_error;
pub mod transport_error;

pub use config_error::ConfigError;
pub use error_code::RtcStatsErrorCode;
pub use protocol_error::ProtocolError;
pub use transport_error::TransportError;

/// Top-level error for the rtcstats workspace.
#[derive(Debug, thiserror::Error)]
pub enum RtcStatsError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RtcStatsErrorCode for RtcStatsError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(e) => e.error_code(),
            Self::Protocol(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Serialization(_) => error_code::SERIALIZATION_ERROR,
        }
    }
}

/// Convenience result alias.
pub type RtcStatsResult<T> = Result<T, RtcStatsError>;
