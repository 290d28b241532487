//! RtcStatsErrorCode trait for stable, machine-readable error codes.

/// Every error enum implements this to expose a structured error code string
/// alongside its human-readable message.
pub trait RtcStatsErrorCode {
    /// Returns the error code string (e.g., "SEQUENCE_GAP").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONNECT_FAILED: &str = "CONNECT_FAILED";
pub const SEND_FAILED: &str = "SEND_FAILED";
pub const TRANSPORT_CLOSED: &str = "TRANSPORT_CLOSED";
pub const MALFORMED_FRAME: &str = "MALFORMED_FRAME";
pub const SEQUENCE_GAP: &str = "SEQUENCE_GAP";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";
