//! Span definitions for connection attempts and buffer flushes.

/// Create a span around one connection attempt.
#[macro_export]
macro_rules! connect_span {
    ($connection:expr, $is_reconnect:expr) => {
        $crate::__private::tracing::info_span!(
            "rtcstats.connect",
            connection = %$connection,
            is_reconnect = $is_reconnect
        )
    };
}

/// Create a span around a replay of the retry buffer.
#[macro_export]
macro_rules! flush_span {
    ($connection:expr, $pending:expr) => {
        $crate::__private::tracing::debug_span!("rtcstats.flush", connection = %$connection, pending = $pending)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const CONNECT: &str = "rtcstats.connect";
    pub const FLUSH: &str = "rtcstats.flush";
}
