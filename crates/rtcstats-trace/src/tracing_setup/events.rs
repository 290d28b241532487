//! Structured log events for the transport.
//!
//! Each function emits a `tracing` event with structured fields.

use std::time::Duration;

use rtcstats_core::models::ConnectionState;

/// Log a state machine transition.
pub fn state_changed(from: ConnectionState, to: ConnectionState) {
    tracing::debug!(
        event = "state_changed",
        from = %from,
        to = %to,
        "connection state changed"
    );
}

/// Log an envelope refused because the retry buffer is full.
pub fn envelope_dropped(capacity: usize, dropped_total: u64) {
    tracing::warn!(
        event = "envelope_dropped",
        capacity = capacity,
        dropped_total = dropped_total,
        "retry buffer full, dropping newest envelope"
    );
}

/// Log a record that arrived after the controller stopped.
pub fn record_discarded(state: ConnectionState) {
    tracing::debug!(
        event = "record_discarded",
        state = %state,
        "record discarded, controller is not accepting events"
    );
}

/// Log an ack that pruned the retry buffer.
pub fn buffer_pruned(acked: u64, removed: usize, remaining: usize) {
    tracing::trace!(
        event = "buffer_pruned",
        acked = acked,
        removed = removed,
        remaining = remaining,
        "retry buffer pruned"
    );
}

/// Log a replay of the retry buffer after the initial ack.
pub fn buffer_flushed(sent: usize) {
    tracing::debug!(event = "buffer_flushed", sent = sent, "retry buffer replayed");
}

/// Log a sequence gap between client and server.
pub fn sequence_gap(acked: u64, first: u64, last: u64) {
    tracing::error!(
        event = "sequence_gap",
        acked = acked,
        first = first,
        last = last,
        "server ack outside the buffered range, closing"
    );
}

/// Log a frame from the server that could not be decoded.
pub fn malformed_frame(reason: &str) {
    tracing::warn!(event = "malformed_frame", reason = %reason, "ignoring malformed frame");
}

/// Log a failed attempt to open a transport.
pub fn connect_failed(reason: &str) {
    tracing::warn!(event = "connect_failed", reason = %reason, "transport open failed");
}

/// Log a failed send. The transport reports the close that follows.
pub fn send_failed(reason: &str) {
    tracing::warn!(event = "send_failed", reason = %reason, "transport send failed");
}

/// Log a close reported by the transport.
pub fn connection_closed(code: u16, reason: &str) {
    tracing::info!(
        event = "connection_closed",
        code = code,
        reason = %reason,
        "connection closed"
    );
}

/// Log a close that was finished without the peer's confirmation.
pub fn close_abandoned(reason: &str) {
    tracing::warn!(
        event = "close_abandoned",
        reason = %reason,
        "close not confirmed by peer, dropping transport"
    );
}

/// Log a scheduled reconnect.
pub fn reconnect_scheduled(attempt: u32, delay: Duration, remaining: Duration) {
    tracing::info!(
        event = "reconnect_scheduled",
        attempt = attempt,
        delay_ms = millis(delay),
        remaining_ms = millis(remaining),
        "reconnect scheduled"
    );
}

/// Log the end of automatic reconnection.
pub fn reconnect_budget_exhausted(attempts: u32, elapsed: Duration) {
    tracing::warn!(
        event = "reconnect_budget_exhausted",
        attempts = attempts,
        elapsed_ms = millis(elapsed),
        "reconnect budget exhausted, giving up"
    );
}

/// Log a session re-parent.
pub fn session_reparented(from: &str, to: &str, rewritten: usize) {
    tracing::info!(
        event = "session_reparented",
        from = %from,
        to = %to,
        rewritten = rewritten,
        "session re-parented"
    );
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
