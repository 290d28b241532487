//! # rtcstats-trace
//!
//! Client side of the rtcstats trace protocol. Events are stamped with a
//! monotonic sequence number, kept in a bounded retry buffer until the server
//! acknowledges them, and replayed in order after every reconnect. Periodic
//! stats samples are delta-compressed before they enter the stream.
//!
//! The connection state machine is sans-IO: sockets, timers and the clock are
//! injected through the traits in `rtcstats_core::traits`. The `ws` feature
//! adds a tokio driver with a real websocket transport.

pub mod backoff;
pub mod client;
pub mod controller;
pub mod handshake;
pub mod protocol;
pub mod retry_buffer;
pub mod sequencer;
pub mod tracing_setup;

#[cfg(feature = "ws")]
pub mod runtime;

pub use backoff::backoff_delay;
pub use client::{TelemetryClient, TelemetryClientBuilder};
pub use controller::{CloseCallback, ConnectionController, TraceStats};
pub use retry_buffer::RetryBuffer;
pub use sequencer::Sequencer;

#[doc(hidden)]
pub mod __private {
    pub use tracing;
}
