use crate::errors::TransportError;
use crate::models::{ConnectionId, HandshakeRequest};

/// A live socket-like connection.
///
/// Open, message and close notifications flow back to the controller as
/// [`TransportEvent`](crate::models::TransportEvent)s tagged with the
/// connection id the socket was opened with.
pub trait Transport: Send {
    /// Queue one text frame. Failures are not retried; the transport is
    /// expected to report a close afterwards.
    fn send(&mut self, frame: &str) -> Result<(), TransportError>;

    /// Ask the remote end to close with `code`.
    fn close(&mut self, code: u16, reason: &str);
}

/// Opens transports. Injected so tests can substitute an in-memory fake.
pub trait TransportFactory: Send {
    fn open(
        &mut self,
        connection: ConnectionId,
        request: &HandshakeRequest,
    ) -> Result<Box<dyn Transport>, TransportError>;
}
