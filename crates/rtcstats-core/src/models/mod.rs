//! Data model shared by the compressor and the transport.

pub mod connection;
pub mod envelope;
pub mod handshake;
pub mod server_message;
pub mod session;
pub mod stats_snapshot;

pub use connection::{
    CloseEvent, CloseNotice, CloseOutcome, ConnectionId, ConnectionState, TerminationCause,
    TransportEvent,
};
pub use envelope::{Envelope, EnvelopeDraft, EnvelopePayload, MessageType, TraceEvent};
pub use handshake::HandshakeRequest;
pub use server_message::{SequenceAck, ServerMessage};
pub use session::Session;
pub use stats_snapshot::{StatsReport, StatsSnapshot};
