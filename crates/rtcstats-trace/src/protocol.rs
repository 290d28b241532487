//! Wire format: JSON text frames in both directions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use rtcstats_core::errors::ProtocolError;
use rtcstats_core::models::{Envelope, MessageType, ServerMessage};

/// Outbound frame as it appears on the socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    pub stats_session_id: String,
    /// Present only for re-parented sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_stats_session_id: Option<String>,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// `[...args, timestampMs, sequenceNumber]`. Absent on keepalives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Value>>,
}

impl WireMessage {
    pub fn from_envelope(envelope: &Envelope) -> Self {
        let mut data = envelope.payload().event().args();
        data.push(Value::from(envelope.timestamp_ms()));
        data.push(Value::from(envelope.sequence_number()));
        Self {
            stats_session_id: envelope.session_id().to_string(),
            parent_stats_session_id: envelope.parent_session_id().map(str::to_string),
            message_type: envelope.message_type(),
            data: Some(data),
        }
    }

    pub fn keepalive(session_id: &str) -> Self {
        Self {
            stats_session_id: session_id.to_string(),
            parent_stats_session_id: None,
            message_type: MessageType::Keepalive,
            data: None,
        }
    }
}

/// Serialize a sequenced envelope into a text frame.
pub fn encode_envelope(envelope: &Envelope) -> Result<String, serde_json::Error> {
    serde_json::to_string(&WireMessage::from_envelope(envelope))
}

pub fn encode_keepalive(session_id: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(&WireMessage::keepalive(session_id))
}

/// Parse an inbound frame. Unknown message types are rejected.
pub fn decode_server_message(frame: &str) -> Result<ServerMessage, ProtocolError> {
    serde_json::from_str(frame).map_err(|e| ProtocolError::MalformedFrame {
        reason: e.to_string(),
    })
}
