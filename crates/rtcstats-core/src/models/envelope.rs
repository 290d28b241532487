//! Envelopes: one sequenced transport-level unit per traced event.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::session::Session;
use crate::constants::IDENTITY_METHOD;

/// Envelope kinds as they appear in the wire `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    Identity,
    StatsEntry,
    Keepalive,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::StatsEntry => "stats-entry",
            Self::Keepalive => "keepalive",
        }
    }
}

/// A caller-supplied event: `(method, peer connection id, data)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub method: String,
    pub pc_id: Option<String>,
    pub data: Value,
}

impl TraceEvent {
    pub fn new(method: impl Into<String>, pc_id: Option<&str>, data: Value) -> Self {
        Self {
            method: method.into(),
            pc_id: pc_id.map(str::to_string),
            data,
        }
    }

    /// Identity events carry no peer connection.
    pub fn identity(data: Value) -> Self {
        Self::new(IDENTITY_METHOD, None, data)
    }

    /// The positional argument list used on the wire.
    pub fn args(&self) -> Vec<Value> {
        vec![
            Value::String(self.method.clone()),
            self.pc_id.clone().map_or(Value::Null, Value::String),
            self.data.clone(),
        ]
    }
}

/// Sequenced payloads. Keepalives are never sequenced or buffered.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopePayload {
    Identity(TraceEvent),
    StatsEntry(TraceEvent),
}

impl EnvelopePayload {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Identity(_) => MessageType::Identity,
            Self::StatsEntry(_) => MessageType::StatsEntry,
        }
    }

    pub fn event(&self) -> &TraceEvent {
        match self {
            Self::Identity(event) | Self::StatsEntry(event) => event,
        }
    }
}

/// An envelope before the sequencer has stamped it.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeDraft {
    pub session: Session,
    pub payload: EnvelopePayload,
}

impl EnvelopeDraft {
    pub fn new(session: Session, payload: EnvelopePayload) -> Self {
        Self { session, payload }
    }
}

/// A stamped envelope. The timestamp and sequence number are fixed at
/// construction; only the session label can change (on re-parenting).
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    session_id: String,
    parent_session_id: Option<String>,
    payload: EnvelopePayload,
    timestamp_ms: u64,
    sequence_number: u64,
}

impl Envelope {
    pub fn stamp(draft: EnvelopeDraft, timestamp_ms: u64, sequence_number: u64) -> Self {
        Self {
            session_id: draft.session.session_id,
            parent_session_id: draft.session.parent_session_id,
            payload: draft.payload,
            timestamp_ms,
            sequence_number,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn parent_session_id(&self) -> Option<&str> {
        self.parent_session_id.as_deref()
    }

    pub fn payload(&self) -> &EnvelopePayload {
        &self.payload
    }

    pub fn message_type(&self) -> MessageType {
        self.payload.message_type()
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    /// Move the envelope to another session, keeping its sequence number.
    pub fn relabel(&mut self, session: &Session) {
        self.session_id = session.session_id.clone();
        self.parent_session_id = session.parent_session_id.clone();
    }
}
