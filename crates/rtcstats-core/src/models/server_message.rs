//! Messages the server sends to the client.

use serde::{Deserialize, Serialize};

use crate::constants::ACK_STATE_INITIAL;

/// Inbound frames, tagged by `type` with the content under `body`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "body")]
pub enum ServerMessage {
    /// Highest contiguous sequence number the server has stored.
    #[serde(rename = "sn")]
    SequenceNumber(SequenceAck),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceAck {
    pub value: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl SequenceAck {
    pub fn initial(value: u64) -> Self {
        Self {
            value,
            state: Some(ACK_STATE_INITIAL.to_string()),
        }
    }

    pub fn progress(value: u64) -> Self {
        Self { value, state: None }
    }

    /// The first ack of a connection unlocks sending.
    pub fn is_initial(&self) -> bool {
        self.state.as_deref() == Some(ACK_STATE_INITIAL)
    }
}
