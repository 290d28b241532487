use serde::{Deserialize, Serialize};

/// Everything a transport factory needs to open a socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeRequest {
    /// Full url including the `statsSessionId` and `isReconnect` query.
    pub url: String,
    /// Subprotocol, e.g. `3.1_STANDARD`.
    pub protocol: String,
    pub user_agent: String,
    pub session_id: String,
    pub is_reconnect: bool,
}
