use serde::{Deserialize, Serialize};

/// Identifies the stats session envelopes are attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub parent_session_id: Option<String>,
}

impl Session {
    /// A fresh session with a random v4 id.
    pub fn new() -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string())
    }

    pub fn with_id(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            parent_session_id: None,
        }
    }

    /// Derive a child session (e.g. a breakout room) that links back to this one.
    pub fn reparent(&self, session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            parent_session_id: Some(self.session_id.clone()),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
