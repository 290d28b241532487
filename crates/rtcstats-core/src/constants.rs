/// rtcstats crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wire protocol iteration, suffixed with the report flavour in the subprotocol.
pub const PROTOCOL_ITERATION: &str = "3.1";

/// Maximum number of ms the client keeps trying to reconnect.
pub const MAX_RECONNECT_TIME_MS: u64 = 600_000;

/// Number of envelopes buffered before new ones are dropped.
pub const BUFFER_LIMIT: usize = 1000;

/// Interval between keepalive frames while the socket is open.
pub const DEFAULT_PING_INTERVAL_MS: u64 = 30_000;

/// Base delay of the exponential reconnect backoff.
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;

/// Upper bound of the random jitter added to each backoff delay.
pub const DEFAULT_BACKOFF_JITTER_MS: u64 = 1_000;

/// How long a requested close may wait for the peer before it is forced, in ms.
pub const DEFAULT_CLOSE_TIMEOUT_MS: u64 = 5_000;

/// First sequence number handed out by a fresh session.
pub const INITIAL_SEQUENCE_NUMBER: u64 = 1;

/// Close code sent when the owner ends the session on purpose.
pub const CONFERENCE_LEAVE_CODE: u16 = 3001;

/// Close code sent when client and server state can no longer be reconciled.
pub const DUMP_ERROR_CODE: u16 = 3002;

/// Close codes that never trigger a reconnect.
pub const CUSTOM_ERROR_CODES: [u16; 2] = [CONFERENCE_LEAVE_CODE, DUMP_ERROR_CODE];

/// Reported when a connection attempt fails before any close frame exists.
pub const ABNORMAL_CLOSURE_CODE: u16 = 1006;

/// Inbound message type names.
pub mod message_types {
    pub const SEQUENCE_NUMBER: &str = "sn";
}

/// Ack state marking the first acknowledgement of a connection.
pub const ACK_STATE_INITIAL: &str = "initial";

/// Field names with a fixed meaning inside a stats report.
pub mod report_fields {
    pub const ID: &str = "id";
    pub const TIMESTAMP: &str = "timestamp";
}

/// Method name used when a compressed stats sample is traced.
pub const GETSTATS_METHOD: &str = "getstats";

/// Method name used for identity events.
pub const IDENTITY_METHOD: &str = "identity";
