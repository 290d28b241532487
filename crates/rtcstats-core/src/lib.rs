//! # rtcstats-core
//!
//! Foundation crate for the rtcstats trace client.
//! Defines the wire-independent types, traits, errors, config, and constants
//! shared by the delta compressor and the reliable transport.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::TraceConfig;
pub use errors::{RtcStatsError, RtcStatsResult};
pub use models::{
    CloseEvent, CloseNotice, CloseOutcome, ConnectionId, ConnectionState, Envelope,
    EnvelopeDraft, EnvelopePayload, Session, StatsReport, StatsSnapshot, TerminationCause,
    TraceEvent,
};
