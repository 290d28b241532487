//! Public entry point: record events and stats samples, manage the session.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde_json::Value;

use rtcstats_compression::DeltaCompressor;
use rtcstats_core::config::TransportConfig;
use rtcstats_core::constants::GETSTATS_METHOD;
use rtcstats_core::models::{
    CloseNotice, ConnectionId, ConnectionState, EnvelopePayload, Session, StatsSnapshot,
    TraceEvent, TransportEvent,
};
use rtcstats_core::traits::{Clock, Scheduler, SystemClock, TimerId, TransportFactory};

use crate::controller::{CloseCallback, ConnectionController, TraceStats};

/// Builder for [`TelemetryClient`]. Everything but the transport factory and
/// the scheduler has a default.
pub struct TelemetryClientBuilder {
    config: TransportConfig,
    session: Option<Session>,
    clock: Arc<dyn Clock>,
    rng: Option<Box<dyn RngCore + Send>>,
    on_close: Option<CloseCallback>,
}

impl TelemetryClientBuilder {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config,
            session: None,
            clock: Arc::new(SystemClock),
            rng: None,
            on_close: None,
        }
    }

    /// Use a fixed session instead of a random v4 id.
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Jitter source for the reconnect backoff.
    pub fn rng(mut self, rng: Box<dyn RngCore + Send>) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn on_close<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&CloseNotice) + Send + 'static,
    {
        self.on_close = Some(Box::new(callback));
        self
    }

    pub fn build(
        self,
        factory: Box<dyn TransportFactory>,
        scheduler: Box<dyn Scheduler>,
    ) -> TelemetryClient {
        let rng = self
            .rng
            .unwrap_or_else(|| Box::new(StdRng::from_entropy()));
        let mut controller = ConnectionController::new(
            self.config,
            self.session.unwrap_or_default(),
            factory,
            scheduler,
            self.clock,
            rng,
        );
        if let Some(callback) = self.on_close {
            controller.set_close_callback(callback);
        }
        TelemetryClient {
            controller,
            compressor: DeltaCompressor::new(),
        }
    }
}

/// One traced session over one logical connection.
///
/// Recording never blocks and never fails: events are sequenced, buffered
/// and sent as soon as the server has acknowledged the connection.
#[derive(Debug)]
pub struct TelemetryClient {
    controller: ConnectionController,
    compressor: DeltaCompressor,
}

impl TelemetryClient {
    pub fn builder(config: TransportConfig) -> TelemetryClientBuilder {
        TelemetryClientBuilder::new(config)
    }

    /// Emit an `identity` envelope describing the client.
    pub fn identity(&mut self, data: Value) {
        self.controller
            .record(EnvelopePayload::Identity(TraceEvent::identity(data)));
    }

    /// Emit a `stats-entry` envelope for an arbitrary traced call.
    pub fn record_event(&mut self, method: &str, pc_id: Option<&str>, data: Value) {
        self.controller
            .record(EnvelopePayload::StatsEntry(TraceEvent::new(method, pc_id, data)));
    }

    /// Delta-compress a stats sample against the previous one of the same
    /// peer connection and emit it as a `getstats` entry.
    pub fn record_snapshot(&mut self, pc_id: &str, snapshot: StatsSnapshot) {
        let delta = self.compressor.compress(pc_id, snapshot);
        match serde_json::to_value(&delta) {
            Ok(data) => self.record_event(GETSTATS_METHOD, Some(pc_id), data),
            Err(e) => tracing::warn!(error = %e, pc_id, "stats delta encoding failed"),
        }
    }

    /// Drop the delta baseline of a closed peer connection. The next sample
    /// for that id is sent in full.
    pub fn forget_peer(&mut self, pc_id: &str) -> bool {
        self.compressor.forget(pc_id)
    }

    pub fn connect(&mut self) {
        self.controller.connect();
    }

    pub fn close(&mut self) {
        self.controller.close();
    }

    /// Continue under a child session id. See [`ConnectionController::reparent`].
    pub fn reparent(&mut self, session_id: impl Into<String>) {
        self.controller.reparent(session_id);
    }

    pub fn state(&self) -> ConnectionState {
        self.controller.state()
    }

    pub fn session(&self) -> &Session {
        self.controller.session()
    }

    pub fn stats(&self) -> TraceStats {
        self.controller.stats()
    }

    pub fn controller(&self) -> &ConnectionController {
        &self.controller
    }

    pub fn handle_transport_event(&mut self, connection: ConnectionId, event: TransportEvent) {
        self.controller.handle_transport_event(connection, event);
    }

    pub fn handle_timer(&mut self, id: TimerId) {
        self.controller.handle_timer(id);
    }
}
