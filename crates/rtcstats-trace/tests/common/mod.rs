//! Deterministic fakes for the transport seams.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::mock::StepRng;
use serde_json::Value;

use rtcstats_core::config::TransportConfig;
use rtcstats_core::errors::TransportError;
use rtcstats_core::models::{
    CloseEvent, CloseNotice, ConnectionId, HandshakeRequest, Session, TransportEvent,
};
use rtcstats_core::traits::{Clock, Scheduler, TimerId, TimerKind, Transport, TransportFactory};
use rtcstats_trace::TelemetryClient;

// ─── Clock ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FakeClock {
    now: Arc<AtomicU64>,
}

impl FakeClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

// ─── Network ───────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct NetworkState {
    pub opened: Vec<(ConnectionId, HandshakeRequest)>,
    pub sent: Vec<(ConnectionId, String)>,
    pub closed: Vec<(ConnectionId, u16, String)>,
    /// Number of upcoming `open` calls that fail.
    pub failing_opens: usize,
}

/// Shared view of everything the fake transports did.
#[derive(Debug, Clone, Default)]
pub struct FakeNetwork {
    state: Arc<Mutex<NetworkState>>,
}

impl FakeNetwork {
    pub fn factory(&self) -> FakeTransportFactory {
        FakeTransportFactory { net: self.clone() }
    }

    pub fn fail_next_opens(&self, count: usize) {
        self.state.lock().unwrap().failing_opens = count;
    }

    pub fn opened(&self) -> Vec<(ConnectionId, HandshakeRequest)> {
        self.state.lock().unwrap().opened.clone()
    }

    pub fn closed(&self) -> Vec<(ConnectionId, u16, String)> {
        self.state.lock().unwrap().closed.clone()
    }

    pub fn frames(&self) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .sent
            .iter()
            .map(|(_, frame)| serde_json::from_str(frame).unwrap())
            .collect()
    }

    /// Frames of sequenced envelopes only.
    pub fn envelopes(&self) -> Vec<Value> {
        self.frames()
            .into_iter()
            .filter(|f| f["type"] != "keepalive")
            .collect()
    }

    /// Sequence numbers of sent envelopes, in send order.
    pub fn sent_sequence_numbers(&self) -> Vec<u64> {
        self.envelopes()
            .iter()
            .map(|f| {
                let data = f["data"].as_array().unwrap();
                data[data.len() - 1].as_u64().unwrap()
            })
            .collect()
    }
}

pub struct FakeTransportFactory {
    net: FakeNetwork,
}

impl TransportFactory for FakeTransportFactory {
    fn open(
        &mut self,
        connection: ConnectionId,
        request: &HandshakeRequest,
    ) -> Result<Box<dyn Transport>, TransportError> {
        let mut state = self.net.state.lock().unwrap();
        if state.failing_opens > 0 {
            state.failing_opens -= 1;
            return Err(TransportError::ConnectFailed {
                url: request.url.clone(),
                reason: "connection refused".into(),
            });
        }
        state.opened.push((connection, request.clone()));
        Ok(Box::new(FakeTransport {
            connection,
            net: self.net.clone(),
        }))
    }
}

pub struct FakeTransport {
    connection: ConnectionId,
    net: FakeNetwork,
}

impl Transport for FakeTransport {
    fn send(&mut self, frame: &str) -> Result<(), TransportError> {
        self.net
            .state
            .lock()
            .unwrap()
            .sent
            .push((self.connection, frame.to_string()));
        Ok(())
    }

    fn close(&mut self, code: u16, reason: &str) {
        self.net
            .state
            .lock()
            .unwrap()
            .closed
            .push((self.connection, code, reason.to_string()));
    }
}

// ─── Scheduler ─────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct TimerState {
    pub armed: BTreeMap<TimerId, (TimerKind, Duration)>,
    pub history: Vec<(TimerId, TimerKind, Duration)>,
    pub cancelled: Vec<TimerId>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeScheduler {
    state: Arc<Mutex<TimerState>>,
}

impl FakeScheduler {
    /// The armed timer of `kind`, if any.
    pub fn armed(&self, kind: TimerKind) -> Option<(TimerId, Duration)> {
        self.state
            .lock()
            .unwrap()
            .armed
            .iter()
            .find(|(_, (k, _))| *k == kind)
            .map(|(id, (_, delay))| (*id, *delay))
    }

    pub fn armed_count(&self) -> usize {
        self.state.lock().unwrap().armed.len()
    }

    /// Every reconnect delay ever scheduled.
    pub fn reconnect_delays(&self) -> Vec<Duration> {
        self.state
            .lock()
            .unwrap()
            .history
            .iter()
            .filter(|(_, kind, _)| *kind == TimerKind::Reconnect)
            .map(|(_, _, delay)| *delay)
            .collect()
    }

    /// Mark a one-shot timer as fired. Periodic timers stay armed.
    fn fire(&self, id: TimerId) {
        let mut state = self.state.lock().unwrap();
        if matches!(state.armed.get(&id), Some((kind, _)) if *kind != TimerKind::Keepalive) {
            state.armed.remove(&id);
        }
    }
}

impl Scheduler for FakeScheduler {
    fn arm(&mut self, id: TimerId, kind: TimerKind, delay: Duration) {
        let mut state = self.state.lock().unwrap();
        state.armed.insert(id, (kind, delay));
        state.history.push((id, kind, delay));
    }

    fn cancel(&mut self, id: TimerId) {
        let mut state = self.state.lock().unwrap();
        state.armed.remove(&id);
        state.cancelled.push(id);
    }
}

// ─── Harness ───────────────────────────────────────────────

pub fn test_config() -> TransportConfig {
    TransportConfig {
        endpoint: "wss://stats.test".into(),
        path: "/room".into(),
        backoff_jitter_ms: 0,
        ..TransportConfig::default()
    }
}

pub struct Harness {
    pub client: TelemetryClient,
    pub net: FakeNetwork,
    pub timers: FakeScheduler,
    pub clock: FakeClock,
    pub notices: Arc<Mutex<Vec<CloseNotice>>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: TransportConfig) -> Self {
        let net = FakeNetwork::default();
        let timers = FakeScheduler::default();
        let clock = FakeClock::new(1_700_000_000_000);
        let notices = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&notices);

        let client = TelemetryClient::builder(config)
            .session(Session::with_id("session-1"))
            .clock(Arc::new(clock.clone()))
            .rng(Box::new(StepRng::new(0, 0)))
            .on_close(move |notice| sink.lock().unwrap().push(notice.clone()))
            .build(Box::new(net.factory()), Box::new(timers.clone()));

        Self {
            client,
            net,
            timers,
            clock,
            notices,
        }
    }

    fn current(&self) -> ConnectionId {
        self.client.controller().connection_id()
    }

    pub fn open(&mut self) {
        let connection = self.current();
        self.client
            .handle_transport_event(connection, TransportEvent::Open);
    }

    pub fn server_says(&mut self, frame: &str) {
        let connection = self.current();
        self.client
            .handle_transport_event(connection, TransportEvent::Message(frame.to_string()));
    }

    pub fn ack(&mut self, value: u64) {
        self.server_says(&format!(r#"{{"type":"sn","body":{{"value":{value}}}}}"#));
    }

    pub fn initial_ack(&mut self, value: u64) {
        self.server_says(&format!(
            r#"{{"type":"sn","body":{{"value":{value},"state":"initial"}}}}"#
        ));
    }

    pub fn server_closes(&mut self, code: u16) {
        let connection = self.current();
        self.client.handle_transport_event(
            connection,
            TransportEvent::Closed(CloseEvent::new(code, "remote")),
        );
    }

    /// Connect, open, and receive the initial ack.
    pub fn establish(&mut self, acked: u64) {
        self.client.connect();
        self.open();
        self.initial_ack(acked);
    }

    /// Fire the armed timer of `kind`, advancing the clock by its delay.
    pub fn fire(&mut self, kind: TimerKind) -> TimerId {
        let (id, delay) = self
            .timers
            .armed(kind)
            .unwrap_or_else(|| panic!("no {kind:?} timer armed"));
        self.clock.advance(delay);
        self.timers.fire(id);
        self.client.handle_timer(id);
        id
    }

    pub fn notices(&self) -> Vec<CloseNotice> {
        self.notices.lock().unwrap().clone()
    }
}
