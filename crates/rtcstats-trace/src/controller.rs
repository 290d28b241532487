//! The connection state machine.
//!
//! [`ConnectionController`] owns the socket, both timers, the sequencer and
//! the retry buffer. It never performs IO on its own: sockets come from a
//! [`TransportFactory`], timers from a [`Scheduler`], and everything the
//! outside world reports back is fed in through
//! [`handle_transport_event`](ConnectionController::handle_transport_event)
//! and [`handle_timer`](ConnectionController::handle_timer).

use std::sync::Arc;
use std::time::Duration;

use rand::RngCore;
use serde::Serialize;

use rtcstats_core::config::TransportConfig;
use rtcstats_core::constants::{ABNORMAL_CLOSURE_CODE, CONFERENCE_LEAVE_CODE, DUMP_ERROR_CODE};
use rtcstats_core::errors::ProtocolError;
use rtcstats_core::models::{
    CloseEvent, CloseNotice, CloseOutcome, ConnectionId, ConnectionState, EnvelopeDraft,
    EnvelopePayload, SequenceAck, ServerMessage, Session, TerminationCause, TransportEvent,
};
use rtcstats_core::traits::{Clock, Scheduler, TimerId, TimerKind, Transport, TransportFactory};

use crate::backoff::{backoff_delay, jitter};
use crate::handshake::build_request;
use crate::protocol::{decode_server_message, encode_envelope, encode_keepalive};
use crate::retry_buffer::RetryBuffer;
use crate::sequencer::Sequencer;
use crate::tracing_setup::events;

/// Invoked on every close the controller observes. Must not call back into
/// the client that owns the controller.
pub type CloseCallback = Box<dyn FnMut(&CloseNotice) + Send>;

/// Point-in-time diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceStats {
    pub state: ConnectionState,
    /// Envelopes waiting for an ack.
    pub buffered: usize,
    /// Envelopes refused because the buffer was full.
    pub dropped: u64,
    /// Records refused because the controller had stopped.
    pub discarded: u64,
    /// Frames handed to a transport, replays and keepalives included.
    pub sent: u64,
    /// Highest sequence number the server acknowledged on this session.
    pub acked: Option<u64>,
    /// Reconnect attempts since the last initial ack.
    pub reconnect_attempts: u32,
    /// Sequence number the next record will get.
    pub next_sequence: u64,
}

/// Requested close that has not been confirmed by the transport yet.
#[derive(Debug)]
struct PendingClose {
    code: u16,
    reason: String,
    cause: TerminationCause,
}

pub struct ConnectionController {
    config: TransportConfig,
    session: Session,
    state: ConnectionState,
    can_send: bool,
    termination: Option<TerminationCause>,
    pending_close: Option<PendingClose>,

    sequencer: Sequencer,
    buffer: RetryBuffer,

    factory: Box<dyn TransportFactory>,
    scheduler: Box<dyn Scheduler>,
    clock: Arc<dyn Clock>,
    rng: Box<dyn RngCore + Send>,
    on_close: Option<CloseCallback>,

    transport: Option<Box<dyn Transport>>,
    connection: ConnectionId,
    ever_opened: bool,

    next_timer: u64,
    keepalive_timer: Option<TimerId>,
    reconnect_timer: Option<TimerId>,
    close_timer: Option<TimerId>,

    attempt: u32,
    window_started_ms: u64,
    scheduled_in_window: Duration,

    last_sent_seq: u64,
    acked: Option<u64>,
    sent: u64,
    discarded: u64,
}

impl ConnectionController {
    pub fn new(
        config: TransportConfig,
        session: Session,
        factory: Box<dyn TransportFactory>,
        scheduler: Box<dyn Scheduler>,
        clock: Arc<dyn Clock>,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        let buffer = RetryBuffer::new(config.buffer_limit);
        Self {
            sequencer: Sequencer::new(Arc::clone(&clock)),
            buffer,
            config,
            session,
            state: ConnectionState::Disconnected,
            can_send: false,
            termination: None,
            pending_close: None,
            factory,
            scheduler,
            clock,
            rng,
            on_close: None,
            transport: None,
            connection: ConnectionId(0),
            ever_opened: false,
            next_timer: 0,
            keepalive_timer: None,
            reconnect_timer: None,
            close_timer: None,
            attempt: 0,
            window_started_ms: 0,
            scheduled_in_window: Duration::ZERO,
            last_sent_seq: 0,
            acked: None,
            sent: 0,
            discarded: 0,
        }
    }

    pub fn set_close_callback(&mut self, callback: CloseCallback) {
        self.on_close = Some(callback);
    }

    // ─── Accessors ──────────────────────────────────────────────────────

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether the server's initial ack has been received on this connection.
    pub fn can_send(&self) -> bool {
        self.can_send
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Generation of the current (or last) transport.
    pub fn connection_id(&self) -> ConnectionId {
        self.connection
    }

    pub fn termination(&self) -> Option<TerminationCause> {
        self.termination
    }

    pub fn buffer(&self) -> &RetryBuffer {
        &self.buffer
    }

    pub fn stats(&self) -> TraceStats {
        TraceStats {
            state: self.state,
            buffered: self.buffer.len(),
            dropped: self.buffer.dropped(),
            discarded: self.discarded,
            sent: self.sent,
            acked: self.acked,
            reconnect_attempts: self.attempt,
            next_sequence: self.sequencer.peek(),
        }
    }

    // ─── Owner operations ───────────────────────────────────────────────

    /// Open a transport.
    ///
    /// No-op while a transport is connecting or open. From `ReconnectWait`
    /// the pending backoff is skipped. From `Closing` the unconfirmed close
    /// is finished first. From `Terminated` the reconnect budget starts over.
    pub fn connect(&mut self) {
        if self.state == ConnectionState::Closing {
            self.abandon_close("superseded by connect");
        }
        match self.state {
            ConnectionState::Connecting | ConnectionState::Open => {
                tracing::debug!(state = %self.state, "connect ignored, transport already exists");
            }
            ConnectionState::ReconnectWait => {
                self.cancel_reconnect_timer();
                self.open_transport(true);
            }
            ConnectionState::Disconnected
            | ConnectionState::Closing
            | ConnectionState::Terminated => {
                self.termination = None;
                self.reset_budget();
                let is_reconnect = self.ever_opened;
                self.open_transport(is_reconnect);
            }
        }
    }

    /// End the session. Pending timers are cancelled and the buffer is torn
    /// down immediately; nothing is sent afterwards.
    pub fn close(&mut self) {
        if self.state == ConnectionState::Closing {
            return;
        }
        self.cancel_timers();
        self.buffer.clear();
        self.termination = Some(TerminationCause::ClosedByOwner);

        if self.transport.is_some() {
            self.begin_close(CONFERENCE_LEAVE_CODE, "session closed", TerminationCause::ClosedByOwner);
        } else {
            self.set_state(ConnectionState::Terminated);
        }
    }

    /// Stamp and buffer one payload, sending it right away when the
    /// connection is ready. Never fails; refusals are counted instead.
    pub fn record(&mut self, payload: EnvelopePayload) {
        if !self.accepts_records() {
            self.discarded += 1;
            events::record_discarded(self.state);
            return;
        }
        if self.buffer.is_full() {
            self.buffer.record_drop();
            events::envelope_dropped(self.buffer.capacity(), self.buffer.dropped());
            return;
        }

        let envelope = self
            .sequencer
            .next(EnvelopeDraft::new(self.session.clone(), payload));
        let frame = self.ready().then(|| encode_envelope(&envelope));
        let seq = envelope.sequence_number();
        self.buffer.append(envelope);

        match frame {
            Some(Ok(frame)) => {
                self.send_frame(&frame, Some(seq));
            }
            Some(Err(e)) => tracing::warn!(error = %e, seq, "envelope encoding failed"),
            None => {}
        }
    }

    /// Move to a child session. Buffered envelopes that were never sent are
    /// relabelled; the sequence counter keeps running.
    pub fn reparent(&mut self, session_id: impl Into<String>) {
        let child = self.session.reparent(session_id);
        let rewritten = self.buffer.relabel_unsent(self.last_sent_seq, &child);
        events::session_reparented(&self.session.session_id, &child.session_id, rewritten);
        self.session = child;
    }

    // ─── Inbound events ─────────────────────────────────────────────────

    /// Feed an event from the transport opened as `connection`. Events from
    /// replaced transports are ignored.
    pub fn handle_transport_event(&mut self, connection: ConnectionId, event: TransportEvent) {
        if connection != self.connection || self.transport.is_none() {
            tracing::trace!(%connection, current = %self.connection, "ignoring stale transport event");
            return;
        }
        match event {
            TransportEvent::Open => self.handle_open(),
            TransportEvent::Message(frame) => self.handle_message(&frame),
            TransportEvent::Closed(close) => self.handle_close(close),
        }
    }

    /// A timer armed by this controller fired.
    pub fn handle_timer(&mut self, id: TimerId) {
        if self.keepalive_timer == Some(id) && self.state == ConnectionState::Open {
            match encode_keepalive(&self.session.session_id) {
                Ok(frame) => {
                    self.send_frame(&frame, None);
                }
                Err(e) => tracing::warn!(error = %e, "keepalive encoding failed"),
            }
        } else if self.reconnect_timer == Some(id) && self.state == ConnectionState::ReconnectWait {
            self.reconnect_timer = None;
            self.open_transport(true);
        } else if self.close_timer == Some(id) && self.state == ConnectionState::Closing {
            self.close_timer = None;
            self.abandon_close("close timed out");
        } else {
            tracing::trace!(timer = %id, "ignoring stale timer");
        }
    }

    fn handle_open(&mut self) {
        if self.state != ConnectionState::Connecting {
            return;
        }
        self.ever_opened = true;
        self.set_state(ConnectionState::Open);
        let id = self.allocate_timer();
        self.scheduler
            .arm(id, TimerKind::Keepalive, self.config.ping_interval());
        self.keepalive_timer = Some(id);
    }

    fn handle_message(&mut self, frame: &str) {
        if self.state != ConnectionState::Open {
            return;
        }
        match decode_server_message(frame) {
            Ok(ServerMessage::SequenceNumber(ack)) => self.handle_ack(ack),
            Err(e) => events::malformed_frame(&e.to_string()),
        }
    }

    fn handle_ack(&mut self, ack: SequenceAck) {
        match self.buffer.prune_up_to(ack.value) {
            Ok(removed) => {
                events::buffer_pruned(ack.value, removed, self.buffer.len());
            }
            Err(ProtocolError::SequenceGap { acked, first, last }) => {
                events::sequence_gap(acked, first, last);
                self.buffer.clear();
                self.begin_close(DUMP_ERROR_CODE, "sequence gap", TerminationCause::SequenceGap);
                return;
            }
            Err(e) => {
                events::malformed_frame(&e.to_string());
                return;
            }
        }
        self.acked = Some(ack.value);

        if ack.is_initial() {
            self.reset_budget();
            self.can_send = true;
            self.flush();
        }
    }

    fn handle_close(&mut self, close: CloseEvent) {
        events::connection_closed(close.code, &close.reason);
        self.cancel_keepalive_timer();
        self.transport = None;
        self.can_send = false;

        let notice = if let Some(pending) = self.pending_close.take() {
            self.terminate(pending.cause);
            CloseNotice {
                code: pending.code,
                reason: pending.reason,
                outcome: CloseOutcome::Terminated(pending.cause),
            }
        } else if !close.is_retryable() {
            self.buffer.clear();
            self.terminate(TerminationCause::DoNotRetry);
            CloseNotice {
                code: close.code,
                reason: close.reason,
                outcome: CloseOutcome::Terminated(TerminationCause::DoNotRetry),
            }
        } else {
            let outcome = self.schedule_reconnect();
            CloseNotice {
                code: close.code,
                reason: close.reason,
                outcome,
            }
        };

        if let Some(callback) = self.on_close.as_mut() {
            callback(&notice);
        }
    }

    // ─── Internals ──────────────────────────────────────────────────────

    fn open_transport(&mut self, is_reconnect: bool) {
        self.connection = ConnectionId(self.connection.0 + 1);
        self.can_send = false;
        self.set_state(ConnectionState::Connecting);

        let span = crate::connect_span!(self.connection, is_reconnect);
        let _guard = span.enter();

        let request = build_request(&self.config, &self.session, is_reconnect);
        match self.factory.open(self.connection, &request) {
            Ok(transport) => self.transport = Some(transport),
            Err(e) => {
                let reason = e.to_string();
                events::connect_failed(&reason);
                self.handle_close(CloseEvent::new(ABNORMAL_CLOSURE_CODE, reason));
            }
        }
    }

    fn schedule_reconnect(&mut self) -> CloseOutcome {
        let budget = self.config.reconnect_budget();
        let elapsed = self.elapsed_in_window();
        let remaining = budget.saturating_sub(elapsed.max(self.scheduled_in_window));

        if remaining.is_zero() {
            events::reconnect_budget_exhausted(self.attempt, elapsed);
            self.terminate(TerminationCause::BudgetExhausted);
            return CloseOutcome::Terminated(TerminationCause::BudgetExhausted);
        }

        let spread = jitter(&mut *self.rng, self.config.backoff_jitter());
        let delay = backoff_delay(self.attempt, self.config.backoff_base(), spread, remaining);
        self.attempt += 1;
        self.scheduled_in_window += delay;

        self.set_state(ConnectionState::ReconnectWait);
        let id = self.allocate_timer();
        self.scheduler.arm(id, TimerKind::Reconnect, delay);
        self.reconnect_timer = Some(id);
        events::reconnect_scheduled(self.attempt, delay, remaining);

        CloseOutcome::Reconnecting {
            attempt: self.attempt,
            delay,
        }
    }

    /// Ask the transport to close and wait for it in `Closing`.
    fn begin_close(&mut self, code: u16, reason: &str, cause: TerminationCause) {
        self.cancel_timers();
        self.can_send = false;
        self.termination = Some(cause);
        self.pending_close = Some(PendingClose {
            code,
            reason: reason.to_string(),
            cause,
        });
        self.set_state(ConnectionState::Closing);
        if let Some(transport) = self.transport.as_mut() {
            transport.close(code, reason);
        }
        let id = self.allocate_timer();
        self.scheduler
            .arm(id, TimerKind::CloseDeadline, self.config.close_timeout());
        self.close_timer = Some(id);
    }

    /// Finish a requested close without the peer's confirmation. Anything the
    /// old transport reports afterwards is stale.
    fn abandon_close(&mut self, reason: &str) {
        events::close_abandoned(reason);
        self.transport = None;
        self.handle_close(CloseEvent::new(ABNORMAL_CLOSURE_CODE, reason));
    }

    fn terminate(&mut self, cause: TerminationCause) {
        self.cancel_timers();
        self.termination = Some(cause);
        self.set_state(ConnectionState::Terminated);
    }

    fn flush(&mut self) {
        let span = crate::flush_span!(self.connection, self.buffer.len());
        let _guard = span.enter();

        let frames: Vec<(u64, String)> = self
            .buffer
            .drain_in_order()
            .filter_map(|envelope| match encode_envelope(envelope) {
                Ok(frame) => Some((envelope.sequence_number(), frame)),
                Err(e) => {
                    tracing::warn!(error = %e, "envelope encoding failed");
                    None
                }
            })
            .collect();

        let mut flushed = 0;
        for (seq, frame) in &frames {
            if !self.send_frame(frame, Some(*seq)) {
                break;
            }
            flushed += 1;
        }
        events::buffer_flushed(flushed);
    }

    /// Returns `false` if the transport rejected the frame.
    fn send_frame(&mut self, frame: &str, seq: Option<u64>) -> bool {
        let Some(transport) = self.transport.as_mut() else {
            return false;
        };
        match transport.send(frame) {
            Ok(()) => {
                self.sent += 1;
                if let Some(seq) = seq {
                    self.last_sent_seq = self.last_sent_seq.max(seq);
                }
                true
            }
            Err(e) => {
                events::send_failed(&e.to_string());
                false
            }
        }
    }

    fn ready(&self) -> bool {
        self.state == ConnectionState::Open && self.can_send
    }

    /// Records are buffered in every state except `Closing` and after a
    /// termination that tore the buffer down.
    fn accepts_records(&self) -> bool {
        match self.state {
            ConnectionState::Closing => false,
            ConnectionState::Terminated => {
                self.termination == Some(TerminationCause::BudgetExhausted)
            }
            _ => true,
        }
    }

    fn reset_budget(&mut self) {
        self.attempt = 0;
        self.window_started_ms = self.clock.now_ms();
        self.scheduled_in_window = Duration::ZERO;
    }

    fn elapsed_in_window(&self) -> Duration {
        Duration::from_millis(self.clock.now_ms().saturating_sub(self.window_started_ms))
    }

    fn allocate_timer(&mut self) -> TimerId {
        self.next_timer += 1;
        TimerId(self.next_timer)
    }

    fn cancel_keepalive_timer(&mut self) {
        if let Some(id) = self.keepalive_timer.take() {
            self.scheduler.cancel(id);
        }
    }

    fn cancel_reconnect_timer(&mut self) {
        if let Some(id) = self.reconnect_timer.take() {
            self.scheduler.cancel(id);
        }
    }

    fn cancel_timers(&mut self) {
        self.cancel_keepalive_timer();
        self.cancel_reconnect_timer();
        if let Some(id) = self.close_timer.take() {
            self.scheduler.cancel(id);
        }
    }

    fn set_state(&mut self, to: ConnectionState) {
        if self.state != to {
            events::state_changed(self.state, to);
            self.state = to;
        }
    }
}

impl Drop for ConnectionController {
    fn drop(&mut self) {
        self.cancel_timers();
        if let Some(mut transport) = self.transport.take() {
            transport.close(CONFERENCE_LEAVE_CODE, "client dropped");
        }
    }
}

impl std::fmt::Debug for ConnectionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionController")
            .field("session", &self.session)
            .field("state", &self.state)
            .field("can_send", &self.can_send)
            .field("connection", &self.connection)
            .field("buffer", &self.buffer)
            .field("sequencer", &self.sequencer)
            .finish_non_exhaustive()
    }
}
