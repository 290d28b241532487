//! Tokio driver for the trace client.
//!
//! A single task owns the [`TelemetryClient`]: owner commands, socket events
//! and timer firings all arrive over channels and are applied one at a time,
//! so the retry buffer has exactly one writer.

mod scheduler;
mod ws;

pub use scheduler::TokioScheduler;
pub use ws::{WsTransport, WsTransportFactory};

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use rtcstats_core::config::TransportConfig;
use rtcstats_core::models::{CloseNotice, ConnectionId, Session, StatsSnapshot, TransportEvent};
use rtcstats_core::traits::TimerId;

use crate::client::TelemetryClient;
use crate::controller::TraceStats;

/// Events produced by sockets and timers.
#[derive(Debug)]
pub(crate) enum DriverEvent {
    Transport(ConnectionId, TransportEvent),
    Timer(TimerId),
}

pub(crate) type DriverSender = mpsc::UnboundedSender<DriverEvent>;

#[derive(Debug)]
enum Command {
    Identity(Value),
    Record {
        method: String,
        pc_id: Option<String>,
        data: Value,
    },
    Snapshot {
        pc_id: String,
        snapshot: StatsSnapshot,
    },
    ForgetPeer(String),
    Connect,
    Close,
    Reparent(String),
    Stats(oneshot::Sender<TraceStats>),
}

/// Cloneable handle to a running trace client. The driver stops once every
/// handle is dropped.
#[derive(Debug, Clone)]
pub struct TraceHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl TraceHandle {
    pub fn identity(&self, data: Value) {
        self.submit(Command::Identity(data));
    }

    pub fn record_event(&self, method: &str, pc_id: Option<&str>, data: Value) {
        self.submit(Command::Record {
            method: method.to_string(),
            pc_id: pc_id.map(str::to_string),
            data,
        });
    }

    pub fn record_snapshot(&self, pc_id: &str, snapshot: StatsSnapshot) {
        self.submit(Command::Snapshot {
            pc_id: pc_id.to_string(),
            snapshot,
        });
    }

    pub fn forget_peer(&self, pc_id: &str) {
        self.submit(Command::ForgetPeer(pc_id.to_string()));
    }

    pub fn connect(&self) {
        self.submit(Command::Connect);
    }

    pub fn close(&self) {
        self.submit(Command::Close);
    }

    pub fn reparent(&self, session_id: &str) {
        self.submit(Command::Reparent(session_id.to_string()));
    }

    /// Current diagnostics, or `None` if the driver has stopped.
    pub async fn stats(&self) -> Option<TraceStats> {
        let (tx, rx) = oneshot::channel();
        self.commands.send(Command::Stats(tx)).ok()?;
        rx.await.ok()
    }

    fn submit(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::debug!("trace driver stopped, command dropped");
        }
    }
}

/// Start a driver task over real websockets. Must be called from within a
/// tokio runtime.
pub fn spawn<F>(config: TransportConfig, session: Session, on_close: F) -> (TraceHandle, JoinHandle<()>)
where
    F: FnMut(&CloseNotice) + Send + 'static,
{
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let close_timeout = config.close_timeout();
    let client = TelemetryClient::builder(config)
        .session(session)
        .on_close(on_close)
        .build(
            Box::new(WsTransportFactory::new(event_tx.clone(), close_timeout)),
            Box::new(TokioScheduler::new(event_tx)),
        );

    let task = tokio::spawn(drive(client, command_rx, event_rx));
    (TraceHandle { commands: command_tx }, task)
}

async fn drive(
    mut client: TelemetryClient,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut events: mpsc::UnboundedReceiver<DriverEvent>,
) {
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(command) => apply(&mut client, command),
                None => break,
            },
            Some(event) = events.recv() => match event {
                DriverEvent::Transport(connection, event) => {
                    client.handle_transport_event(connection, event);
                }
                DriverEvent::Timer(id) => client.handle_timer(id),
            },
        }
    }
    tracing::debug!("all trace handles dropped, stopping driver");
}

fn apply(client: &mut TelemetryClient, command: Command) {
    match command {
        Command::Identity(data) => client.identity(data),
        Command::Record { method, pc_id, data } => {
            client.record_event(&method, pc_id.as_deref(), data);
        }
        Command::Snapshot { pc_id, snapshot } => client.record_snapshot(&pc_id, snapshot),
        Command::ForgetPeer(pc_id) => {
            client.forget_peer(&pc_id);
        }
        Command::Connect => client.connect(),
        Command::Close => client.close(),
        Command::Reparent(session_id) => client.reparent(session_id),
        Command::Stats(reply) => {
            let _ = reply.send(client.stats());
        }
    }
}
