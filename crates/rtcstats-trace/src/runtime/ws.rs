//! Websocket transport over `tokio-tungstenite`.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header, HeaderValue};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

use rtcstats_core::constants::ABNORMAL_CLOSURE_CODE;
use rtcstats_core::errors::TransportError;
use rtcstats_core::models::{CloseEvent, ConnectionId, HandshakeRequest, TransportEvent};
use rtcstats_core::traits::{Transport, TransportFactory};

use super::{DriverEvent, DriverSender};

#[derive(Debug)]
enum Outbound {
    Text(String),
    Close(u16, String),
}

/// Opens one websocket task per connection attempt.
#[derive(Debug)]
pub struct WsTransportFactory {
    events: DriverSender,
    close_timeout: Duration,
}

impl WsTransportFactory {
    /// `close_timeout` bounds the wait for the peer to confirm a close.
    pub(crate) fn new(events: DriverSender, close_timeout: Duration) -> Self {
        Self {
            events,
            close_timeout,
        }
    }
}

impl TransportFactory for WsTransportFactory {
    fn open(
        &mut self,
        connection: ConnectionId,
        request: &HandshakeRequest,
    ) -> Result<Box<dyn Transport>, TransportError> {
        let connect_failed = |reason: String| TransportError::ConnectFailed {
            url: request.url.clone(),
            reason,
        };

        let mut http = request
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| connect_failed(e.to_string()))?;
        let protocol =
            HeaderValue::from_str(&request.protocol).map_err(|e| connect_failed(e.to_string()))?;
        let user_agent =
            HeaderValue::from_str(&request.user_agent).map_err(|e| connect_failed(e.to_string()))?;
        http.headers_mut().insert(header::SEC_WEBSOCKET_PROTOCOL, protocol);
        http.headers_mut().insert(header::USER_AGENT, user_agent);

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_socket(
            connection,
            http,
            outbound_rx,
            self.events.clone(),
            self.close_timeout,
        ));

        Ok(Box::new(WsTransport {
            outbound: outbound_tx,
        }))
    }
}

/// Sending half of a websocket task.
#[derive(Debug)]
pub struct WsTransport {
    outbound: mpsc::UnboundedSender<Outbound>,
}

impl Transport for WsTransport {
    fn send(&mut self, frame: &str) -> Result<(), TransportError> {
        self.outbound
            .send(Outbound::Text(frame.to_string()))
            .map_err(|_| TransportError::Closed)
    }

    fn close(&mut self, code: u16, reason: &str) {
        let _ = self.outbound.send(Outbound::Close(code, reason.to_string()));
    }
}

async fn run_socket(
    connection: ConnectionId,
    request: tokio_tungstenite::tungstenite::handshake::client::Request,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    events: DriverSender,
    close_timeout: Duration,
) {
    let report = |event: TransportEvent| {
        let _ = events.send(DriverEvent::Transport(connection, event));
    };

    let socket = match tokio_tungstenite::connect_async(request).await {
        Ok((socket, _response)) => socket,
        Err(e) => {
            report(TransportEvent::Closed(CloseEvent::new(
                ABNORMAL_CLOSURE_CODE,
                e.to_string(),
            )));
            return;
        }
    };
    report(TransportEvent::Open);

    let (mut sink, mut stream) = socket.split();
    let close = loop {
        tokio::select! {
            out = outbound.recv() => match out {
                Some(Outbound::Text(frame)) => {
                    if let Err(e) = sink.send(Message::Text(frame)).await {
                        break CloseEvent::new(ABNORMAL_CLOSURE_CODE, e.to_string());
                    }
                }
                Some(Outbound::Close(code, reason)) => {
                    let frame = CloseFrame {
                        code: CloseCode::from(code),
                        reason: reason.clone().into(),
                    };
                    let _ = sink.send(Message::Close(Some(frame))).await;
                    let requested = CloseEvent::new(code, reason);
                    let confirmed =
                        tokio::time::timeout(close_timeout, wait_for_close(&mut stream, requested.clone()))
                            .await;
                    break confirmed.unwrap_or(requested);
                }
                None => {
                    let _ = sink.close().await;
                    return;
                }
            },
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => report(TransportEvent::Message(text)),
                Some(Ok(Message::Close(frame))) => break close_event(frame),
                Some(Ok(_)) => {}
                Some(Err(e)) => break CloseEvent::new(ABNORMAL_CLOSURE_CODE, e.to_string()),
                None => break CloseEvent::new(ABNORMAL_CLOSURE_CODE, "connection reset"),
            },
        }
    };
    report(TransportEvent::Closed(close));
}

/// Drain the stream until the peer confirms the close. The peer's code wins
/// if it sends one.
async fn wait_for_close<S>(stream: &mut S, requested: CloseEvent) -> CloseEvent
where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Close(Some(frame))) => return close_event(Some(frame)),
            Ok(Message::Close(None)) | Err(_) => break,
            Ok(_) => {}
        }
    }
    requested
}

fn close_event(frame: Option<CloseFrame<'_>>) -> CloseEvent {
    match frame {
        Some(frame) => CloseEvent::new(u16::from(frame.code), frame.reason.to_string()),
        None => CloseEvent::new(ABNORMAL_CLOSURE_CODE, "closed without status"),
    }
}
