//! WebSocket transport to the System Bridge backend.
//!
//! One [`WebSocketTransport`] owns at most one live session.  A session is
//! three pieces wired together when `connect()` succeeds:
//!
//! ```text
//!               outbound mpsc                      inbound mpsc
//! send() ───► [ writer task ] ──► socket ──► [ reader task ] ───► receive()
//!                  │  ping every heartbeat         │ pong clears the deadline
//!                  └──────── close reason (watch) ◄┘
//! ```
//!
//! - The **writer task** drains the outbound channel in order and sends a
//!   WebSocket ping every heartbeat period.  If the pong has not arrived
//!   half a period later, it records a heartbeat timeout and stops.
//! - The **reader task** decodes text frames into envelopes and forwards them
//!   on the inbound channel.  Control frames are consumed here, so pongs are
//!   observed even when nobody is calling `receive()`.
//! - The inbound channel holds at most [`INBOUND_CAPACITY`] envelopes.  When
//!   it is full the reader stops reading the socket, which pushes back on the
//!   backend through TCP.  Pongs queue up behind the unread frames, so a
//!   consumer that stalls for longer than half a heartbeat period ends the
//!   session with a heartbeat timeout.
//! - The **close reason** is a `watch` channel.  The first party to record a
//!   reason wins; `receive()` races it against the inbound channel so a local
//!   `close()` interrupts a suspended receive immediately.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use sysbridge_core::{decode_inbound, InboundEnvelope, ModelRegistry};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use crate::application::{ProtocolClient, Transport};
use crate::domain::{ConnectorConfig, ConnectorError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type InboundItem = Result<InboundEnvelope, ConnectorError>;

/// How long `close()` waits for the session tasks before aborting them.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Envelopes the reader may queue ahead of `receive()`.
pub const INBOUND_CAPACITY: usize = 1024;

/// A protocol client over a real WebSocket.
pub type WebSocketClient = ProtocolClient<WebSocketTransport>;

/// Builds a [`WebSocketClient`] for `config` with every module registered.
///
/// # Example
///
/// ```no_run
/// use sysbridge_connector::domain::{ApiKey, ConnectorConfig};
/// use sysbridge_connector::infrastructure::websocket_client;
///
/// # async fn example() -> Result<(), sysbridge_connector::domain::ConnectorError> {
/// let client = websocket_client(&ConnectorConfig::new("127.0.0.1", 9170, ApiKey::new("key")));
/// client.connect().await?;
/// client.register_data_listener(&["battery"]).await?;
/// # Ok(())
/// # }
/// ```
pub fn websocket_client(config: &ConnectorConfig) -> WebSocketClient {
    ProtocolClient::new(
        WebSocketTransport::new(config),
        config.api_key.clone(),
        ModelRegistry::standard(),
        &config.endpoint(),
    )
}

// ── Close reasons ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum CloseReason {
    /// `close()` was called.
    Local,
    /// The backend sent a close frame or the stream ended.
    Peer,
    HeartbeatTimeout,
    /// The socket failed with a protocol or I/O error.
    Failed(String),
}

impl CloseReason {
    /// Local and heartbeat closes abandon frames still queued for `receive()`;
    /// peer closes and failures let them drain first.
    fn preempts_queue(&self) -> bool {
        matches!(self, CloseReason::Local | CloseReason::HeartbeatTimeout)
    }

    /// Classifies a socket error.  The backend going away without a closing
    /// handshake (a crash, a killed process) counts as a peer close.
    fn from_ws_error(err: &WsError) -> Self {
        let hangup = match err {
            WsError::ConnectionClosed
            | WsError::AlreadyClosed
            | WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake) => true,
            WsError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        };
        if hangup {
            CloseReason::Peer
        } else {
            CloseReason::Failed(err.to_string())
        }
    }

    fn to_error(&self) -> ConnectorError {
        match self {
            CloseReason::Local => ConnectorError::not_connected(),
            CloseReason::Peer => ConnectorError::closed_by_server(),
            CloseReason::HeartbeatTimeout => {
                ConnectorError::Connection("heartbeat timed out waiting for pong".to_string())
            }
            CloseReason::Failed(reason) => ConnectorError::Connection(reason.clone()),
        }
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

/// State shared between the session handle and its two tasks.
struct Shared {
    reason: watch::Sender<Option<CloseReason>>,
    awaiting_pong: AtomicBool,
}

impl Shared {
    fn new() -> Self {
        let (reason, _) = watch::channel(None);
        Self {
            reason,
            awaiting_pong: AtomicBool::new(false),
        }
    }

    fn is_open(&self) -> bool {
        self.reason.borrow().is_none()
    }

    /// Records `reason` unless one is already recorded.  Returns whether this
    /// call was the one that closed the session.
    fn mark_closed(&self, reason: CloseReason) -> bool {
        self.reason.send_if_modified(|current| {
            if current.is_none() {
                *current = Some(reason);
                true
            } else {
                false
            }
        })
    }

    fn close_error(&self) -> ConnectorError {
        self.reason
            .borrow()
            .as_ref()
            .map(CloseReason::to_error)
            .unwrap_or_else(ConnectorError::closed_by_server)
    }
}

struct Session {
    shared: Arc<Shared>,
    outbound: mpsc::UnboundedSender<Message>,
    inbound: Mutex<mpsc::Receiver<InboundItem>>,
    tasks: StdMutex<Vec<JoinHandle<()>>>,
}

impl Session {
    fn start(stream: WsStream, heartbeat: Duration) -> Self {
        let (sink, stream) = stream.split();
        let shared = Arc::new(Shared::new());
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::channel(INBOUND_CAPACITY);

        let writer = tokio::spawn(run_writer(sink, out_rx, Arc::clone(&shared), heartbeat));
        let reader = tokio::spawn(run_reader(stream, in_tx, Arc::clone(&shared)));

        Self {
            shared,
            outbound: out_tx,
            inbound: Mutex::new(in_rx),
            tasks: StdMutex::new(vec![writer, reader]),
        }
    }

    async fn receive(&self) -> InboundItem {
        let mut reason = self.shared.reason.subscribe();
        let mut inbound = self.inbound.lock().await;
        loop {
            let preempting = reason
                .borrow_and_update()
                .clone()
                .filter(CloseReason::preempts_queue);
            if let Some(closed) = preempting {
                return Err(closed.to_error());
            }

            tokio::select! {
                changed = reason.changed() => {
                    if changed.is_err() {
                        return Err(self.shared.close_error());
                    }
                }
                item = inbound.recv() => {
                    // `None` means the reader task has finished and everything
                    // it queued has been handed out.
                    return item.unwrap_or_else(|| Err(self.shared.close_error()));
                }
            }
        }
    }

    async fn shutdown(&self) {
        if self.shared.mark_closed(CloseReason::Local) {
            // Ignored when the writer has already stopped.
            let _ = self.outbound.send(Message::Close(None));
        }
        let tasks = std::mem::take(&mut *lock(&self.tasks));
        for mut task in tasks {
            if time::timeout(CLOSE_GRACE, &mut task).await.is_err() {
                warn!("session task did not stop within {CLOSE_GRACE:?}; aborting");
                task.abort();
            }
        }
    }
}

async fn run_writer(
    mut sink: SplitSink<WsStream, Message>,
    mut outbound: mpsc::UnboundedReceiver<Message>,
    shared: Arc<Shared>,
    heartbeat: Duration,
) {
    let mut reason = shared.reason.subscribe();
    let heartbeat_enabled = !heartbeat.is_zero();
    // `interval` rejects a zero period; the branch is disabled in that case.
    let mut ticker = time::interval(heartbeat.max(Duration::from_millis(1)));
    ticker.tick().await; // Skip the immediate first tick.
    let mut pong_deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            biased;

            message = outbound.recv() => {
                let Some(message) = message else { break };
                let is_close = matches!(message, Message::Close(_));
                if let Err(e) = sink.send(message).await {
                    debug!("WebSocket send failed: {e}");
                    shared.mark_closed(CloseReason::from_ws_error(&e));
                    break;
                }
                if is_close {
                    break;
                }
            }

            _ = reason.changed() => {
                if !shared.is_open() {
                    break;
                }
            }

            _ = time::sleep_until(pong_deadline.unwrap_or_else(Instant::now)), if pong_deadline.is_some() => {
                if shared.awaiting_pong.load(Ordering::Acquire) {
                    warn!("no pong within {:?}; closing session", heartbeat / 2);
                    shared.mark_closed(CloseReason::HeartbeatTimeout);
                    break;
                }
                pong_deadline = None;
            }

            _ = ticker.tick(), if heartbeat_enabled => {
                shared.awaiting_pong.store(true, Ordering::Release);
                if let Err(e) = sink.send(Message::Ping(Vec::new())).await {
                    debug!("WebSocket ping failed: {e}");
                    shared.mark_closed(CloseReason::from_ws_error(&e));
                    break;
                }
                pong_deadline = Some(Instant::now() + heartbeat / 2);
            }
        }
    }

    // Sends a close frame if the socket is still writable.
    let _ = sink.close().await;
}

async fn run_reader(
    mut stream: SplitStream<WsStream>,
    inbound: mpsc::Sender<InboundItem>,
    shared: Arc<Shared>,
) {
    let mut reason = shared.reason.subscribe();
    loop {
        let frame = tokio::select! {
            changed = reason.changed() => {
                if changed.is_err() || preempted(&reason) {
                    break;
                }
                continue;
            }
            frame = stream.next() => frame,
        };

        let item = match frame {
            Some(Ok(Message::Text(text))) => decode_inbound(&text).map_err(ConnectorError::from),
            Some(Ok(Message::Binary(data))) => Err(ConnectorError::MalformedMessage(format!(
                "unexpected binary frame ({} bytes)",
                data.len()
            ))),
            Some(Ok(Message::Pong(_))) => {
                shared.awaiting_pong.store(false, Ordering::Release);
                continue;
            }
            Some(Ok(Message::Ping(_) | Message::Frame(_))) => continue,
            Some(Ok(Message::Close(frame))) => {
                debug!(?frame, "backend sent close frame");
                shared.mark_closed(CloseReason::Peer);
                break;
            }
            None => {
                shared.mark_closed(CloseReason::Peer);
                break;
            }
            Some(Err(e)) => {
                let closed = CloseReason::from_ws_error(&e);
                if closed == CloseReason::Peer {
                    debug!("backend went away without a close frame: {e}");
                } else {
                    warn!("WebSocket receive failed: {e}");
                }
                shared.mark_closed(closed);
                break;
            }
        };

        if !forward(&inbound, item, &mut reason).await {
            break;
        }
    }
}

/// Queues `item` for `receive()`, waiting while the queue is full.  Returns
/// `false` when the reader should stop instead.
async fn forward(
    inbound: &mpsc::Sender<InboundItem>,
    item: InboundItem,
    reason: &mut watch::Receiver<Option<CloseReason>>,
) -> bool {
    let send = inbound.send(item);
    tokio::pin!(send);
    loop {
        tokio::select! {
            sent = &mut send => return sent.is_ok(),
            changed = reason.changed() => {
                if changed.is_err() || preempted(reason) {
                    return false;
                }
            }
        }
    }
}

fn preempted(reason: &watch::Receiver<Option<CloseReason>>) -> bool {
    reason.borrow().as_ref().is_some_and(CloseReason::preempts_queue)
}

fn lock<T>(mutex: &StdMutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Transport ─────────────────────────────────────────────────────────────────

/// [`Transport`] over `ws://host:port/api/websocket`.
pub struct WebSocketTransport {
    url: String,
    heartbeat: Duration,
    session: StdMutex<Option<Arc<Session>>>,
}

impl WebSocketTransport {
    pub fn new(config: &ConnectorConfig) -> Self {
        Self {
            url: config.endpoint_url(),
            heartbeat: config.heartbeat_interval,
            session: StdMutex::new(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn current(&self) -> Option<Arc<Session>> {
        lock(&self.session).clone()
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn connect(&self) -> Result<(), ConnectorError> {
        let (stream, _response) = connect_async(self.url.as_str()).await.map_err(|e| {
            error!("failed to connect to WebSocket at {}: {e}", self.url);
            ConnectorError::Connection(e.to_string())
        })?;
        info!("WebSocket connected to {}", self.url);

        let session = Arc::new(Session::start(stream, self.heartbeat));
        let previous = lock(&self.session).replace(session);
        if let Some(previous) = previous {
            previous.shutdown().await;
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.current().is_some_and(|s| s.shared.is_open())
    }

    async fn send(&self, text: String) -> Result<(), ConnectorError> {
        let session = self
            .current()
            .filter(|s| s.shared.is_open())
            .ok_or_else(ConnectorError::not_connected)?;
        session
            .outbound
            .send(Message::Text(text))
            .map_err(|_| ConnectorError::not_connected())
    }

    async fn receive(&self) -> Result<InboundEnvelope, ConnectorError> {
        let session = self.current().ok_or_else(ConnectorError::not_connected)?;
        session.receive().await
    }

    async fn close(&self) {
        let session = lock(&self.session).take();
        if let Some(session) = session {
            session.shutdown().await;
            debug!("WebSocket session to {} closed", self.url);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
