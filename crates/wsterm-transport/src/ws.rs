use std::fmt;
use std::io::{self, ErrorKind};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info};
use tungstenite::http::Uri;
use tungstenite::protocol::WebSocketConfig;
use tungstenite::{Message, WebSocket};

use crate::error::{Result, TransportError};
use crate::traits::{Incoming, MessageSource, MessageTransport};

/// Default maximum message size: 1 MiB.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Configuration for WebSocket connections.
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// Maximum inbound message size in bytes. Default: 1 MiB.
    pub max_message_size: usize,
    /// How long a `recv` call waits for data before returning `None`.
    pub poll_interval: Duration,
    /// TCP connect and opening handshake timeout.
    pub connect_timeout: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            poll_interval: Duration::from_millis(10),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl WsConfig {
    fn websocket_config(&self) -> WebSocketConfig {
        WebSocketConfig::default()
            .max_message_size(Some(self.max_message_size))
            .max_frame_size(Some(self.max_message_size))
    }

    fn read_timeout(&self) -> Duration {
        // A zero read timeout is rejected by the OS.
        self.poll_interval.max(Duration::from_millis(1))
    }
}

/// A WebSocket connection carrying binary messages.
///
/// Cloning yields another handle to the same socket, so one clone can sit in
/// a receive loop while another sends. Each call holds the socket lock only
/// for a single read (bounded by the poll interval) or a single write.
#[derive(Clone)]
pub struct WsConnection {
    shared: Arc<Shared>,
}

struct Shared {
    socket: Mutex<WebSocket<TcpStream>>,
    open: AtomicBool,
    peer: String,
}

impl WsConnection {
    /// Connect to a `ws://` URL and complete the client handshake (blocking).
    pub fn connect(url: &str, config: &WsConfig) -> Result<Self> {
        let (host, port) = parse_ws_url(url)?;
        let stream =
            connect_tcp(&host, port, config.connect_timeout).map_err(|source| {
                TransportError::Connect {
                    url: url.to_string(),
                    source,
                }
            })?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(config.connect_timeout))?;

        let (socket, _response) =
            tungstenite::client::client_with_config(url, stream, Some(config.websocket_config()))
                .map_err(|err| TransportError::handshake(url, err))?;
        socket.get_ref().set_read_timeout(Some(config.read_timeout()))?;

        info!(url, "connected to websocket peer");
        Ok(Self::from_socket(socket, url.to_string()))
    }

    fn from_socket(socket: WebSocket<TcpStream>, peer: String) -> Self {
        Self {
            shared: Arc::new(Shared {
                socket: Mutex::new(socket),
                open: AtomicBool::new(true),
                peer,
            }),
        }
    }

    /// The URL or address of the remote side.
    pub fn peer(&self) -> &str {
        &self.shared.peer
    }

    /// Send a close frame and mark the connection closed. Idempotent.
    pub fn close(&self) {
        if !self.shared.open.swap(false, Ordering::SeqCst) {
            return;
        }
        let mut socket = self.lock();
        match socket.close(None) {
            Ok(()) => {}
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {}
            Err(err) => debug!(peer = %self.shared.peer, error = %err, "close frame not sent"),
        }
        let _ = socket.flush();
        debug!(peer = %self.shared.peer, "websocket closed");
    }

    fn lock(&self) -> MutexGuard<'_, WebSocket<TcpStream>> {
        self.shared
            .socket
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn mark_closed(&self) {
        if self.shared.open.swap(false, Ordering::SeqCst) {
            debug!(peer = %self.shared.peer, "peer closed websocket");
        }
    }
}

impl MessageTransport for WsConnection {
    fn send(&mut self, message: Bytes) -> Result<()> {
        if !self.is_open() {
            return Err(TransportError::Shutdown);
        }
        let result = self.lock().send(Message::Binary(message));
        match result {
            Ok(()) => Ok(()),
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                self.mark_closed();
                Err(TransportError::Shutdown)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn is_open(&self) -> bool {
        self.shared.open.load(Ordering::SeqCst)
    }
}

impl MessageSource for WsConnection {
    fn recv(&mut self) -> Result<Option<Incoming>> {
        if !self.is_open() {
            return Ok(Some(Incoming::Closed));
        }

        let result = self.lock().read();
        match result {
            Ok(Message::Binary(payload)) => Ok(Some(Incoming::Message(payload))),
            Ok(Message::Close(frame)) => {
                debug!(peer = %self.shared.peer, ?frame, "received close frame");
                self.mark_closed();
                Ok(Some(Incoming::Closed))
            }
            Ok(Message::Text(text)) => {
                debug!(len = text.len(), "ignoring text message");
                Ok(None)
            }
            Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => Ok(None),
            Err(tungstenite::Error::Io(err)) if is_poll_timeout(&err) => Ok(None),
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                self.mark_closed();
                Ok(Some(Incoming::Closed))
            }
            Err(err) => {
                self.mark_closed();
                Err(err.into())
            }
        }
    }
}

impl fmt::Debug for WsConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WsConnection")
            .field("peer", &self.shared.peer)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Accepts WebSocket connections on a TCP address.
pub struct WsListener {
    listener: TcpListener,
    config: WsConfig,
}

impl WsListener {
    /// Bind and listen on `addr` (e.g. `127.0.0.1:8080`).
    pub fn bind(addr: &str, config: WsConfig) -> Result<Self> {
        let listener = TcpListener::bind(addr).map_err(|err| TransportError::bind(addr, err))?;
        info!(addr, "listening for websocket connections");
        Ok(Self { listener, config })
    }

    /// The address actually bound (useful after binding port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept an incoming connection and complete the server handshake (blocking).
    pub fn accept(&self) -> Result<WsConnection> {
        let (stream, peer) = self.listener.accept().map_err(TransportError::Accept)?;
        self.handshake(stream, peer)
    }

    /// Switch the listener between blocking and non-blocking accepts.
    pub fn set_nonblocking(&self, nonblocking: bool) -> Result<()> {
        self.listener.set_nonblocking(nonblocking)?;
        Ok(())
    }

    /// Accept a waiting connection, if any.
    ///
    /// On a non-blocking listener this returns `Ok(None)` when nobody is
    /// waiting. The handshake itself always runs in blocking mode.
    pub fn poll_accept(&self) -> Result<Option<WsConnection>> {
        match self.listener.accept() {
            Ok((stream, peer)) => self.handshake(stream, peer).map(Some),
            Err(err) if err.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(err) => Err(TransportError::Accept(err)),
        }
    }

    fn handshake(&self, stream: TcpStream, peer: SocketAddr) -> Result<WsConnection> {
        // Accepted sockets may inherit non-blocking mode from the listener.
        stream.set_nonblocking(false)?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(self.config.connect_timeout))?;

        let socket =
            tungstenite::accept_with_config(stream, Some(self.config.websocket_config()))
                .map_err(|err| TransportError::handshake(peer, err))?;
        socket
            .get_ref()
            .set_read_timeout(Some(self.config.read_timeout()))?;

        debug!(%peer, "accepted websocket connection");
        Ok(WsConnection::from_socket(socket, peer.to_string()))
    }
}

fn parse_ws_url(url: &str) -> Result<(String, u16)> {
    let invalid = |reason: &str| TransportError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let uri: Uri = url.parse().map_err(|err: tungstenite::http::uri::InvalidUri| {
        invalid(&err.to_string())
    })?;
    match uri.scheme_str() {
        Some("ws") => {}
        Some(other) => return Err(TransportError::UnsupportedScheme(other.to_string())),
        None => return Err(invalid("missing scheme")),
    }
    let host = uri
        .host()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| invalid("missing host"))?;
    let host = host.trim_start_matches('[').trim_end_matches(']');

    Ok((host.to_string(), uri.port_u16().unwrap_or(80)))
}

fn connect_tcp(host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                debug!(%addr, error = %err, "connect attempt failed");
                last_err = Some(err);
            }
        }
    }
    Err(last_err
        .unwrap_or_else(|| io::Error::new(ErrorKind::NotFound, "host resolved to no addresses")))
}

fn is_poll_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}
