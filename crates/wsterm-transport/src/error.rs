/// Errors that can occur in message transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The URL could not be parsed.
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The URL scheme is not supported.
    #[error("unsupported url scheme {0:?} (expected \"ws\")")]
    UnsupportedScheme(String),

    /// Failed to bind to the specified address.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    /// Failed to connect to the specified address.
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        source: std::io::Error,
    },

    /// Failed to accept an incoming connection.
    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),

    /// The WebSocket opening handshake failed.
    #[error("websocket handshake with {peer} failed: {message}")]
    Handshake { peer: String, message: String },

    /// A WebSocket protocol error occurred on an open connection.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport has been shut down.
    #[error("transport shut down")]
    Shutdown,
}

impl TransportError {
    pub(crate) fn bind(addr: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }

    pub(crate) fn handshake(peer: impl ToString, message: impl ToString) -> Self {
        Self::Handshake {
            peer: peer.to_string(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
