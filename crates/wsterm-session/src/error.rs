/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A send was attempted while the transport is not open.
    #[error("transport unavailable")]
    TransportUnavailable,

    /// The session has ended; no further input or output is accepted.
    #[error("session closed")]
    SessionClosed,

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] wsterm_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] wsterm_frame::FrameError),

    /// Writing to the terminal surface failed.
    #[error("terminal write failed: {0}")]
    Terminal(#[source] std::io::Error),

    /// A producer thread could not be started.
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SessionError>;
