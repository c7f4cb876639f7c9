use std::ops::ControlFlow;
use std::sync::mpsc::Receiver;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, warn};
use wsterm_transport::MessageTransport;

use crate::error::{Result, SessionError};
use crate::outbound::OutboundPipe;
use crate::router::{Dispatch, InboundRouter};
use crate::terminal::TerminalSurface;

/// One item on the session's event queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A terminal input event.
    Input(Bytes),
    /// A message received from the transport.
    Message(Bytes),
    /// The transport closed.
    Closed,
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub input_frames: u64,
    pub input_bytes: u64,
    pub stdout_frames: u64,
    pub stdout_bytes: u64,
    pub stderr_frames: u64,
    pub stderr_bytes: u64,
    pub dropped_malformed: u64,
    pub dropped_unknown_channel: u64,
    pub dropped_input: u64,
    /// Input events refused because the transport was not open.
    pub input_refused: u64,
}

/// A remote terminal session: one consumer for one ordered event queue.
///
/// Producers (a stdin reader, a transport receive loop) only enqueue
/// [`SessionEvent`]s. Every event is handled to completion before the next,
/// so input order and per-channel output order are exactly queue order.
pub struct Session<T, S> {
    pipe: OutboundPipe<T>,
    router: InboundRouter<S>,
    input_refused: u64,
}

impl<T: MessageTransport, S: TerminalSurface> Session<T, S> {
    /// Create a session sending on `transport` and rendering to `surface`.
    pub fn new(transport: T, surface: S) -> Self {
        Self {
            pipe: OutboundPipe::new(transport),
            router: InboundRouter::new(surface),
            input_refused: 0,
        }
    }

    /// Handle one event. Returns `Break` once the session has ended.
    pub fn handle(&mut self, event: SessionEvent) -> Result<ControlFlow<()>> {
        match event {
            SessionEvent::Input(bytes) => match self.pipe.submit(&bytes) {
                Ok(()) => {}
                Err(SessionError::TransportUnavailable) => {
                    self.input_refused = self.input_refused.saturating_add(1);
                    warn!(size = bytes.len(), "transport unavailable; input dropped");
                }
                Err(SessionError::SessionClosed) => return Ok(ControlFlow::Break(())),
                Err(err) => return Err(err),
            },
            SessionEvent::Message(message) => match self.router.on_message(message) {
                // Drops are already reported by the router.
                Ok(Dispatch::Delivered { .. } | Dispatch::Dropped(_)) => {}
                Err(SessionError::SessionClosed) => return Ok(ControlFlow::Break(())),
                Err(err) => return Err(err),
            },
            SessionEvent::Closed => {
                debug!("transport closed; ending session");
                self.close();
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Consume events until the transport closes or every producer is gone.
    ///
    /// The session is closed when this returns, including on error.
    pub fn run(&mut self, events: &Receiver<SessionEvent>) -> Result<SessionSummary> {
        for event in events.iter() {
            match self.handle(event) {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => break,
                Err(err) => {
                    self.close();
                    return Err(err);
                }
            }
        }
        self.close();
        Ok(self.summary())
    }

    /// End the session. Further events are rejected with `SessionClosed`.
    pub fn close(&mut self) {
        self.pipe.close();
        self.router.close();
    }

    pub fn is_closed(&self) -> bool {
        self.pipe.is_closed() && self.router.is_closed()
    }

    /// Submit an input event directly, bypassing the queue.
    pub fn submit(&mut self, bytes: &[u8]) -> Result<()> {
        self.pipe.submit(bytes)
    }

    /// Deliver a transport message directly, bypassing the queue.
    pub fn on_message(&mut self, message: Bytes) -> Result<Dispatch> {
        self.router.on_message(message)
    }

    /// Borrow the transport.
    pub fn transport(&self) -> &T {
        self.pipe.transport()
    }

    /// Borrow the terminal surface.
    pub fn surface(&self) -> &S {
        self.router.surface()
    }

    /// Counters so far.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            input_frames: self.pipe.frames_sent(),
            input_bytes: self.pipe.bytes_sent(),
            stdout_frames: self.router.stdout().delivered_frames(),
            stdout_bytes: self.router.stdout().delivered_bytes(),
            stderr_frames: self.router.stderr().delivered_frames(),
            stderr_bytes: self.router.stderr().delivered_bytes(),
            dropped_malformed: self.router.dropped_malformed(),
            dropped_unknown_channel: self.router.dropped_unknown_channel(),
            dropped_input: self.router.dropped_input(),
            input_refused: self.input_refused,
        }
    }
}
