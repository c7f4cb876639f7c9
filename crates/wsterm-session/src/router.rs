use bytes::Bytes;
use tracing::{trace, warn};
use wsterm_frame::{decode_frame, Channel, FrameError, Tag};

use crate::error::{Result, SessionError};
use crate::sink::Sink;
use crate::terminal::TerminalSurface;

/// Why an inbound message was dropped instead of delivered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    /// The message was empty.
    #[error("malformed frame (empty message)")]
    MalformedFrame,

    /// The tag byte names no channel this client knows.
    #[error("frame on unknown channel {0}")]
    UnknownChannel(u8),

    /// The remote sent an Input frame, which only flows client to remote.
    #[error("input frame from remote ({len} bytes)")]
    UnexpectedInput { len: usize },
}

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The payload was pushed to the sink for `tag` and written out.
    Delivered { tag: Tag, len: usize },
    /// The message was dropped; the session carries on.
    Dropped(Diagnostic),
}

/// Decodes inbound messages and routes payloads to the stdout or stderr sink.
///
/// Each sink preserves its own channel's order. Nothing is promised about
/// how stdout and stderr chunks interleave.
pub struct InboundRouter<S> {
    surface: S,
    stdout: Sink,
    stderr: Sink,
    closed: bool,
    dropped_malformed: u64,
    dropped_unknown_channel: u64,
    dropped_input: u64,
}

impl<S: TerminalSurface> InboundRouter<S> {
    /// Create a router whose sinks write to `surface`.
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            stdout: Sink::new(Tag::Stdout),
            stderr: Sink::new(Tag::Stderr),
            closed: false,
            dropped_malformed: 0,
            dropped_unknown_channel: 0,
            dropped_input: 0,
        }
    }

    /// Handle one received transport message.
    ///
    /// Undeliverable messages come back as [`Dispatch::Dropped`]; only a
    /// closed session or a failing terminal surface is an error.
    pub fn on_message(&mut self, message: Bytes) -> Result<Dispatch> {
        if self.closed {
            return Err(SessionError::SessionClosed);
        }

        let frame = match decode_frame(message) {
            Ok(frame) => frame,
            Err(FrameError::MalformedFrame) => return Ok(self.drop_frame(Diagnostic::MalformedFrame)),
            Err(err) => return Err(err.into()),
        };

        let sink = match frame.channel {
            Channel::Stdout => &mut self.stdout,
            Channel::Stderr => &mut self.stderr,
            Channel::Input => {
                let len = frame.payload.len();
                return Ok(self.drop_frame(Diagnostic::UnexpectedInput { len }));
            }
            Channel::Unknown(tag) => return Ok(self.drop_frame(Diagnostic::UnknownChannel(tag))),
        };

        let len = frame.payload.len();
        sink.push(frame.payload);
        sink.drain(&mut self.surface)
            .map_err(SessionError::Terminal)?;

        trace!(channel = %sink.tag(), size = len, "delivered frame");
        Ok(Dispatch::Delivered {
            tag: sink.tag(),
            len,
        })
    }

    fn drop_frame(&mut self, diagnostic: Diagnostic) -> Dispatch {
        let counter = match diagnostic {
            Diagnostic::MalformedFrame => &mut self.dropped_malformed,
            Diagnostic::UnknownChannel(_) => &mut self.dropped_unknown_channel,
            Diagnostic::UnexpectedInput { .. } => &mut self.dropped_input,
        };
        *counter = counter.saturating_add(1);
        warn!(%diagnostic, "dropped inbound frame");
        Dispatch::Dropped(diagnostic)
    }

    /// End the session: reject further messages and discard pending output.
    pub fn close(&mut self) {
        self.closed = true;
        self.stdout.clear();
        self.stderr.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The stdout sink.
    pub fn stdout(&self) -> &Sink {
        &self.stdout
    }

    /// The stderr sink.
    pub fn stderr(&self) -> &Sink {
        &self.stderr
    }

    /// Borrow the terminal surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn dropped_malformed(&self) -> u64 {
        self.dropped_malformed
    }

    pub fn dropped_unknown_channel(&self) -> u64 {
        self.dropped_unknown_channel
    }

    pub fn dropped_input(&self) -> u64 {
        self.dropped_input
    }
}
