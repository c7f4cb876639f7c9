use bytes::BytesMut;
use tracing::trace;
use wsterm_frame::{encode_frame, Channel};
use wsterm_transport::{MessageTransport, TransportError};

use crate::error::{Result, SessionError};

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Turns terminal input events into Input frames on a transport.
///
/// One `submit` is one frame is one transport send. Nothing is batched, so
/// the remote sees keystrokes exactly as the user produced them.
pub struct OutboundPipe<T> {
    transport: T,
    buf: BytesMut,
    closed: bool,
    frames_sent: u64,
    bytes_sent: u64,
}

impl<T: MessageTransport> OutboundPipe<T> {
    /// Create a pipe that sends on `transport`.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            closed: false,
            frames_sent: 0,
            bytes_sent: 0,
        }
    }

    /// Encode one input event and send it.
    ///
    /// Fails with [`SessionError::SessionClosed`] after [`close`](Self::close)
    /// and with [`SessionError::TransportUnavailable`] while the transport is
    /// not open. Neither case touches the transport.
    pub fn submit(&mut self, bytes: &[u8]) -> Result<()> {
        if self.closed {
            return Err(SessionError::SessionClosed);
        }
        if !self.transport.is_open() {
            return Err(SessionError::TransportUnavailable);
        }

        encode_frame(Channel::Input, bytes, &mut self.buf)?;
        let message = self.buf.split().freeze();

        match self.transport.send(message) {
            Ok(()) => {}
            Err(TransportError::Shutdown) => return Err(SessionError::TransportUnavailable),
            Err(err) => return Err(err.into()),
        }

        self.frames_sent = self.frames_sent.saturating_add(1);
        self.bytes_sent = self.bytes_sent.saturating_add(bytes.len() as u64);
        trace!(size = bytes.len(), "sent input frame");
        Ok(())
    }

    /// Reject all further submissions.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Input frames sent so far.
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Input payload bytes sent so far (excluding tag bytes).
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeTransport;

    #[test]
    fn each_submit_is_one_tagged_send_in_order() {
        let mut pipe = OutboundPipe::new(FakeTransport::open());

        pipe.submit(b"h").unwrap();
        pipe.submit(b"i").unwrap();

        let sent = &pipe.transport().sent;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].as_ref(), &[0x00, b'h']);
        assert_eq!(sent[1].as_ref(), &[0x00, b'i']);
        assert_eq!(pipe.frames_sent(), 2);
        assert_eq!(pipe.bytes_sent(), 2);
    }

    #[test]
    fn consecutive_events_are_not_coalesced() {
        let mut pipe = OutboundPipe::new(FakeTransport::open());
        for chunk in [&b"l"[..], b"s", b"\r", b"\x1b[A"] {
            pipe.submit(chunk).unwrap();
        }

        let sent: Vec<&[u8]> = pipe.transport().sent.iter().map(|m| m.as_ref()).collect();
        assert_eq!(
            sent,
            vec![&b"\x00l"[..], b"\x00s", b"\x00\r", b"\x00\x1b[A"]
        );
    }

    #[test]
    fn empty_event_sends_bare_tag() {
        let mut pipe = OutboundPipe::new(FakeTransport::open());
        pipe.submit(b"").unwrap();
        assert_eq!(pipe.transport().sent[0].as_ref(), &[0x00]);
    }

    #[test]
    fn transport_not_open_is_unavailable() {
        let mut pipe = OutboundPipe::new(FakeTransport::closed());
        let err = pipe.submit(b"x").unwrap_err();
        assert!(matches!(err, SessionError::TransportUnavailable));
        assert!(pipe.transport().sent.is_empty());
        assert_eq!(pipe.frames_sent(), 0);
    }

    #[test]
    fn transport_recovers_after_unavailable() {
        let mut pipe = OutboundPipe::new(FakeTransport::closed());
        assert!(pipe.submit(b"x").is_err());

        pipe.transport_mut().open = true;
        pipe.submit(b"y").unwrap();
        assert_eq!(pipe.transport().sent.len(), 1);
        assert_eq!(pipe.transport().sent[0].as_ref(), b"\x00y");
    }

    #[test]
    fn submit_after_close_is_session_closed() {
        let mut pipe = OutboundPipe::new(FakeTransport::open());
        pipe.submit(b"a").unwrap();
        pipe.close();

        let err = pipe.submit(b"b").unwrap_err();
        assert!(matches!(err, SessionError::SessionClosed));
        assert!(pipe.is_closed());
        assert_eq!(pipe.transport().sent.len(), 1);
    }

    #[test]
    fn send_failure_propagates() {
        let mut transport = FakeTransport::open();
        transport.fail_sends = true;
        let mut pipe = OutboundPipe::new(transport);

        let err = pipe.submit(b"a").unwrap_err();
        assert!(matches!(err, SessionError::Transport(TransportError::Io(_))));
        assert_eq!(pipe.frames_sent(), 0);
    }
}
