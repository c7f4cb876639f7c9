use bytes::Bytes;

use crate::error::Result;

/// Something received from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// One complete binary message.
    Message(Bytes),
    /// The peer closed the connection. No further messages follow.
    Closed,
}

/// The sending half of a message transport.
///
/// Each `send` delivers exactly one message; boundaries are preserved.
pub trait MessageTransport {
    /// Send one binary message.
    fn send(&mut self, message: Bytes) -> Result<()>;

    /// Whether the transport can currently accept sends.
    fn is_open(&self) -> bool;
}

/// The receiving half of a message transport.
pub trait MessageSource {
    /// Poll for the next inbound item.
    ///
    /// Returns `Ok(None)` when nothing arrived within the transport's poll
    /// interval. After `Incoming::Closed` has been returned, further calls
    /// keep returning it.
    fn recv(&mut self) -> Result<Option<Incoming>>;
}

impl<T: MessageTransport + ?Sized> MessageTransport for Box<T> {
    fn send(&mut self, message: Bytes) -> Result<()> {
        (**self).send(message)
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }
}

impl<S: MessageSource + ?Sized> MessageSource for Box<S> {
    fn recv(&mut self) -> Result<Option<Incoming>> {
        (**self).recv()
    }
}
