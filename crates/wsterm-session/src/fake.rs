//! Scripted transport used by unit tests.

use std::collections::VecDeque;

use bytes::Bytes;
use wsterm_transport::{Incoming, MessageSource, MessageTransport, Result, TransportError};

/// Records every sent message and replays a script of inbound items.
#[derive(Debug)]
pub(crate) struct FakeTransport {
    pub(crate) sent: Vec<Bytes>,
    pub(crate) open: bool,
    pub(crate) fail_sends: bool,
    script: VecDeque<Result<Option<Incoming>>>,
}

impl FakeTransport {
    pub(crate) fn open() -> Self {
        Self {
            sent: Vec::new(),
            open: true,
            fail_sends: false,
            script: VecDeque::new(),
        }
    }

    pub(crate) fn closed() -> Self {
        Self {
            open: false,
            ..Self::open()
        }
    }

    pub(crate) fn with_script(script: Vec<Result<Option<Incoming>>>) -> Self {
        Self {
            script: script.into(),
            ..Self::open()
        }
    }
}

impl MessageTransport for FakeTransport {
    fn send(&mut self, message: Bytes) -> Result<()> {
        if self.fail_sends {
            return Err(TransportError::Io(std::io::Error::from(
                std::io::ErrorKind::ConnectionReset,
            )));
        }
        self.sent.push(message);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

impl MessageSource for FakeTransport {
    fn recv(&mut self) -> Result<Option<Incoming>> {
        self.script.pop_front().unwrap_or(Ok(Some(Incoming::Closed)))
    }
}
