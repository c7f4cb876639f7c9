//! Producer threads feeding the session event queue.

use std::io::{ErrorKind, Read};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use bytes::Bytes;
use tracing::{debug, warn};
use wsterm_transport::{Incoming, MessageSource};

use crate::error::{Result, SessionError};
use crate::session::SessionEvent;

/// Default size of a single terminal input read.
pub const DEFAULT_INPUT_CHUNK_SIZE: usize = 4 * 1024;

/// Configuration for the terminal input reader.
#[derive(Debug, Clone)]
pub struct InputConfig {
    /// Maximum bytes per input event. Default: 4 KiB.
    pub chunk_size: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_INPUT_CHUNK_SIZE,
        }
    }
}

/// Forward everything `source` receives onto `events`.
///
/// Ends with a single `SessionEvent::Closed` once the transport closes or a
/// receive fails, or silently if the session has dropped its receiver.
pub fn spawn_receiver<S>(mut source: S, events: Sender<SessionEvent>) -> Result<JoinHandle<()>>
where
    S: MessageSource + Send + 'static,
{
    thread::Builder::new()
        .name("wsterm-recv".to_string())
        .spawn(move || loop {
            match source.recv() {
                Ok(Some(Incoming::Message(message))) => {
                    if events.send(SessionEvent::Message(message)).is_err() {
                        break;
                    }
                }
                Ok(Some(Incoming::Closed)) => {
                    let _ = events.send(SessionEvent::Closed);
                    break;
                }
                Ok(None) => thread::yield_now(),
                Err(err) => {
                    warn!(error = %err, "receive failed; ending session");
                    let _ = events.send(SessionEvent::Closed);
                    break;
                }
            }
        })
        .map_err(|source| SessionError::Spawn {
            name: "receiver",
            source,
        })
}

/// Read terminal input from `reader`, one `SessionEvent::Input` per read.
///
/// Stops at EOF or on the first read error without ending the session;
/// remote output keeps flowing until the transport closes.
pub fn spawn_input_reader<R>(
    mut reader: R,
    events: Sender<SessionEvent>,
    config: &InputConfig,
) -> Result<JoinHandle<()>>
where
    R: Read + Send + 'static,
{
    let chunk_size = config.chunk_size.max(1);
    thread::Builder::new()
        .name("wsterm-input".to_string())
        .spawn(move || {
            let mut chunk = vec![0u8; chunk_size];
            loop {
                let read = match reader.read(&mut chunk) {
                    Ok(0) => {
                        debug!("terminal input reached EOF");
                        break;
                    }
                    Ok(n) => n,
                    Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                    Err(err) => {
                        warn!(error = %err, "terminal input read failed");
                        break;
                    }
                };

                let event = SessionEvent::Input(Bytes::copy_from_slice(&chunk[..read]));
                if events.send(event).is_err() {
                    break;
                }
            }
        })
        .map_err(|source| SessionError::Spawn {
            name: "input",
            source,
        })
}
