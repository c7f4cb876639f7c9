//! Client side of a remote terminal session.
//!
//! Keystrokes go out as Input frames through an [`OutboundPipe`]; remote
//! output comes back through an [`InboundRouter`] into per-channel [`Sink`]s
//! that write to a [`TerminalSurface`]. A [`Session`] drives both from a single
//! ordered event queue.

pub mod connector;
pub mod error;
pub mod outbound;
pub mod pump;
pub mod router;
pub mod session;
pub mod sink;
pub mod terminal;

#[cfg(test)]
mod fake;

pub use connector::{attach, connect, connect_with_config};
pub use error::{Result, SessionError};
pub use outbound::OutboundPipe;
pub use pump::{spawn_input_reader, spawn_receiver, InputConfig, DEFAULT_INPUT_CHUNK_SIZE};
pub use router::{Diagnostic, Dispatch, InboundRouter};
pub use session::{Session, SessionEvent, SessionSummary};
pub use sink::Sink;
pub use terminal::TerminalSurface;
