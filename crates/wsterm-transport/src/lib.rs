//! Full-duplex binary message transport.
//!
//! Terminal sessions only need a channel that preserves message boundaries:
//! send a message, learn about received messages, learn when the peer is gone.
//! [`MessageTransport`] and [`MessageSource`] describe that contract; the
//! WebSocket implementation in [`ws`] is what the CLI uses.

pub mod error;
pub mod traits;
pub mod ws;

pub use error::{Result, TransportError};
pub use traits::{Incoming, MessageSource, MessageTransport};
pub use ws::{WsConfig, WsConnection, WsListener};
