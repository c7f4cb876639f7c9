//! Remote terminal sessions over a single binary WebSocket.
//!
//! wsterm multiplexes terminal input, remote stdout and remote stderr onto
//! one message transport by prefixing each message with a channel tag byte.
//!
//! # Crate Structure
//!
//! - [`frame`] - Channel tags and the one-byte framing codec
//! - [`transport`] - Message transport traits and the WebSocket implementation
//! - [`session`] - Input pipe, inbound router, output sinks and the session loop

/// Re-export frame types.
pub mod frame {
    pub use wsterm_frame::*;
}

/// Re-export transport types.
pub mod transport {
    pub use wsterm_transport::*;
}

/// Re-export session types.
pub mod session {
    pub use wsterm_session::*;
}
