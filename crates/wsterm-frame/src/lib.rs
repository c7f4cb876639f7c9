//! Channel-tagged message framing for remote terminal sessions.
//!
//! Three byte streams share one message transport: user input flowing to the
//! remote process, and the remote process's stdout and stderr flowing back.
//! Every transport message carries exactly one frame:
//! - A 1-byte channel tag (0 = input, 1 = stdout, 2 = stderr)
//! - The payload, verbatim, filling the rest of the message
//!
//! Message boundaries come from the transport, so there is no length prefix.

pub mod channel;
pub mod codec;
pub mod error;

pub use channel::{Channel, Tag};
pub use codec::{decode_frame, encode_frame, Frame, HEADER_SIZE};
pub use error::{FrameError, Result};
