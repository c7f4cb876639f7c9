/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    /// The message is empty and carries no channel tag.
    #[error("malformed frame (empty message, no channel tag)")]
    MalformedFrame,

    /// The encoder was asked to emit a tag outside the defined channels.
    #[error("invalid channel tag {0} (expected 0, 1 or 2)")]
    InvalidTag(u8),
}

pub type Result<T> = std::result::Result<T, FrameError>;
