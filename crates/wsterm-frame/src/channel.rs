//! Channel tags.
//!
//! The input channel flows client to remote only. Stdout and stderr flow
//! remote to client only. Ordering holds within a channel, never across.

use std::fmt;

/// A defined channel tag, as written in byte 0 of every message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    /// Keystrokes and other terminal input, client to remote.
    Input = 0,
    /// Remote standard output.
    Stdout = 1,
    /// Remote standard error.
    Stderr = 2,
}

impl Tag {
    /// All defined tags, in wire order.
    pub const ALL: [Tag; 3] = [Tag::Input, Tag::Stdout, Tag::Stderr];

    /// The wire byte for this tag.
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Human-readable channel name.
    pub fn name(self) -> &'static str {
        match self {
            Tag::Input => "input",
            Tag::Stdout => "stdout",
            Tag::Stderr => "stderr",
        }
    }
}

impl TryFrom<u8> for Tag {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(Tag::Input),
            1 => Ok(Tag::Stdout),
            2 => Ok(Tag::Stderr),
            other => Err(other),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded channel.
///
/// Tags outside the defined set still decode, as `Unknown`, so that peers
/// speaking a newer protocol revision do not break older clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Input,
    Stdout,
    Stderr,
    Unknown(u8),
}

impl Channel {
    /// Classify a raw tag byte.
    pub fn from_byte(byte: u8) -> Self {
        match Tag::try_from(byte) {
            Ok(tag) => tag.into(),
            Err(other) => Channel::Unknown(other),
        }
    }

    /// The raw tag byte.
    pub fn as_byte(self) -> u8 {
        match self {
            Channel::Input => Tag::Input.as_byte(),
            Channel::Stdout => Tag::Stdout.as_byte(),
            Channel::Stderr => Tag::Stderr.as_byte(),
            Channel::Unknown(byte) => byte,
        }
    }

    /// The defined tag, or `None` for unknown channels.
    pub fn tag(self) -> Option<Tag> {
        match self {
            Channel::Input => Some(Tag::Input),
            Channel::Stdout => Some(Tag::Stdout),
            Channel::Stderr => Some(Tag::Stderr),
            Channel::Unknown(_) => None,
        }
    }

    /// Human-readable channel name.
    pub fn name(self) -> &'static str {
        match self.tag() {
            Some(tag) => tag.name(),
            None => "unknown",
        }
    }
}

impl From<Tag> for Channel {
    fn from(tag: Tag) -> Self {
        match tag {
            Tag::Input => Channel::Input,
            Tag::Stdout => Channel::Stdout,
            Tag::Stderr => Channel::Stderr,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Unknown(byte) => write!(f, "unknown({byte})"),
            known => f.write_str(known.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_bytes_match_wire_values() {
        assert_eq!(Tag::Input.as_byte(), 0);
        assert_eq!(Tag::Stdout.as_byte(), 1);
        assert_eq!(Tag::Stderr.as_byte(), 2);
    }

    #[test]
    fn tag_try_from_rejects_undefined_bytes() {
        assert_eq!(Tag::try_from(1), Ok(Tag::Stdout));
        assert_eq!(Tag::try_from(3), Err(3));
        assert_eq!(Tag::try_from(0xFF), Err(0xFF));
    }

    #[test]
    fn channel_from_byte_keeps_unknown_value() {
        assert_eq!(Channel::from_byte(0), Channel::Input);
        assert_eq!(Channel::from_byte(2), Channel::Stderr);
        assert_eq!(Channel::from_byte(42), Channel::Unknown(42));
        assert_eq!(Channel::Unknown(42).as_byte(), 42);
        assert_eq!(Channel::Unknown(42).tag(), None);
    }

    #[test]
    fn display_names() {
        assert_eq!(Channel::Stdout.to_string(), "stdout");
        assert_eq!(Channel::Unknown(9).to_string(), "unknown(9)");
        assert_eq!(Tag::Stderr.to_string(), "stderr");
    }
}
