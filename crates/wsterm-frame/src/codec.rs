use bytes::{BufMut, Bytes, BytesMut};

use crate::channel::{Channel, Tag};
use crate::error::{FrameError, Result};

/// Frame header: a single channel tag byte.
pub const HEADER_SIZE: usize = 1;

/// A decoded message with channel routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The channel this message belongs to.
    pub channel: Channel,
    /// The message payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame on a defined channel.
    pub fn new(tag: Tag, payload: impl Into<Bytes>) -> Self {
        Self {
            channel: tag.into(),
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (tag + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Encode this frame into a standalone transport message.
    pub fn to_message(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        encode_frame(self.channel, &self.payload, &mut buf)?;
        Ok(buf.freeze())
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌───────────┬──────────────────────────────┐
/// │ Tag (1B)  │ Payload                       │
/// │ 0 / 1 / 2 │ (message length - 1 bytes)    │
/// └───────────┴──────────────────────────────┘
/// ```
///
/// Only defined channels can be encoded; `Channel::Unknown` fails with
/// [`FrameError::InvalidTag`].
pub fn encode_frame(channel: Channel, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let tag = channel
        .tag()
        .ok_or(FrameError::InvalidTag(channel.as_byte()))?;
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u8(tag.as_byte());
    dst.put_slice(payload);
    Ok(())
}

/// Decode one transport message into a frame.
///
/// The payload shares the message's buffer. Unknown tags are not an error
/// here; callers decide what to do with `Channel::Unknown`.
pub fn decode_frame(message: Bytes) -> Result<Frame> {
    let Some(&tag) = message.first() else {
        return Err(FrameError::MalformedFrame);
    };

    Ok(Frame {
        channel: Channel::from_byte(tag),
        payload: message.slice(HEADER_SIZE..),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(channel: Channel, payload: &[u8]) -> Bytes {
        let mut buf = BytesMut::new();
        encode_frame(channel, payload, &mut buf).unwrap();
        buf.freeze()
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        for tag in Tag::ALL {
            let message = encode(tag.into(), b"hello, wsterm!");
            assert_eq!(message.len(), HEADER_SIZE + 14);

            let frame = decode_frame(message).unwrap();
            assert_eq!(frame.channel, Channel::from(tag));
            assert_eq!(frame.payload.as_ref(), b"hello, wsterm!");
        }
    }

    #[test]
    fn test_empty_payload_roundtrip() {
        for tag in Tag::ALL {
            let message = encode(tag.into(), b"");
            assert_eq!(message.as_ref(), &[tag.as_byte()]);

            let frame = decode_frame(message).unwrap();
            assert_eq!(frame.channel, Channel::from(tag));
            assert!(frame.payload.is_empty());
        }
    }

    #[test]
    fn test_input_wire_layout() {
        let message = encode(Channel::Input, b"h");
        assert_eq!(message.as_ref(), &[0x00, b'h']);
    }

    #[test]
    fn test_payload_is_verbatim() {
        let payload = [0x00, 0x01, 0x02, 0x1b, b'[', b'A', 0xFF];
        let message = encode(Channel::Stderr, &payload);
        assert_eq!(message[0], 2);
        assert_eq!(&message[1..], &payload);
    }

    #[test]
    fn test_decode_empty_message() {
        let result = decode_frame(Bytes::new());
        assert_eq!(result, Err(FrameError::MalformedFrame));
    }

    #[test]
    fn test_decode_unknown_tag() {
        let frame = decode_frame(Bytes::from_static(&[7, b'x', b'y'])).unwrap();
        assert_eq!(frame.channel, Channel::Unknown(7));
        assert_eq!(frame.payload.as_ref(), b"xy");

        let frame = decode_frame(Bytes::from_static(&[0xFF])).unwrap();
        assert_eq!(frame.channel, Channel::Unknown(0xFF));
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn test_encode_unknown_channel_rejected() {
        let mut buf = BytesMut::new();
        let result = encode_frame(Channel::Unknown(3), b"nope", &mut buf);
        assert_eq!(result, Err(FrameError::InvalidTag(3)));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_encode_appends_to_existing_buffer() {
        let mut buf = BytesMut::from(&b"prefix"[..]);
        encode_frame(Channel::Stdout, b"out", &mut buf).unwrap();
        assert_eq!(buf.as_ref(), b"prefix\x01out");
    }

    #[test]
    fn test_frame_to_message_and_wire_size() {
        let frame = Frame::new(Tag::Stdout, Bytes::from_static(b"test"));
        assert_eq!(frame.wire_size(), HEADER_SIZE + 4);

        let message = frame.to_message().unwrap();
        assert_eq!(message.as_ref(), b"\x01test");
        assert_eq!(decode_frame(message).unwrap(), frame);
    }
}
