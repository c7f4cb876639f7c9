use std::collections::VecDeque;
use std::io;

use bytes::Bytes;
use wsterm_frame::Tag;

use crate::terminal::TerminalSurface;

/// Pending output for one inbound channel.
///
/// Chunks leave in push order. A failed terminal write leaves the failed
/// chunk, and everything after it, queued.
#[derive(Debug)]
pub struct Sink {
    tag: Tag,
    pending: VecDeque<Bytes>,
    delivered_frames: u64,
    delivered_bytes: u64,
}

impl Sink {
    /// Create an empty sink for `tag`.
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            pending: VecDeque::new(),
            delivered_frames: 0,
            delivered_bytes: 0,
        }
    }

    /// The channel this sink serves.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Append a chunk to the tail of the queue.
    pub fn push(&mut self, chunk: Bytes) {
        self.pending.push_back(chunk);
    }

    /// Forward every pending chunk to `surface`, oldest first.
    ///
    /// Returns the number of chunks written.
    pub fn drain<S: TerminalSurface + ?Sized>(&mut self, surface: &mut S) -> io::Result<usize> {
        let mut written = 0usize;
        while let Some(chunk) = self.pending.front() {
            surface.write_bytes(chunk)?;
            self.delivered_frames = self.delivered_frames.saturating_add(1);
            self.delivered_bytes = self.delivered_bytes.saturating_add(chunk.len() as u64);
            self.pending.pop_front();
            written += 1;
        }
        Ok(written)
    }

    /// Drop all pending chunks without delivering them.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Number of chunks awaiting delivery.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Chunks delivered to the surface so far.
    pub fn delivered_frames(&self) -> u64 {
        self.delivered_frames
    }

    /// Payload bytes delivered to the surface so far.
    pub fn delivered_bytes(&self) -> u64 {
        self.delivered_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailAfter {
        remaining: usize,
        written: Vec<u8>,
    }

    impl TerminalSurface for FailAfter {
        fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
            if self.remaining == 0 {
                return Err(io::Error::from(io::ErrorKind::BrokenPipe));
            }
            self.remaining -= 1;
            self.written.extend_from_slice(bytes);
            Ok(())
        }
    }

    #[test]
    fn drain_delivers_in_push_order() {
        let mut sink = Sink::new(Tag::Stdout);
        sink.push(Bytes::from_static(b"one "));
        sink.push(Bytes::from_static(b"two "));
        sink.push(Bytes::from_static(b"three"));
        assert_eq!(sink.pending_len(), 3);

        let mut out = Vec::new();
        assert_eq!(sink.drain(&mut out).unwrap(), 3);

        assert_eq!(out, b"one two three");
        assert!(sink.is_empty());
        assert_eq!(sink.delivered_frames(), 3);
        assert_eq!(sink.delivered_bytes(), 13);
    }

    #[test]
    fn drain_empty_sink_writes_nothing() {
        let mut sink = Sink::new(Tag::Stderr);
        let mut out = Vec::new();
        assert_eq!(sink.drain(&mut out).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn failed_write_keeps_remaining_chunks_queued() {
        let mut sink = Sink::new(Tag::Stdout);
        sink.push(Bytes::from_static(b"a"));
        sink.push(Bytes::from_static(b"b"));
        sink.push(Bytes::from_static(b"c"));

        let mut surface = FailAfter {
            remaining: 1,
            written: Vec::new(),
        };
        let err = sink.drain(&mut surface).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(surface.written, b"a");
        assert_eq!(sink.pending_len(), 2);

        surface.remaining = 2;
        assert_eq!(sink.drain(&mut surface).unwrap(), 2);
        assert_eq!(surface.written, b"abc");
        assert_eq!(sink.delivered_frames(), 3);
    }

    #[test]
    fn clear_discards_pending() {
        let mut sink = Sink::new(Tag::Stderr);
        sink.push(Bytes::from_static(b"x"));
        sink.clear();
        assert!(sink.is_empty());
        assert_eq!(sink.delivered_frames(), 0);
    }
}
