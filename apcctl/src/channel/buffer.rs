//! Pattern buffer holding received-but-unconsumed bytes.
//!
//! Every successful match drains the buffer through the end of the match, so
//! the pending region stays small and is searched in full.

use bytes::{Buf, BytesMut};

use super::patterns::PromptMatcher;

/// Buffer for accumulating output and searching it for prompt markers.
#[derive(Debug)]
pub struct PatternBuffer {
    /// Bytes received from the device and not yet consumed.
    buffer: BytesMut,
}

impl PatternBuffer {
    /// Create a buffer with the given initial capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Extend the buffer with new data.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Search the pending bytes for a match.
    pub fn search<M: PromptMatcher + ?Sized>(&self, matcher: &M) -> Option<(usize, usize)> {
        matcher.find_match(&self.buffer)
    }

    /// Drop everything up to and including byte offset `end`.
    pub fn consume_through(&mut self, end: usize) {
        self.buffer.advance(end.min(self.buffer.len()));
    }

    /// Return the bytes before `start` and drop everything through `end`.
    pub fn take_until(&mut self, start: usize, end: usize) -> Vec<u8> {
        let end = end.min(self.buffer.len());
        let captured = self.buffer.split_to(end);
        captured[..start.min(captured.len())].to_vec()
    }

    /// Get a reference to the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(4096)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::MarkerSet;

    #[test]
    fn test_basic_extend() {
        let mut buffer = PatternBuffer::default();
        buffer.extend(b"User Name : ");
        assert_eq!(buffer.as_slice(), b"User Name : ");
    }

    #[test]
    fn test_consume_keeps_remainder() {
        let mut buffer = PatternBuffer::default();
        buffer.extend(b"<ESC>- Main Menu\r\n> ");

        let (_, end) = buffer.search(&MarkerSet::single("<ESC>")).unwrap();
        buffer.consume_through(end);
        assert_eq!(buffer.as_slice(), b"- Main Menu\r\n> ");

        let (_, end) = buffer.search(&MarkerSet::single(">")).unwrap();
        buffer.consume_through(end);
        assert_eq!(buffer.as_slice(), b" ");
    }

    #[test]
    fn test_take_until_returns_prefix() {
        let mut buffer = PatternBuffer::default();
        buffer.extend(b"Device 1:ON \r\n<ESC>- Back");

        let (start, end) = buffer.search("<ESC>").unwrap();
        let captured = buffer.take_until(start, end);
        assert_eq!(captured, b"Device 1:ON \r\n");
        assert_eq!(buffer.as_slice(), b"- Back");
    }

    #[test]
    fn test_clear() {
        let mut buffer = PatternBuffer::default();
        buffer.extend(b"test data");
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
    }
}
