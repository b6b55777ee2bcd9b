//! Growable byte buffer with fill and consume cursors.
//!
//! One `Buffer` backs each direction of a connection. The input side reads
//! into the unfilled tail and consumes whole parsed units from the front; the
//! output side appends encoded bytes and consumes whatever the transport
//! accepted. Capacity grows on demand and never shrinks.

/// Byte store with a filled length and a consumed offset.
///
/// `data[consumed..filled]` is the pending region: bytes present but not yet
/// processed. `data[filled..]` is writable space.
#[derive(Debug, Default)]
pub(crate) struct Buffer {
    data: Vec<u8>,
    filled: usize,
    consumed: usize,
}

impl Buffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Create a buffer whose writable space is pre-sized to `capacity` bytes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            filled: 0,
            consumed: 0,
        }
    }

    /// Number of valid bytes, including any already consumed.
    pub(crate) fn filled(&self) -> usize {
        self.filled
    }

    /// True when no unprocessed bytes remain.
    pub(crate) fn is_empty(&self) -> bool {
        self.consumed >= self.filled
    }

    /// Valid bytes from the start of the buffer.
    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.data[..self.filled]
    }

    /// Unprocessed bytes awaiting a consumer.
    pub(crate) fn pending(&self) -> &[u8] {
        &self.data[self.consumed..self.filled]
    }

    /// Grow writable space so at least `total` bytes fit, zero-filling the
    /// new region. Never shrinks.
    pub(crate) fn ensure(&mut self, total: usize) {
        if self.data.len() < total {
            self.data.resize(total, 0);
        }
    }

    /// Writable tail for filling up to `goal` total bytes.
    pub(crate) fn unfilled_to(&mut self, goal: usize) -> &mut [u8] {
        self.ensure(goal);
        &mut self.data[self.filled..goal]
    }

    /// Record `n` newly filled bytes.
    pub(crate) fn advance_filled(&mut self, n: usize) {
        self.filled += n;
        debug_assert!(self.filled <= self.data.len());
    }

    /// Record `n` newly consumed bytes.
    pub(crate) fn advance_consumed(&mut self, n: usize) {
        self.consumed += n;
        debug_assert!(self.consumed <= self.filled);
    }

    /// Drop `n` bytes from the front, shifting the remainder down.
    ///
    /// Only valid while the consumed offset is zero (the input side's mode of
    /// operation, where whole parsed units leave the buffer at once).
    pub(crate) fn consume_front(&mut self, n: usize) {
        debug_assert_eq!(self.consumed, 0);
        debug_assert!(n <= self.filled);
        self.data.copy_within(n..self.filled, 0);
        self.filled -= n;
    }

    /// Reset both cursors once every pending byte has been consumed.
    pub(crate) fn reset_if_drained(&mut self) {
        if self.consumed >= self.filled {
            self.filled = 0;
            self.consumed = 0;
        }
    }

    /// Append one byte.
    pub(crate) fn put_u8(&mut self, byte: u8) {
        self.ensure(self.filled + 1);
        self.data[self.filled] = byte;
        self.filled += 1;
    }

    /// Append a slice.
    pub(crate) fn put_slice(&mut self, src: &[u8]) {
        self.ensure(self.filled + src.len());
        self.data[self.filled..self.filled + src.len()].copy_from_slice(src);
        self.filled += src.len();
    }

    /// Drop all content, keeping the allocation.
    pub(crate) fn clear(&mut self) {
        self.filled = 0;
        self.consumed = 0;
    }
}
