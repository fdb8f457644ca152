//! Ring bitmap of received sequence numbers.

/// Number of packets tracked per u64 entry in the bitmap.
pub(crate) const PACKETS_PER_ENTRY: usize = 64;

/// Default number of bitmap entries (128 * 64 = 8192 sequence numbers).
pub(crate) const DEFAULT_SIZE: u16 = 128;

/// Records, for the most recent `size * 64` sequence numbers, whether each one
/// arrived.
///
/// Sequence numbers map to bit `pos % 64` of entry `pos / 64`, where
/// `pos = seq % (size * 64)`. Once the stream moves more than `size * 64`
/// numbers ahead, older bits are overwritten.
#[derive(Debug, Clone)]
pub(crate) struct ReceivedWindow {
    packets: Vec<u64>,
}

impl Default for ReceivedWindow {
    fn default() -> Self {
        Self {
            packets: vec![0u64; DEFAULT_SIZE as usize],
        }
    }
}

impl ReceivedWindow {
    /// Create a window of `size` u64 entries.
    ///
    /// `size` must be a power of two between 1 and 1024, so the window divides
    /// the 16-bit sequence space evenly. Returns `None` otherwise.
    pub(crate) fn new(size: u16) -> Option<Self> {
        if !size.is_power_of_two() || size as usize * PACKETS_PER_ENTRY > 1 << 16 {
            return None;
        }

        Some(Self {
            packets: vec![0u64; size as usize],
        })
    }

    /// Number of sequence numbers the window can represent.
    pub(crate) fn capacity(&self) -> usize {
        self.packets.len() * PACKETS_PER_ENTRY
    }

    fn position(&self, seq: u16) -> usize {
        (seq as usize) % self.capacity()
    }

    pub(crate) fn mark_received(&mut self, seq: u16) {
        let pos = self.position(seq);
        self.packets[pos / PACKETS_PER_ENTRY] |= 1u64 << (pos % PACKETS_PER_ENTRY);
    }

    pub(crate) fn mark_lost(&mut self, seq: u16) {
        let pos = self.position(seq);
        self.packets[pos / PACKETS_PER_ENTRY] &= !(1u64 << (pos % PACKETS_PER_ENTRY));
    }

    pub(crate) fn is_received(&self, seq: u16) -> bool {
        let pos = self.position(seq);
        (self.packets[pos / PACKETS_PER_ENTRY] & (1u64 << (pos % PACKETS_PER_ENTRY))) != 0
    }
}
