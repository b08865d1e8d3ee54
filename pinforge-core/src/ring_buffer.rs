//! Lock-free SPSC byte ring buffer
//!
//! Bridges the UART receive interrupt (producer) and the command path
//! (consumer). Each index has exactly one writer:
//!
//! ```text
//! RX ISR ──push──▶ [ . . x x x . . ] ──pop──▶ uart read
//!                       ▲     ▲
//!                     read  write
//! ```
//!
//! One slot is always left free so that `read == write` means empty and
//! `write + 1 == read` means full. Usable capacity is therefore `N - 1`.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Capacity of the UART receive buffer
pub const RX_BUFFER_SIZE: usize = 128;

/// Receive buffer type shared by the board and the receive interrupt
pub type RxBuffer = RingBuffer<RX_BUFFER_SIZE>;

/// Fixed-capacity single-producer single-consumer byte queue
///
/// # Safety
///
/// This type uses `UnsafeCell` internally but is safe to share because:
/// - only the producer calls [`push`](Self::push) and stores `write`
/// - only the consumer calls [`pop`](Self::pop)/[`clear`](Self::clear) and
///   stores `read`
/// - a slot is written before `write` is published (Release) and read only
///   after `write` has been observed (Acquire), and vice versa for `read`
pub struct RingBuffer<const N: usize> {
    slots: UnsafeCell<[u8; N]>,
    read: AtomicU32,
    write: AtomicU32,
}

// SAFETY: single producer, single consumer, atomic coordination.
unsafe impl<const N: usize> Sync for RingBuffer<N> {}
unsafe impl<const N: usize> Send for RingBuffer<N> {}

impl<const N: usize> RingBuffer<N> {
    /// Mask for wrapping an index into the buffer
    const MASK: u32 = (N as u32).wrapping_sub(1);

    /// Create an empty buffer
    ///
    /// Fails to compile if `N` is not a power of two of at least 2.
    ///
    /// ```compile_fail
    /// let ring = pinforge_core::RingBuffer::<6>::new();
    /// ```
    ///
    /// ```compile_fail
    /// let ring = pinforge_core::RingBuffer::<1>::new();
    /// ```
    pub const fn new() -> Self {
        const { assert!(N.is_power_of_two(), "Ring buffer size must be power of 2") };
        const { assert!(N >= 2, "Ring buffer needs at least two slots") };

        Self {
            slots: UnsafeCell::new([0; N]),
            read: AtomicU32::new(0),
            write: AtomicU32::new(0),
        }
    }

    /// Number of bytes the buffer can hold
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Append a byte (producer side)
    ///
    /// Returns `false` and drops the byte if the buffer is full.
    #[inline]
    pub fn push(&self, byte: u8) -> bool {
        let write = self.write.load(Ordering::Relaxed);
        let next = (write + 1) & Self::MASK;
        if next == self.read.load(Ordering::Acquire) {
            return false;
        }

        // SAFETY: the consumer never touches the slot at `write` until the
        // store below publishes it
        unsafe {
            (*self.slots.get())[write as usize] = byte;
        }
        self.write.store(next, Ordering::Release);
        true
    }

    /// Take the oldest byte (consumer side)
    #[inline]
    pub fn pop(&self) -> Option<u8> {
        let read = self.read.load(Ordering::Relaxed);
        if read == self.write.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: the producer never overwrites the slot at `read` until the
        // store below releases it
        let byte = unsafe { (*self.slots.get())[read as usize] };
        self.read.store((read + 1) & Self::MASK, Ordering::Release);
        Some(byte)
    }

    /// Check if no bytes are queued (consumer side)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.read.load(Ordering::Relaxed) == self.write.load(Ordering::Acquire)
    }

    /// Number of queued bytes (consumer side)
    pub fn len(&self) -> usize {
        let read = self.read.load(Ordering::Relaxed);
        let write = self.write.load(Ordering::Acquire);
        (write.wrapping_sub(read) & Self::MASK) as usize
    }

    /// Discard everything queued so far (consumer side)
    pub fn clear(&self) {
        let write = self.write.load(Ordering::Acquire);
        self.read.store(write, Ordering::Release);
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Debug for RingBuffer<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_on_creation() {
        let ring = RingBuffer::<8>::new();
        assert!(ring.is_empty());
        assert_eq!(ring.pop(), None);
        assert_eq!(ring.capacity(), 7);
    }

    #[test]
    fn test_overflow_keeps_contents() {
        let ring = RingBuffer::<8>::new();
        for byte in 0..7 {
            assert!(ring.push(byte));
        }
        assert!(!ring.push(99));
        assert_eq!(ring.len(), 7);

        for byte in 0..7 {
            assert_eq!(ring.pop(), Some(byte));
        }
        assert!(ring.is_empty());
    }

    #[test]
    fn test_wraps_around() {
        let ring = RingBuffer::<4>::new();
        for round in 0..10u8 {
            assert!(ring.push(round));
            assert!(ring.push(round + 100));
            assert_eq!(ring.pop(), Some(round));
            assert_eq!(ring.pop(), Some(round + 100));
        }
        assert!(ring.is_empty());
    }

    #[test]
    fn test_smallest_buffer_holds_one_byte() {
        let ring = RingBuffer::<2>::new();
        assert_eq!(ring.capacity(), 1);
        assert!(ring.push(7));
        assert!(!ring.push(8));
        assert_eq!(ring.pop(), Some(7));
    }

    #[test]
    fn test_clear_discards_pending() {
        let ring = RingBuffer::<8>::new();
        ring.push(1);
        ring.push(2);
        ring.clear();
        assert!(ring.is_empty());
        assert!(ring.push(3));
        assert_eq!(ring.pop(), Some(3));
    }

    #[test]
    fn test_producer_thread_preserves_order() {
        const COUNT: u32 = 10_000;
        let ring = RingBuffer::<16>::new();
        let mut received = 0u32;

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..COUNT {
                    while !ring.push(i as u8) {
                        std::hint::spin_loop();
                    }
                }
            });

            while received < COUNT {
                if let Some(byte) = ring.pop() {
                    assert_eq!(byte, received as u8);
                    received += 1;
                } else {
                    std::hint::spin_loop();
                }
            }
        });

        assert!(ring.is_empty());
    }

    proptest! {
        #[test]
        fn test_fifo_matches_model(ops in proptest::collection::vec(any::<Option<u8>>(), 0..200)) {
            let ring = RingBuffer::<16>::new();
            let mut model = std::collections::VecDeque::new();

            for op in ops {
                match op {
                    Some(byte) => {
                        let accepted = ring.push(byte);
                        prop_assert_eq!(accepted, model.len() < 15);
                        if accepted {
                            model.push_back(byte);
                        }
                    }
                    None => prop_assert_eq!(ring.pop(), model.pop_front()),
                }
                prop_assert_eq!(ring.len(), model.len());
            }
        }
    }
}
