//! Bounded SPSC ring buffer.
//!
//! A fixed-capacity single-producer single-consumer ring built on two
//! free-running sequence counters. The producer owns the tail sequence, the
//! consumer owns the head sequence, and the two sides synchronize through a
//! single acquire/release pair per transfer.
//!
//! # RT Safety
//!
//! [`SpscRing::push`] and [`SpscRing::pop`] are wait-free under the SPSC
//! discipline: one load of the foreign sequence, one slot access, one store
//! of the own sequence. No allocation, no blocking, no syscalls.
//!
//! # SPSC Contract
//!
//! Exactly one thread of control may call [`SpscRing::push`] and exactly one
//! (possibly the same) may call [`SpscRing::pop`]. Observation methods
//! ([`SpscRing::len`], [`SpscRing::is_empty`], ...) are safe from any thread
//! and eventually consistent.

use core::cell::UnsafeCell;
use core::fmt;
use core::mem::MaybeUninit;

use portable_atomic::{AtomicUsize, Ordering};

/// Bounded single-producer single-consumer ring buffer.
///
/// `N` is the capacity in items. A power of two lets the slot index reduce
/// to a mask, but any non-zero capacity works.
///
/// A ring full of unconsumed items rejects further pushes; items are handed
/// back to the producer rather than overwritten.
///
/// # Example
///
/// ```rust
/// use fccu_atomic::SpscRing;
///
/// let ring: SpscRing<u32, 4> = SpscRing::new();
/// assert!(ring.push(1).is_ok());
/// assert!(ring.push(2).is_ok());
/// assert_eq!(ring.pop(), Some(1));
/// assert_eq!(ring.pop(), Some(2));
/// assert_eq!(ring.pop(), None);
/// ```
pub struct SpscRing<T, const N: usize> {
    slots: [UnsafeCell<MaybeUninit<T>>; N],
    /// Producer sequence: total items ever pushed.
    tail: AtomicUsize,
    /// Consumer sequence: total items ever popped.
    head: AtomicUsize,
}

// The producer writes a slot strictly before publishing it through the tail
// store (Release), and the consumer reads it strictly after the tail load
// (Acquire); the symmetric pair guards slot reuse through the head sequence.
unsafe impl<T: Send, const N: usize> Send for SpscRing<T, N> {}
unsafe impl<T: Send, const N: usize> Sync for SpscRing<T, N> {}

impl<T, const N: usize> SpscRing<T, N> {
    /// Create an empty ring.
    ///
    /// Storage is inline; no heap allocation occurs.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| UnsafeCell::new(MaybeUninit::uninit())),
            tail: AtomicUsize::new(0),
            head: AtomicUsize::new(0),
        }
    }

    /// Push an item (producer side).
    ///
    /// # Errors
    ///
    /// Returns `Err(item)` when the ring is full, handing the item back to
    /// the caller.
    #[inline]
    pub fn push(&self, item: T) -> Result<(), T> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        if tail.wrapping_sub(head) >= N {
            return Err(item);
        }
        // The slot at `tail` is unreachable by the consumer until the
        // Release store below publishes it.
        unsafe { (*self.slots[tail % N].get()).write(item) };
        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    /// Pop the oldest item (consumer side).
    ///
    /// Returns `None` when the ring is empty.
    #[inline]
    pub fn pop(&self) -> Option<T> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        if head == tail {
            return None;
        }
        // The slot at `head` was initialized by the producer before the
        // tail store that made it visible; the Release store below returns
        // it to the producer.
        let item = unsafe { (*self.slots[head % N].get()).assume_init_read() };
        self.head.store(head.wrapping_add(1), Ordering::Release);
        Some(item)
    }

    /// Number of items currently buffered.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        tail.wrapping_sub(head)
    }

    /// Number of free slots.
    #[inline]
    #[must_use]
    pub fn available(&self) -> usize {
        N.saturating_sub(self.len())
    }

    /// True when no items are buffered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when no slot is free.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() >= N
    }

    /// Capacity in items.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<T, const N: usize> Default for SpscRing<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Drop for SpscRing<T, N> {
    fn drop(&mut self) {
        while self.pop().is_some() {}
    }
}

impl<T, const N: usize> fmt::Debug for SpscRing<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpscRing")
            .field("len", &self.len())
            .field("capacity", &N)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_fifo() {
        let ring: SpscRing<u32, 8> = SpscRing::new();

        for i in 0..5 {
            assert!(ring.push(i).is_ok());
        }
        for i in 0..5 {
            assert_eq!(ring.pop(), Some(i));
        }
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn test_full_ring_rejects() {
        let ring: SpscRing<u32, 4> = SpscRing::new();

        for i in 0..4 {
            assert!(ring.push(i).is_ok());
        }
        assert!(ring.is_full());
        assert_eq!(ring.push(99), Err(99));

        assert_eq!(ring.pop(), Some(0));
        assert!(ring.push(99).is_ok());
    }

    #[test]
    fn test_wraparound() {
        let ring: SpscRing<u32, 4> = SpscRing::new();

        for round in 0..10u32 {
            assert!(ring.push(round).is_ok());
            assert!(ring.push(round + 100).is_ok());
            assert_eq!(ring.pop(), Some(round));
            assert_eq!(ring.pop(), Some(round + 100));
        }
        assert!(ring.is_empty());
    }

    #[test]
    fn test_len_and_available() {
        let ring: SpscRing<u32, 8> = SpscRing::new();
        assert_eq!(ring.len(), 0);
        assert_eq!(ring.available(), 8);
        assert_eq!(ring.capacity(), 8);

        ring.push(1).unwrap();
        ring.push(2).unwrap();
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.available(), 6);
    }

    #[test]
    fn test_drop_releases_buffered_items() {
        let ring: SpscRing<std::vec::Vec<u8>, 4> = SpscRing::new();
        ring.push(std::vec![1, 2, 3]).unwrap();
        ring.push(std::vec![4]).unwrap();
        drop(ring);
    }
}
