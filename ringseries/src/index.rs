//! Circular index arithmetic shared by every ring buffer variant.
//!
//! The backing storage of a ring buffer is rounded up to a power of two so
//! that physical positions can be computed with a mask instead of a modulo.
//! The mutable state is two monotonically increasing write counters.
//! `claimed` is raised before a slot store begins and `next_write` is
//! published once it has finished. Between the two, a slot can hold a value
//! that readers may observe but the write sequence does not yet cover, so
//! traversal cursors validate against `claimed` after each slot read.
//!
//! Logical offset 0 is always the most recently written element. For a
//! counter value `head`, offset `o` lives at physical slot
//! `(head - o - 1) & mask`, and the next write goes to `head & mask`.

use std::sync::atomic::{AtomicU64, Ordering, fence};

use crate::error::{ArgumentError, IndexError, Result};

/// Capacity bookkeeping and position arithmetic for a circular buffer.
#[derive(Debug)]
pub struct CircularIndex {
    /// Capacity requested at construction; never the rounded storage size.
    capacity: usize,
    /// `storage_len - 1`.
    mask: usize,
    /// Total number of writes since construction or the last reset.
    next_write: AtomicU64,
    /// Number of writes started; runs at most one ahead of `next_write`.
    claimed: AtomicU64,
}

/// Returns the smallest power of two greater than or equal to `x`.
///
/// Zero rounds up to one. Returns `None` if the result does not fit in a
/// `usize`.
pub fn round_up_to_power_of_two(x: usize) -> Option<usize> {
    x.checked_next_power_of_two()
}

impl CircularIndex {
    /// Creates the index for a buffer holding `capacity` elements.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::NotPositive`] if `capacity` is zero and
    /// [`ArgumentError::CapacityTooLarge`] if the storage size would overflow.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(ArgumentError::NotPositive { name: "capacity" }.into());
        }
        let storage_len =
            round_up_to_power_of_two(capacity).ok_or(ArgumentError::CapacityTooLarge { capacity })?;

        Ok(Self {
            capacity,
            mask: storage_len - 1,
            next_write: AtomicU64::new(0),
            claimed: AtomicU64::new(0),
        })
    }

    /// Returns the capacity supplied at construction.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the size of the backing storage (a power of two).
    #[inline]
    pub fn storage_len(&self) -> usize {
        self.mask + 1
    }

    /// Returns the current write sequence.
    #[inline]
    pub fn next_write(&self) -> u64 {
        self.next_write.load(Ordering::Acquire)
    }

    /// Announces the write that will raise the sequence to `next_write`.
    ///
    /// Must be called by the producer before the slot store. The release
    /// fence orders the claim before that store, so a reader that observes
    /// the stored value also observes the claim.
    #[inline]
    pub(crate) fn claim(&self, next_write: u64) {
        self.claimed.store(next_write, Ordering::Relaxed);
        fence(Ordering::Release);
    }

    /// Returns the number of writes started, for use after a slot read.
    ///
    /// The acquire fence pairs with the one in [`CircularIndex::claim`]:
    /// if the preceding slot read returned a value from an unpublished
    /// write, the returned count already includes that write.
    #[inline]
    pub fn claimed_after_read(&self) -> u64 {
        fence(Ordering::Acquire);
        self.claimed.load(Ordering::Relaxed)
    }

    /// Publishes a completed write. Only the producer may call this.
    #[inline]
    pub(crate) fn publish(&self, next_write: u64) {
        self.next_write.store(next_write, Ordering::Release);
    }

    /// Resets both write counters to zero.
    pub(crate) fn reset(&self) {
        self.next_write.store(0, Ordering::Release);
        self.claimed.store(0, Ordering::Release);
    }

    /// Returns the number of populated elements for the counter value `head`.
    #[inline]
    #[allow(clippy::cast_possible_truncation)] // min with a usize capacity
    pub fn length_at(&self, head: u64) -> usize {
        head.min(self.capacity as u64) as usize
    }

    /// Returns the number of populated elements right now.
    #[inline]
    pub fn length(&self) -> usize {
        self.length_at(self.next_write())
    }

    /// Returns the physical slot that the write numbered `head` goes to.
    #[inline]
    #[allow(clippy::cast_possible_truncation)] // masked to storage length
    pub fn write_slot(&self, head: u64) -> usize {
        (head as usize) & self.mask
    }

    /// Returns the physical slot of logical `offset` for counter value `head`.
    #[inline]
    #[allow(clippy::cast_possible_truncation)] // masked to storage length
    pub fn physical_index(&self, head: u64, offset: usize) -> usize {
        (head.wrapping_sub(offset as u64).wrapping_sub(1) as usize) & self.mask
    }

    /// Checks that `offset` addresses a populated element for counter value
    /// `head`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::BufferTooSmall`] if the buffer could never hold
    /// `offset`, and [`IndexError::OutOfRange`] if it could but that position
    /// has not been written yet.
    pub fn validate_offset_at(&self, head: u64, offset: usize) -> Result<()> {
        if offset >= self.capacity {
            return Err(IndexError::BufferTooSmall {
                actual_capacity: self.capacity,
                required_capacity: offset.saturating_add(1),
            }
            .into());
        }
        let length = self.length_at(head);
        if offset >= length {
            return Err(IndexError::OutOfRange {
                index: offset,
                length,
            }
            .into());
        }
        Ok(())
    }

    /// Validates `offset` against the current write sequence.
    ///
    /// # Errors
    ///
    /// See [`CircularIndex::validate_offset_at`].
    pub fn validate_offset(&self, offset: usize) -> Result<()> {
        self.validate_offset_at(self.next_write(), offset)
    }

    /// Splits the `count` newest elements for counter value `head` into at
    /// most two physical runs, newest run first.
    ///
    /// Each run is returned as an ascending physical range and must be read
    /// back to front to visit elements newest-first. The second range is
    /// empty unless the content wraps around the end of storage.
    pub fn segments(&self, head: u64, count: usize) -> [std::ops::Range<usize>; 2] {
        if count == 0 {
            return [0..0, 0..0];
        }
        let newest = self.physical_index(head, 0);
        if newest + 1 >= count {
            [newest + 1 - count..newest + 1, 0..0]
        } else {
            let tail = count - (newest + 1);
            let storage_len = self.storage_len();
            [0..newest + 1, storage_len - tail..storage_len]
        }
    }
}

impl Default for CircularIndex {
    fn default() -> Self {
        Self {
            capacity: crate::config::DEFAULT_CAPACITY,
            mask: crate::config::DEFAULT_CAPACITY.next_power_of_two() - 1,
            next_write: AtomicU64::new(0),
            claimed: AtomicU64::new(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RingSeriesError;

    #[test]
    fn test_round_up_to_power_of_two() {
        assert_eq!(round_up_to_power_of_two(1), Some(1));
        assert_eq!(round_up_to_power_of_two(2), Some(2));
        assert_eq!(round_up_to_power_of_two(3), Some(4));
        assert_eq!(round_up_to_power_of_two(1000), Some(1024));
        assert_eq!(round_up_to_power_of_two(usize::MAX), None);
    }

    #[test]
    fn test_capacity_is_not_rounded() {
        for capacity in [1, 3, 5, 64, 100] {
            let index = CircularIndex::new(capacity).unwrap();
            assert_eq!(index.capacity(), capacity);
            assert_eq!(index.storage_len(), capacity.next_power_of_two());
        }
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            CircularIndex::new(0),
            Err(RingSeriesError::Argument(ArgumentError::NotPositive {
                name: "capacity"
            }))
        ));
    }

    #[test]
    fn test_physical_index() {
        let index = CircularIndex::new(4).unwrap();
        // After six writes, the newest (sequence 5) sits at slot 1.
        assert_eq!(index.physical_index(6, 0), 1);
        assert_eq!(index.physical_index(6, 1), 0);
        assert_eq!(index.physical_index(6, 2), 3);
        assert_eq!(index.physical_index(6, 3), 2);
        assert_eq!(index.write_slot(6), 2);
    }

    #[test]
    fn test_validate_offset() {
        let index = CircularIndex::new(2).unwrap();
        index.publish(1);

        assert!(index.validate_offset(0).is_ok());
        assert!(matches!(
            index.validate_offset(1),
            Err(RingSeriesError::Index(IndexError::OutOfRange {
                index: 1,
                length: 1
            }))
        ));
        assert!(matches!(
            index.validate_offset(5),
            Err(RingSeriesError::Index(IndexError::BufferTooSmall {
                actual_capacity: 2,
                required_capacity: 6
            }))
        ));
    }

    #[test]
    fn test_claim_runs_ahead_of_publish() {
        let index = CircularIndex::new(4).unwrap();
        index.claim(1);
        assert_eq!(index.claimed_after_read(), 1);
        assert_eq!(index.next_write(), 0);

        index.publish(1);
        assert_eq!(index.next_write(), 1);

        index.reset();
        assert_eq!(index.claimed_after_read(), 0);
        assert_eq!(index.next_write(), 0);
    }

    #[test]
    fn test_segments() {
        let index = CircularIndex::new(4).unwrap();
        // No wrap: writes 0..3 occupy slots 0..3.
        assert_eq!(index.segments(3, 3), [0..3, 0..0]);
        // Wrap: after six writes the newest four are slots 1,0,3,2.
        assert_eq!(index.segments(6, 4), [0..2, 2..4]);
        assert_eq!(index.segments(6, 0), [0..0, 0..0]);
    }
}
