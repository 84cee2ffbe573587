//! Splittable, fail-fast traversal over a ring buffer.
//!
//! A [`RingCursor`] captures the buffer's write sequence when it is created
//! and then walks logical offsets `[origin, fence)` of that snapshot, newest
//! element first. It holds no lock. Instead, every delivered element is
//! checked after its slot read against the number of writes the producer
//! has claimed: the element written as sequence `s` is retained only while
//! at most `s + capacity` writes have started. Checking started writes
//! rather than published ones covers a store that is still in flight when
//! the buffer's capacity equals its storage size. The bound for the next
//! front element is the cursor's `safe_write` baseline, which drops by one
//! per delivered element.
//!
//! Once the producer passes that bound, the cursor fails with
//! [`TraversalError::ConcurrentModification`] at the first element that is
//! no longer retained and stops; it never delivers overwritten data.
//!
//! [`RingCursor::split`] hands off the front half of the remaining range as
//! an independent cursor with its own baseline, which is the only mechanism
//! for parallel decomposition. The two halves need no further coordination.

use std::iter::FusedIterator;
use std::ops::BitOr;

use crate::element::Element;
use crate::error::{Result, RingSeriesError, TraversalError};
use crate::ring::RingBuffer;

/// Traversal guarantees a scheduler can rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Characteristics(u8);

impl Characteristics {
    /// The exact number of remaining elements is known.
    pub const SIZED: Self = Self(1);
    /// Elements are delivered in a defined encounter order.
    pub const ORDERED: Self = Self(1 << 1);
    /// Cursors produced by splitting are sized as well.
    pub const SUBSIZED: Self = Self(1 << 2);

    /// Returns `true` if every flag in `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the raw flag bits.
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for Characteristics {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Fail-fast cursor over a [`RingBuffer`] snapshot.
///
/// Iterating yields `Result<T>`: `Ok` for every retained element, newest
/// first, and a single `Err` if the producer overwrote data the cursor had
/// not delivered yet. Iterating from the back walks oldest first with the
/// same checks.
#[derive(Debug)]
pub struct RingCursor<'a, T: Element> {
    ring: &'a RingBuffer<T>,
    /// Write sequence of the buffer when the cursor was created.
    head: u64,
    /// Next logical offset to deliver from the front.
    origin: usize,
    /// One past the last logical offset to deliver.
    fence: usize,
    /// Highest claimed write count under which `origin` is still retained.
    safe_write: u64,
}

impl<'a, T: Element> RingCursor<'a, T> {
    pub(crate) fn new(ring: &'a RingBuffer<T>) -> Self {
        let head = ring.write_sequence();
        let fence = head.min(ring.capacity() as u64);
        #[allow(clippy::cast_possible_truncation)] // bounded by capacity
        let fence = fence as usize;
        Self {
            ring,
            head,
            origin: 0,
            fence,
            // Offset 0 was written as sequence head - 1.
            safe_write: (head + ring.capacity() as u64).saturating_sub(1),
        }
    }

    /// Number of elements not yet delivered.
    pub fn remaining(&self) -> usize {
        self.fence - self.origin
    }

    /// Current baseline: the highest write sequence the buffer may reach
    /// before the next front element is lost.
    pub fn safe_write_sequence(&self) -> u64 {
        self.safe_write
    }

    /// Traversal guarantees of this cursor.
    pub fn characteristics(&self) -> Characteristics {
        Characteristics::SIZED | Characteristics::ORDERED | Characteristics::SUBSIZED
    }

    /// Delivers the next element to `action`.
    ///
    /// Returns `Ok(false)` once the cursor is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`TraversalError::ConcurrentModification`] if the element was
    /// overwritten before it could be delivered. The cursor is exhausted
    /// afterwards.
    pub fn try_advance<F: FnOnce(T)>(&mut self, action: F) -> Result<bool> {
        if self.origin >= self.fence {
            return Ok(false);
        }
        let offset = self.origin;
        let safe = self.safe_write;
        self.origin += 1;
        self.safe_write = safe.saturating_sub(1);

        let (value, claimed) = self.ring.read_claimed(self.head, offset);
        match value {
            Some(value) if claimed <= safe => {
                action(value);
                Ok(true)
            }
            _ => Err(self.fail(offset, safe, claimed)),
        }
    }

    /// Delivers every remaining element to `action`, newest first.
    ///
    /// # Errors
    ///
    /// Same as [`RingCursor::try_advance`]; elements before the overwritten
    /// one have already been delivered.
    pub fn for_each_remaining<F: FnMut(T)>(&mut self, mut action: F) -> Result<()> {
        let (mut offset, fence, mut safe) = (self.origin, self.fence, self.safe_write);
        let (ring, head) = (self.ring, self.head);
        self.origin = fence;

        while offset < fence {
            let (value, claimed) = ring.read_claimed(head, offset);
            match value {
                Some(value) if claimed <= safe => action(value),
                _ => return Err(self.fail(offset, safe, claimed)),
            }
            offset += 1;
            safe = safe.saturating_sub(1);
        }
        self.safe_write = safe;
        Ok(())
    }

    /// Splits off the front half of the remaining range.
    ///
    /// The returned cursor covers the newer half and keeps the current
    /// baseline; `self` continues with the older half and a baseline lowered
    /// by the length of the split-off part. Returns `None` once fewer than
    /// two elements remain.
    pub fn split(&mut self) -> Option<Self> {
        let mid = self.origin + self.remaining() / 2;
        if mid == self.origin {
            return None;
        }
        let prefix = Self {
            ring: self.ring,
            head: self.head,
            origin: self.origin,
            fence: mid,
            safe_write: self.safe_write,
        };
        self.safe_write -= (mid - self.origin) as u64;
        self.origin = mid;
        Some(prefix)
    }

    fn fail(&mut self, offset: usize, safe: u64, claimed: u64) -> RingSeriesError {
        tracing::debug!(
            offset,
            safe_write_sequence = safe,
            write_sequence = claimed,
            "ring cursor detected concurrent modification"
        );
        self.fence = self.origin;
        TraversalError::ConcurrentModification {
            offset,
            safe_write_sequence: safe,
            write_sequence: claimed,
        }
        .into()
    }
}

impl<T: Element> Iterator for RingCursor<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut delivered = None;
        match self.try_advance(|value| delivered = Some(value)) {
            Ok(true) => delivered.map(Ok),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl<T: Element> DoubleEndedIterator for RingCursor<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.origin >= self.fence {
            return None;
        }
        self.fence -= 1;
        let offset = self.fence;
        let safe = self.safe_write - (offset - self.origin) as u64;

        let (value, claimed) = self.ring.read_claimed(self.head, offset);
        match value {
            Some(value) if claimed <= safe => Some(Ok(value)),
            _ => Some(Err(self.fail(offset, safe, claimed))),
        }
    }
}

impl<T: Element> ExactSizeIterator for RingCursor<'_, T> {}

impl<T: Element> FusedIterator for RingCursor<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::{IntRingBuffer, RingBuffer};

    fn filled(capacity: usize, count: i32) -> IntRingBuffer {
        let ring = IntRingBuffer::new(capacity).unwrap();
        ring.add_all(1..=count);
        ring
    }

    #[test]
    fn test_newest_first() {
        let ring = filled(4, 6);
        let values: Vec<i32> = ring.cursor().map(Result::unwrap).collect();
        assert_eq!(values, vec![6, 5, 4, 3]);
    }

    #[test]
    fn test_reverse_is_oldest_first() {
        let ring = filled(4, 6);
        let values: Vec<i32> = ring.cursor().rev().map(Result::unwrap).collect();
        assert_eq!(values, vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_empty_cursor() {
        let ring = IntRingBuffer::new(3).unwrap();
        let mut cursor = ring.cursor();
        assert_eq!(cursor.remaining(), 0);
        assert!(cursor.split().is_none());
        assert!(!cursor.try_advance(|_| panic!("no element expected")).unwrap());
        assert!(cursor.next().is_none());
    }

    #[test]
    fn test_characteristics() {
        let ring = filled(2, 1);
        let traits = ring.cursor().characteristics();
        assert!(traits.contains(Characteristics::SIZED));
        assert!(traits.contains(Characteristics::ORDERED | Characteristics::SUBSIZED));
        assert_eq!(traits.bits(), 0b111);
    }

    #[test]
    fn test_split_covers_range_disjointly() {
        let ring = filled(7, 10);
        let mut back = ring.cursor();
        let mut front = back.split().unwrap();
        assert_eq!(front.remaining(), 3);
        assert_eq!(back.remaining(), 4);

        let mut front_front = front.split().unwrap();
        assert_eq!(front_front.remaining(), 1);
        assert!(front_front.split().is_none());

        let mut all = Vec::new();
        front_front.for_each_remaining(|v| all.push(v)).unwrap();
        front.for_each_remaining(|v| all.push(v)).unwrap();
        back.for_each_remaining(|v| all.push(v)).unwrap();
        assert_eq!(all, vec![10, 9, 8, 7, 6, 5, 4]);
    }

    #[test]
    fn test_split_baselines_are_independent() {
        let ring = filled(4, 4);
        let mut back = ring.cursor();
        let front = back.split().unwrap();

        // Offsets 0 and 1 were written as sequences 3 and 2.
        assert_eq!(front.safe_write_sequence(), 3 + 4);
        assert_eq!(back.safe_write_sequence(), 1 + 4);
    }

    #[test]
    fn test_overwrite_detected_on_advance() {
        let ring = filled(4, 4);
        let mut cursor = ring.cursor();
        assert_eq!(cursor.next().unwrap().unwrap(), 4);

        // Evicts the three elements the cursor has not delivered yet.
        ring.add_all(100..104);

        let err = cursor.next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            RingSeriesError::Traversal(TraversalError::ConcurrentModification {
                offset: 1,
                safe_write_sequence: 6,
                write_sequence: 8
            })
        ));
        assert!(cursor.next().is_none());
    }

    #[test]
    fn test_partial_overwrite_delivers_retained_elements() {
        let ring = filled(4, 4);
        let mut cursor = ring.cursor();

        // One more write evicts only the oldest element (value 1).
        ring.accept(5);

        let mut seen = Vec::new();
        let err = cursor.for_each_remaining(|v| seen.push(v)).unwrap_err();
        assert_eq!(seen, vec![4, 3, 2]);
        assert!(matches!(
            err,
            RingSeriesError::Traversal(TraversalError::ConcurrentModification { offset: 3, .. })
        ));
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_reverse_detects_oldest_first() {
        let ring = filled(3, 3);
        let mut cursor = ring.cursor();
        ring.accept(4);

        assert!(cursor.next_back().unwrap().is_err());
        assert!(cursor.next().is_none());
    }

    #[test]
    fn test_generic_payload_cursor() {
        let ring = RingBuffer::<String>::new(2).unwrap();
        ring.add_all(["a", "b", "c"].map(String::from));
        let values: Result<Vec<String>> = ring.iter().collect();
        assert_eq!(values.unwrap(), vec!["c", "b"]);
    }
}
