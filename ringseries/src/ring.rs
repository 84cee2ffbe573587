//! Fixed-capacity history ring buffer.
//!
//! A [`RingBuffer`] keeps the `capacity` most recently added elements. Adding
//! to a full buffer silently overwrites the oldest element. Elements are
//! addressed by offset from the newest one: offset 0 is the latest value,
//! offset `length() - 1` the oldest still retained.
//!
//! # Key Features
//!
//! - O(1) `accept`, `get` and `set`
//! - Power-of-two backing storage with mask arithmetic
//! - Unboxed, lock-free storage for `i32`, `i64` and `f64`
//! - Bulk reads (`copy_into`, `to_vec`, `for_each`) in at most two runs
//! - Splittable, fail-fast [`RingCursor`] traversal
//!
//! # Thread Safety
//!
//! RingBuffer is designed for single-writer, multiple-reader patterns. All
//! methods take `&self`; exactly one thread may call the mutating ones
//! (`accept`, `add`, `set`, `clear`). This is a caller discipline, not
//! something the buffer arbitrates. Readers of the lock-free numeric types
//! never block the producer. Other element types sit behind a per-slot
//! lock (see [`crate::element::LockedSlot`]), so a reader holding a slot can
//! briefly stall an `accept` into that same slot. Cursors detect overwritten
//! data through the write claim rather than by excluding the producer.

use std::fmt;
use std::sync::Arc;

use crate::config::BufferConfig;
use crate::cursor::RingCursor;
use crate::dataset::{Dataset, Store};
use crate::element::{Element, Slot};
use crate::error::{IndexError, Result};
use crate::index::CircularIndex;
use crate::order::{Order, Sequence};

/// Ring buffer of `i32` values.
pub type IntRingBuffer = RingBuffer<i32>;

/// Ring buffer of `i64` values.
pub type LongRingBuffer = RingBuffer<i64>;

/// Ring buffer of `f64` values.
pub type DoubleRingBuffer = RingBuffer<f64>;

/// A fixed-capacity, overwrite-oldest history buffer.
pub struct RingBuffer<T: Element> {
    /// Capacity, mask and write sequence.
    index: CircularIndex,
    /// Backing storage, `index.storage_len()` slots.
    slots: Box<[T::Slot]>,
}

impl<T: Element> RingBuffer<T> {
    /// Creates an empty ring buffer retaining `capacity` elements.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ArgumentError`] if `capacity` is zero or too
    /// large to round up to a power of two.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ringseries::IntRingBuffer;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let ring = IntRingBuffer::new(4)?;
    /// for value in 1..=6 {
    ///     ring.accept(value);
    /// }
    /// assert_eq!(ring.length(), 4);
    /// assert_eq!(ring.get(0)?, 6);
    /// assert_eq!(ring.to_vec()?, vec![6, 5, 4, 3]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self::from_index(CircularIndex::new(capacity)?))
    }

    /// Creates an empty ring buffer from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ArgumentError`] if the configuration is invalid.
    pub fn with_config(config: &BufferConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.capacity)
    }

    fn from_index(index: CircularIndex) -> Self {
        let slots = (0..index.storage_len()).map(|_| T::Slot::default()).collect();
        tracing::trace!(
            capacity = index.capacity(),
            storage_len = index.storage_len(),
            "ring buffer allocated"
        );
        Self { index, slots }
    }

    /// Adds a new element, overwriting the oldest one if the buffer is full.
    ///
    /// This is the hot path: a claim, one slot store and one publish.
    #[inline]
    pub fn accept(&self, value: T) {
        let head = self.index.next_write();
        self.index.claim(head + 1);
        self.slots[self.index.write_slot(head)].store(value);
        self.index.publish(head + 1);
    }

    /// Same as [`RingBuffer::accept`].
    #[inline]
    pub fn add(&self, value: T) {
        self.accept(value);
    }

    /// Adds every element of `values` in iteration order.
    pub fn add_all<I: IntoIterator<Item = T>>(&self, values: I) {
        for value in values {
            self.accept(value);
        }
    }

    /// Returns the element at `offset` from the newest one.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::BufferTooSmall`] if `offset >= capacity()` and
    /// [`IndexError::OutOfRange`] if `offset >= length()`.
    pub fn get(&self, offset: usize) -> Result<T> {
        let head = self.index.next_write();
        self.index.validate_offset_at(head, offset)?;
        self.read_at(head, offset).ok_or_else(|| self.vacated(offset))
    }

    /// Replaces the element at `offset` from the newest one.
    ///
    /// # Errors
    ///
    /// Same as [`RingBuffer::get`].
    pub fn set(&self, offset: usize, value: T) -> Result<()> {
        let head = self.index.next_write();
        self.index.validate_offset_at(head, offset)?;
        self.slots[self.index.physical_index(head, offset)].store(value);
        Ok(())
    }

    /// Returns the number of retained elements, `min(capacity, writes)`.
    #[inline]
    pub fn length(&self) -> usize {
        self.index.length()
    }

    /// Returns the capacity supplied at construction.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.index.capacity()
    }

    /// Returns the size of the power-of-two backing storage.
    #[inline]
    pub fn storage_len(&self) -> usize {
        self.index.storage_len()
    }

    /// Returns how many more elements can be added before the oldest one is
    /// overwritten.
    #[inline]
    pub fn remaining_capacity(&self) -> usize {
        self.capacity() - self.length()
    }

    /// Returns `true` if nothing has been added since construction or the
    /// last `clear`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.next_write() == 0
    }

    /// Returns `true` once `capacity` elements are retained.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.length() == self.capacity()
    }

    /// Returns the total number of writes since construction or the last
    /// `clear`.
    #[inline]
    pub fn write_sequence(&self) -> u64 {
        self.index.next_write()
    }

    /// Removes all elements.
    ///
    /// The write sequence returns to zero and slots holding owned values
    /// drop them; numeric slots keep their stale bits.
    pub fn clear(&self) {
        self.index.reset();
        for slot in self.slots.iter() {
            slot.release();
        }
        tracing::trace!(capacity = self.capacity(), "ring buffer cleared");
    }

    /// Copies the retained elements, newest first, into
    /// `destination[destination_offset..]`.
    ///
    /// Returns the number of elements copied.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::BufferTooSmall`] if the destination cannot hold
    /// `length()` elements starting at `destination_offset`.
    pub fn copy_into(&self, destination: &mut [T], destination_offset: usize) -> Result<usize> {
        let head = self.index.next_write();
        let count = self.index.length_at(head);
        let required = destination_offset.saturating_add(count);
        if destination.len() < required {
            return Err(IndexError::BufferTooSmall {
                actual_capacity: destination.len(),
                required_capacity: required,
            }
            .into());
        }

        let target = &mut destination[destination_offset..required];
        let mut filled = 0;
        self.visit(head, count, |value| {
            target[filled] = value;
            filled += 1;
        })?;
        Ok(count)
    }

    /// Returns the retained elements, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::OutOfRange`] if the buffer is cleared while the
    /// copy is in progress.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        let head = self.index.next_write();
        let count = self.index.length_at(head);
        let mut values = Vec::with_capacity(count);
        self.visit(head, count, |value| values.push(value))?;
        Ok(values)
    }

    /// Calls `consumer` with every retained element, newest first.
    ///
    /// # Errors
    ///
    /// Same as [`RingBuffer::to_vec`].
    pub fn for_each<F: FnMut(T)>(&self, consumer: F) -> Result<()> {
        let head = self.index.next_write();
        self.visit(head, self.index.length_at(head), consumer)
    }

    /// Returns a fail-fast cursor over the current contents, newest first.
    pub fn cursor(&self) -> RingCursor<'_, T> {
        RingCursor::new(self)
    }

    /// Same as [`RingBuffer::cursor`].
    pub fn iter(&self) -> RingCursor<'_, T> {
        self.cursor()
    }

    /// Returns a dataset view rooted at this buffer.
    ///
    /// The view reads through to the live buffer, so it observes every later
    /// `accept` and `clear`.
    pub fn dataset(self: &Arc<Self>) -> Dataset<T> {
        let store: Arc<dyn Store<T>> = Arc::<Self>::clone(self);
        Dataset::from_store(store)
    }

    /// Reads offset `offset` for the write sequence `head` without validation.
    #[inline]
    pub(crate) fn read_at(&self, head: u64, offset: usize) -> Option<T> {
        self.slots[self.index.physical_index(head, offset)].load()
    }

    /// Reads like [`RingBuffer::read_at`] and also returns the number of
    /// writes claimed once the read completed.
    ///
    /// A claim count above the reader's safe bound means the value may come
    /// from a write that overwrote the requested element.
    #[inline]
    pub(crate) fn read_claimed(&self, head: u64, offset: usize) -> (Option<T>, u64) {
        let value = self.read_at(head, offset);
        (value, self.index.claimed_after_read())
    }

    /// Visits the `count` newest elements for write sequence `head` in at
    /// most two physical runs.
    fn visit<F: FnMut(T)>(&self, head: u64, count: usize, mut consumer: F) -> Result<()> {
        let mut offset = 0;
        for run in self.index.segments(head, count) {
            for slot in self.slots[run].iter().rev() {
                consumer(slot.load().ok_or_else(|| self.vacated(offset))?);
                offset += 1;
            }
        }
        Ok(())
    }

    /// Error for a slot emptied by a concurrent `clear`.
    fn vacated(&self, offset: usize) -> crate::error::RingSeriesError {
        IndexError::OutOfRange {
            index: offset,
            length: self.length(),
        }
        .into()
    }
}

impl<T: Element> Sequence for RingBuffer<T> {
    fn length(&self) -> usize {
        self.index.length()
    }

    fn order(&self) -> Order {
        Order::DescendingIndex
    }
}

impl<T: Element> Default for RingBuffer<T> {
    fn default() -> Self {
        Self::from_index(CircularIndex::default())
    }
}

impl<T: Element> fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.index.capacity())
            .field("storage_len", &self.index.storage_len())
            .field("write_sequence", &self.index.next_write())
            .finish_non_exhaustive()
    }
}

impl<'a, T: Element> IntoIterator for &'a RingBuffer<T> {
    type Item = Result<T>;
    type IntoIter = RingCursor<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.cursor()
    }
}
