//! Sequence contract and index-order algebra.
//!
//! Every sequence in this crate knows its length and its [`Order`]: whether
//! index 0 holds the oldest element, the newest element, or nothing is known.
//! Window operations (shift, take, drop-take) are expressed once here, in
//! terms of a [`Span`] over the sequence's encounter-order stream, so that
//! each dataset view can derive its stream from its parent's stream without
//! re-deriving the arithmetic per view kind.
//!
//! Encounter order is chronological: an ascending sequence is streamed in
//! index order, a descending one from its highest index down to 0.

use std::iter::{Skip, Take};

use serde::{Deserialize, Serialize};

use crate::error::{OrderError, Result};

/// Relation between index position and age of the elements in a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Order {
    /// Index 0 is the oldest element; encounter order is ascending index order.
    AscendingIndex,
    /// Index 0 is the newest element; encounter order is descending index order.
    DescendingIndex,
    /// Nothing is known about the relation between index and age.
    Unspecified,
}

/// Contract shared by ring buffers and dataset views.
pub trait Sequence {
    /// Returns the number of elements currently in the sequence.
    fn length(&self) -> usize;

    /// Returns the index order of the sequence.
    fn order(&self) -> Order;

    /// Returns `true` if the sequence has no elements.
    fn is_empty(&self) -> bool {
        self.length() == 0
    }
}

/// A contiguous run of an encounter-order stream: skip `skip` elements, then
/// keep at most `take`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Number of leading stream elements to discard.
    pub skip: usize,
    /// Maximum number of stream elements to keep after the skip.
    pub take: usize,
}

impl Span {
    /// Applies this span to a stream.
    pub fn apply<I: Iterator>(self, stream: I) -> Take<Skip<I>> {
        stream.skip(self.skip).take(self.take)
    }
}

impl Order {
    /// Returns `true` for [`Order::DescendingIndex`].
    pub fn is_descending(self) -> bool {
        self == Order::DescendingIndex
    }

    /// Returns the indexes `0..length` in encounter order.
    pub fn indexes(self, length: usize) -> impl DoubleEndedIterator<Item = usize> + ExactSizeIterator {
        let descending = self.is_descending();
        (0..length).map(move |i| if descending { length - i - 1 } else { i })
    }

    /// Span of the encounter stream that remains after dropping the first
    /// `n` indexes.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Unsupported`] for [`Order::Unspecified`].
    pub fn shift<S: Sequence + ?Sized>(self, n: usize, seq: &S) -> Result<Span> {
        let length = seq.length();
        match self {
            Order::AscendingIndex => Ok(Span {
                skip: n,
                take: length.saturating_sub(n),
            }),
            Order::DescendingIndex => Ok(Span {
                skip: 0,
                take: length.saturating_sub(n),
            }),
            Order::Unspecified => Err(self.unsupported("shift")),
        }
    }

    /// Span of the encounter stream covering the first `max_count` indexes.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Unsupported`] for [`Order::Unspecified`].
    pub fn take<S: Sequence + ?Sized>(self, max_count: usize, seq: &S) -> Result<Span> {
        let length = seq.length();
        match self {
            Order::AscendingIndex => Ok(Span {
                skip: 0,
                take: max_count,
            }),
            Order::DescendingIndex => Ok(Span {
                skip: length.saturating_sub(max_count),
                take: max_count,
            }),
            Order::Unspecified => Err(self.unsupported("take")),
        }
    }

    /// Span of the encounter stream covering indexes
    /// `from_index..from_index + max_count`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Unsupported`] for [`Order::Unspecified`].
    pub fn drop_take<S: Sequence + ?Sized>(
        self,
        from_index: usize,
        max_count: usize,
        seq: &S,
    ) -> Result<Span> {
        let length = seq.length();
        match self {
            Order::AscendingIndex => Ok(Span {
                skip: from_index,
                take: max_count,
            }),
            Order::DescendingIndex => {
                let end = length.saturating_sub(from_index);
                let skip = end.saturating_sub(max_count);
                Ok(Span {
                    skip,
                    take: end - skip,
                })
            }
            Order::Unspecified => Err(self.unsupported("drop_take")),
        }
    }

    fn unsupported(self, operation: &'static str) -> crate::error::RingSeriesError {
        OrderError::Unsupported {
            operation,
            order: self,
        }
        .into()
    }
}
