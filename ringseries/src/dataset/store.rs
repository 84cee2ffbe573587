//! Terminal stores that dataset views resolve to.

use std::sync::Arc;

use crate::element::Element;
use crate::error::{IndexError, Result};
use crate::order::{Order, Sequence};
use crate::ring::RingBuffer;

/// Boxed encounter-order stream of dataset elements.
pub type Stream<'a, T> = Box<dyn Iterator<Item = Result<T>> + 'a>;

/// Random-access backing store at the root of a view chain.
///
/// Implement this for your own storage to build views over it with
/// [`crate::Dataset::from_store`].
pub trait Store<T>: Sequence + Send + Sync {
    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] if `index` is outside the populated range.
    fn get(&self, index: usize) -> Result<T>;

    /// Streams all elements in encounter order.
    ///
    /// The default walks [`Order::indexes`] through [`Store::get`].
    ///
    /// # Errors
    ///
    /// Implementations may fail if a stream cannot be produced at all.
    fn stream(&self) -> Result<Stream<'_, T>> {
        let length = self.length();
        Ok(Box::new(
            self.order().indexes(length).map(move |index| self.get(index)),
        ))
    }

    /// Returns `true` if the contents can never change.
    fn is_immutable(&self) -> bool {
        false
    }
}

impl<T: Element> Store<T> for RingBuffer<T> {
    fn get(&self, index: usize) -> Result<T> {
        RingBuffer::get(self, index)
    }

    fn stream(&self) -> Result<Stream<'_, T>> {
        // Descending order: encounter order is oldest first.
        Ok(Box::new(self.cursor().rev()))
    }
}

/// Detached, immutable copy of a sequence.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    values: Arc<[T]>,
    order: Order,
}

impl<T> Snapshot<T> {
    /// Wraps `values`, indexed as given, with the stated order.
    pub fn new(values: Vec<T>, order: Order) -> Self {
        Self {
            values: values.into(),
            order,
        }
    }

    /// Returns the values in index order.
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }
}

impl<T> Sequence for Snapshot<T> {
    fn length(&self) -> usize {
        self.values.len()
    }

    fn order(&self) -> Order {
        self.order
    }
}

impl<T: Clone + Send + Sync> Store<T> for Snapshot<T> {
    fn get(&self, index: usize) -> Result<T> {
        self.values.get(index).cloned().ok_or_else(|| {
            IndexError::OutOfRange {
                index,
                length: self.values.len(),
            }
            .into()
        })
    }

    fn stream(&self) -> Result<Stream<'_, T>> {
        let values = self.values.iter().cloned().map(Ok);
        if self.order.is_descending() {
            Ok(Box::new(values.rev()))
        } else {
            Ok(Box::new(values))
        }
    }

    fn is_immutable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RingSeriesError;
    use crate::ring::IntRingBuffer;

    #[test]
    fn test_snapshot_get_and_stream() {
        let snapshot = Snapshot::new(vec![1, 2, 3], Order::DescendingIndex);
        assert_eq!(Store::get(&snapshot, 2).unwrap(), 3);
        assert!(matches!(
            Store::get(&snapshot, 3),
            Err(RingSeriesError::Index(IndexError::OutOfRange { index: 3, length: 3 }))
        ));

        let streamed: Vec<i32> = snapshot.stream().unwrap().map(Result::unwrap).collect();
        assert_eq!(streamed, vec![3, 2, 1]);
    }

    #[test]
    fn test_ring_stream_is_chronological() {
        let ring = IntRingBuffer::new(3).unwrap();
        ring.add_all(1..=5);
        let streamed: Vec<i32> = Store::stream(&ring).unwrap().map(Result::unwrap).collect();
        assert_eq!(streamed, vec![3, 4, 5]);
    }

    #[test]
    fn test_default_stream_follows_order() {
        struct Squares(usize, Order);

        impl Sequence for Squares {
            fn length(&self) -> usize {
                self.0
            }

            fn order(&self) -> Order {
                self.1
            }
        }

        impl Store<usize> for Squares {
            fn get(&self, index: usize) -> Result<usize> {
                Ok(index * index)
            }
        }

        let asc: Vec<usize> = Squares(4, Order::AscendingIndex)
            .stream()
            .unwrap()
            .map(Result::unwrap)
            .collect();
        let desc: Vec<usize> = Squares(4, Order::DescendingIndex)
            .stream()
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(asc, vec![0, 1, 4, 9]);
        assert_eq!(desc, vec![9, 4, 1, 0]);
    }
}
