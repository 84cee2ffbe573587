//! Lazy, composable dataset views.
//!
//! A [`Dataset`] is a cheap, cloneable handle to a read-only sequence. It is
//! either rooted directly in a [`Store`] (a ring buffer, an immutable
//! snapshot, or user storage) or is a view over another dataset. Views never
//! copy data: every `get` is translated through the chain of parents until it
//! reaches the root store. Ownership of the chain is shared, so a view stays
//! valid for as long as it is held; if the root buffer is cleared the view
//! simply reports the new, shorter contents.
//!
//! There are exactly four kinds of node:
//!
//! - **Store**: the root.
//! - **Shift**: drops the first `offset` indexes (`drop`, `reference`).
//! - **Window**: keeps at most `max` indexes starting at `from` (`take`,
//!   `drop_take`).
//! - **Derived**: computes element `i` from the parent, covering `map`,
//!   adjacent-pair views (`differences`, `ratios`, `crosses`), sliding
//!   `subsequences` and `with_right` pairing. Its length is the source
//!   length minus a fixed lookback; a paired source is as long as the
//!   shorter side.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ringseries::{DoubleRingBuffer, Order};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let closes = Arc::new(DoubleRingBuffer::new(100)?);
//! closes.add_all([10.0, 11.0, 12.5, 12.0]);
//!
//! let changes = closes.dataset().differences();
//! assert_eq!(changes.order(), Order::DescendingIndex);
//! assert_eq!(changes.to_vec()?, vec![-0.5, 1.5, 1.0]);
//! # Ok(())
//! # }
//! ```

mod numeric;
mod store;

use std::fmt;
use std::sync::Arc;

pub use store::{Snapshot, Store, Stream};

use crate::error::{ArgumentError, IndexError, Result};
use crate::order::{Order, Sequence};

/// Dataset of `i32` values.
pub type IntDataset = Dataset<i32>;

/// Dataset of `i64` values.
pub type LongDataset = Dataset<i64>;

/// Dataset of `f64` values.
pub type DoubleDataset = Dataset<f64>;

type Lookup<T> = Arc<dyn Fn(usize) -> Result<T> + Send + Sync>;

/// An ordered, read-only sequence view.
pub struct Dataset<T> {
    node: Arc<Node<T>>,
}

enum Node<T> {
    Store(Arc<dyn Store<T>>),
    Shift {
        parent: Dataset<T>,
        offset: usize,
    },
    Window {
        parent: Dataset<T>,
        from: usize,
        max: usize,
    },
    Derived {
        source: Arc<dyn Sequence + Send + Sync>,
        lookback: usize,
        lookup: Lookup<T>,
    },
}

impl<T> Clone for Dataset<T> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
        }
    }
}

impl<T> Dataset<T> {
    fn with_node(node: Node<T>) -> Self {
        Self {
            node: Arc::new(node),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Dataset<T> {
    /// Creates a dataset rooted in `store`.
    pub fn from_store(store: Arc<dyn Store<T>>) -> Self {
        Self::with_node(Node::Store(store))
    }

    /// Creates an immutable dataset over `values` with the given order.
    pub fn from_vec(values: Vec<T>, order: Order) -> Self {
        Self::from_store(Arc::new(Snapshot::new(values, order)))
    }

    /// Creates an immutable, ascending-order dataset over `values`.
    pub fn of(values: Vec<T>) -> Self {
        Self::from_vec(values, Order::AscendingIndex)
    }

    /// Creates an empty dataset.
    pub fn empty() -> Self {
        Self::from_vec(Vec::new(), Order::Unspecified)
    }

    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::OutOfRange`] if `index >= length()`, or
    /// whatever error the root store reports.
    pub fn get(&self, index: usize) -> Result<T> {
        match &*self.node {
            Node::Store(store) => store.get(index),
            Node::Shift { parent, offset } => {
                self.check_index(index)?;
                parent.get(index + offset)
            }
            Node::Window { parent, from, .. } => {
                self.check_index(index)?;
                parent.get(from + index)
            }
            Node::Derived { lookup, .. } => {
                self.check_index(index)?;
                lookup(index)
            }
        }
    }

    /// Returns the number of elements.
    pub fn length(&self) -> usize {
        match &*self.node {
            Node::Store(store) => store.length(),
            Node::Shift { parent, offset } => parent.length().saturating_sub(*offset),
            Node::Window { parent, from, max } => parent.length().saturating_sub(*from).min(*max),
            Node::Derived {
                source, lookback, ..
            } => source.length().saturating_sub(*lookback),
        }
    }

    /// Returns the index order, inherited from the root.
    pub fn order(&self) -> Order {
        match &*self.node {
            Node::Store(store) => store.order(),
            Node::Shift { parent, .. } | Node::Window { parent, .. } => parent.order(),
            Node::Derived { source, .. } => source.order(),
        }
    }

    /// Returns `true` if the dataset has no elements.
    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    /// Streams the elements in encounter order: index order for ascending
    /// datasets, from the highest index down for descending ones.
    ///
    /// Shift and window views derive their stream from the parent's stream
    /// through the [`Order`] algebra instead of per-index lookups.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::OrderError::Unsupported`] for a shift or
    /// window view over an [`Order::Unspecified`] dataset.
    pub fn stream(&self) -> Result<Stream<'_, T>> {
        match &*self.node {
            Node::Store(store) => store.stream(),
            Node::Shift { parent, offset } => {
                let span = parent.order().shift(*offset, parent)?;
                Ok(Box::new(span.apply(parent.stream()?)))
            }
            Node::Window { parent, from, max } => {
                let span = parent.order().drop_take(*from, *max, parent)?;
                Ok(Box::new(span.apply(parent.stream()?)))
            }
            Node::Derived { lookup, .. } => Ok(Box::new(
                self.order()
                    .indexes(self.length())
                    .map(move |index| lookup(index)),
            )),
        }
    }

    /// Iterates the elements in index order.
    pub fn values(&self) -> impl Iterator<Item = Result<T>> + '_ {
        (0..self.length()).map(move |index| self.get(index))
    }

    /// Collects the elements in index order.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`Dataset::get`].
    pub fn to_vec(&self) -> Result<Vec<T>> {
        self.values().collect()
    }

    /// Materializes a detached snapshot with the same order.
    ///
    /// The snapshot no longer observes changes to the root store. Calling
    /// this on a snapshot returns the same snapshot.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while reading the elements.
    pub fn to_immutable(&self) -> Result<Self> {
        if let Node::Store(store) = &*self.node
            && store.is_immutable()
        {
            return Ok(self.clone());
        }
        Ok(Self::from_vec(self.to_vec()?, self.order()))
    }

    /// View that looks `-n` elements further along the index axis: view
    /// index `i` maps to parent index `i - n`.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::Positive`] if `n > 0`; a view cannot
    /// reference the future.
    pub fn reference(&self, n: isize) -> Result<Self> {
        if n > 0 {
            return Err(ArgumentError::Positive { name: "n", value: n }.into());
        }
        Ok(self.drop(n.unsigned_abs()))
    }

    /// View without the first `max_count` indexes.
    pub fn drop(&self, max_count: usize) -> Self {
        if max_count == 0 {
            return self.clone();
        }
        Self::with_node(Node::Shift {
            parent: self.clone(),
            offset: max_count,
        })
    }

    /// View of the first `count` indexes.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::NotPositive`] if `count` is zero.
    pub fn take(&self, count: usize) -> Result<Self> {
        self.drop_take(0, count)
    }

    /// View of at most `max_count` indexes starting at `from_index`.
    ///
    /// Same as [`Dataset::drop_take`] with the arguments swapped.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::NotPositive`] if `max_count` is zero.
    pub fn take_from(&self, max_count: usize, from_index: usize) -> Result<Self> {
        self.drop_take(from_index, max_count)
    }

    /// View of at most `max_count` indexes starting at `from_index`.
    ///
    /// Equivalent to `drop(from_index).take(max_count)`.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::NotPositive`] if `max_count` is zero.
    pub fn drop_take(&self, from_index: usize, max_count: usize) -> Result<Self> {
        if max_count == 0 {
            return Err(ArgumentError::NotPositive { name: "max_count" }.into());
        }
        Ok(Self::with_node(Node::Window {
            parent: self.clone(),
            from: from_index,
            max: max_count,
        }))
    }

    /// Immutable snapshot of the first `count` indexes.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::ExceedsLength`] if `count > length()` and
    /// [`ArgumentError::NotPositive`] if `count` is zero.
    pub fn take_exact(&self, count: usize) -> Result<Self> {
        let length = self.length();
        if count > length {
            return Err(ArgumentError::ExceedsLength {
                operation: "take_exact",
                required: count,
                length,
            }
            .into());
        }
        self.take(count)?.to_immutable()
    }

    /// Immutable snapshot of `drop_take(from_index, count)`.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::ExceedsLength`] if
    /// `length() < count - from_index` and [`ArgumentError::NotPositive`] if
    /// `count` is zero.
    pub fn drop_take_exact(&self, from_index: usize, count: usize) -> Result<Self> {
        let length = self.length();
        let required = count.saturating_sub(from_index);
        if length < required {
            return Err(ArgumentError::ExceedsLength {
                operation: "drop_take_exact",
                required,
                length,
            }
            .into());
        }
        self.drop_take(from_index, count)?.to_immutable()
    }

    /// Element-wise transformation with the same length and order.
    pub fn map<U, F>(&self, mapper: F) -> Dataset<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let parent = self.clone();
        self.derive(0, move |index| parent.get(index).map(&mapper))
    }

    /// [`Dataset::map`] into an `i32` dataset.
    pub fn map_to_int<F: Fn(T) -> i32 + Send + Sync + 'static>(&self, mapper: F) -> Dataset<i32> {
        self.map(mapper)
    }

    /// [`Dataset::map`] into an `i64` dataset.
    pub fn map_to_long<F: Fn(T) -> i64 + Send + Sync + 'static>(&self, mapper: F) -> Dataset<i64> {
        self.map(mapper)
    }

    /// [`Dataset::map`] into an `f64` dataset.
    pub fn map_to_double<F: Fn(T) -> f64 + Send + Sync + 'static>(&self, mapper: F) -> Dataset<f64> {
        self.map(mapper)
    }

    /// [`Dataset::map`] into a dataset of arbitrary values.
    pub fn map_to_object<U, F>(&self, mapper: F) -> Dataset<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.map(mapper)
    }

    /// View over adjacent pairs: element `i` is `combine(v[i], v[i + 1])`.
    ///
    /// The length is one less than the parent's, or zero.
    pub fn pairwise<U, F>(&self, combine: F) -> Dataset<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(T, T) -> U + Send + Sync + 'static,
    {
        self.try_pairwise(move |_, current, next| Ok(combine(current, next)))
    }

    /// Sliding windows: element `i` is `drop_take(i, len)`.
    ///
    /// The outer length is `max(0, length() - len + 1)`.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::NotPositive`] if `len` is zero.
    pub fn subsequences(&self, len: usize) -> Result<Dataset<Dataset<T>>> {
        if len == 0 {
            return Err(ArgumentError::NotPositive { name: "len" }.into());
        }
        let parent = self.clone();
        Ok(self.derive(len - 1, move |index| parent.drop_take(index, len)))
    }

    /// Pairs element `i` of `self` with element `i` of `right`.
    ///
    /// The length is the shorter of the two lengths and the order is the
    /// order of `self`. Both sides stay live.
    pub fn with_right<R>(&self, right: &Dataset<R>) -> Dataset<(T, R)>
    where
        R: Clone + Send + Sync + 'static,
    {
        let (left, right) = (self.clone(), right.clone());
        let source = Paired {
            left: left.clone(),
            right: right.clone(),
        };
        let lookup = move |index: usize| -> Result<(T, R)> {
            Ok((left.get(index)?, right.get(index)?))
        };
        Dataset::with_node(Node::Derived {
            source: Arc::new(source),
            lookback: 0,
            lookup: Arc::new(lookup),
        })
    }

    pub(crate) fn try_map<U, F>(&self, mapper: F) -> Dataset<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(T) -> Result<U> + Send + Sync + 'static,
    {
        let parent = self.clone();
        self.derive(0, move |index| mapper(parent.get(index)?))
    }

    pub(crate) fn try_pairwise<U, F>(&self, combine: F) -> Dataset<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(usize, T, T) -> Result<U> + Send + Sync + 'static,
    {
        let parent = self.clone();
        self.derive(1, move |index| {
            combine(index, parent.get(index)?, parent.get(index + 1)?)
        })
    }

    fn derive<U, F>(&self, lookback: usize, lookup: F) -> Dataset<U>
    where
        F: Fn(usize) -> Result<U> + Send + Sync + 'static,
    {
        Dataset::with_node(Node::Derived {
            source: Arc::new(self.clone()),
            lookback,
            lookup: Arc::new(lookup),
        })
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let length = self.length();
        if index >= length {
            return Err(IndexError::OutOfRange { index, length }.into());
        }
        Ok(())
    }
}

/// Length and order source of a [`Dataset::with_right`] view.
struct Paired<L, R> {
    left: Dataset<L>,
    right: Dataset<R>,
}

impl<L, R> Sequence for Paired<L, R>
where
    L: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    fn length(&self) -> usize {
        self.left.length().min(self.right.length())
    }

    fn order(&self) -> Order {
        self.left.order()
    }
}

impl<T: Clone + Send + Sync + 'static> Sequence for Dataset<T> {
    fn length(&self) -> usize {
        Dataset::length(self)
    }

    fn order(&self) -> Order {
        Dataset::order(self)
    }
}

impl<T: Clone + Send + Sync + 'static> Default for Dataset<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> fmt::Debug for Dataset<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &*self.node {
            Node::Store(_) => "Store",
            Node::Shift { .. } => "Shift",
            Node::Window { .. } => "Window",
            Node::Derived { .. } => "Derived",
        };
        f.debug_struct("Dataset").field("node", &kind).finish_non_exhaustive()
    }
}

impl<T: PartialEq + Clone + Send + Sync + 'static> PartialEq for Dataset<T> {
    /// Datasets are equal when they have the same order and the same
    /// readable elements in index order.
    fn eq(&self, other: &Self) -> bool {
        self.order() == other.order()
            && self.length() == other.length()
            && self.values().zip(other.values()).all(|(a, b)| match (a, b) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            })
    }
}
