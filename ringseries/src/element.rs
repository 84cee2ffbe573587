//! Element storage for ring buffers.
//!
//! A ring buffer is read by many threads while a single producer writes, so
//! each storage slot needs interior mutability. The kind of slot is chosen
//! per element type through [`Element::Slot`]:
//!
//! - [`AtomicSlot`] for the numeric types (`i32`, `i64`, `f64`). Values are
//!   kept unboxed in plain atomics and no lock is ever taken.
//! - [`LockedSlot`] for arbitrary cloneable payloads. A slot-local `RwLock`
//!   guards the stored value; `clear` releases it back to `None`. A reader
//!   holds the read lock while it clones the value, and the producer's
//!   store into that slot waits until the clone is done. Readers of these
//!   types can therefore briefly block the producer, one slot at a time.
//!
//! Implement [`Element`] for your own types with
//! `type Slot = LockedSlot<Self>;`.

use std::fmt::Debug;
use std::sync::atomic::{AtomicI32, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// A single storage cell of a ring buffer.
pub trait Slot<T>: Default + Send + Sync {
    /// Reads the stored value, or `None` if the slot holds nothing.
    fn load(&self) -> Option<T>;

    /// Overwrites the stored value.
    fn store(&self, value: T);

    /// Drops any value held by the slot. Slots without owned resources keep
    /// their contents.
    fn release(&self) {}
}

/// A value type that can be kept in a ring buffer.
pub trait Element: Clone + Send + Sync + 'static {
    /// Storage cell used for values of this type.
    type Slot: Slot<Self>;
}

/// Primitive numeric element with unboxed atomic storage and the scalar
/// arithmetic used by numeric datasets.
///
/// Integer arithmetic wraps on overflow; integer division by zero is
/// reported as `None` from [`Numeric::divide`].
pub trait Numeric: Copy + Default + PartialOrd + Debug + Send + Sync + 'static {
    /// Atomic cell holding one value.
    type Atomic: Default + Send + Sync;

    /// Reads a value from its atomic cell.
    fn load(cell: &Self::Atomic) -> Self;

    /// Writes a value into its atomic cell.
    fn store(cell: &Self::Atomic, value: Self);

    /// `self + rhs`.
    fn plus(self, rhs: Self) -> Self;

    /// `self - rhs`.
    fn minus(self, rhs: Self) -> Self;

    /// `self * rhs`.
    fn times(self, rhs: Self) -> Self;

    /// `self / rhs`, or `None` when integer division by zero is requested.
    fn divide(self, rhs: Self) -> Option<Self>;

    /// `-self`.
    fn negate(self) -> Self;
}

macro_rules! numeric_int {
    ($ty:ty, $atomic:ty) => {
        impl Numeric for $ty {
            type Atomic = $atomic;

            #[inline]
            fn load(cell: &$atomic) -> Self {
                cell.load(Ordering::Acquire)
            }

            #[inline]
            fn store(cell: &$atomic, value: Self) {
                cell.store(value, Ordering::Release);
            }

            #[inline]
            fn plus(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }

            #[inline]
            fn minus(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }

            #[inline]
            fn times(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }

            #[inline]
            fn divide(self, rhs: Self) -> Option<Self> {
                (rhs != 0).then(|| self.wrapping_div(rhs))
            }

            #[inline]
            fn negate(self) -> Self {
                self.wrapping_neg()
            }
        }

        impl Element for $ty {
            type Slot = AtomicSlot<$ty>;
        }
    };
}

numeric_int!(i32, AtomicI32);
numeric_int!(i64, AtomicI64);

impl Numeric for f64 {
    // Stored by bit pattern.
    type Atomic = AtomicU64;

    #[inline]
    fn load(cell: &AtomicU64) -> Self {
        f64::from_bits(cell.load(Ordering::Acquire))
    }

    #[inline]
    fn store(cell: &AtomicU64, value: Self) {
        cell.store(value.to_bits(), Ordering::Release);
    }

    #[inline]
    fn plus(self, rhs: Self) -> Self {
        self + rhs
    }

    #[inline]
    fn minus(self, rhs: Self) -> Self {
        self - rhs
    }

    #[inline]
    fn times(self, rhs: Self) -> Self {
        self * rhs
    }

    #[inline]
    fn divide(self, rhs: Self) -> Option<Self> {
        Some(self / rhs)
    }

    #[inline]
    fn negate(self) -> Self {
        -self
    }
}

impl Element for f64 {
    type Slot = AtomicSlot<f64>;
}

/// Lock-free slot for a [`Numeric`] value.
pub struct AtomicSlot<N: Numeric>(N::Atomic);

impl<N: Numeric> Default for AtomicSlot<N> {
    fn default() -> Self {
        Self(N::Atomic::default())
    }
}

impl<N: Numeric> Slot<N> for AtomicSlot<N> {
    #[inline]
    fn load(&self) -> Option<N> {
        Some(N::load(&self.0))
    }

    #[inline]
    fn store(&self, value: N) {
        N::store(&self.0, value);
    }
}

/// Slot for arbitrary cloneable values, guarded by a slot-local lock.
///
/// `store` and `release` wait for readers that are cloning the value.
pub struct LockedSlot<T>(RwLock<Option<T>>);

impl<T> Default for LockedSlot<T> {
    fn default() -> Self {
        Self(RwLock::new(None))
    }
}

impl<T: Clone + Send + Sync> Slot<T> for LockedSlot<T> {
    fn load(&self) -> Option<T> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn store(&self, value: T) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    fn release(&self) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

macro_rules! locked_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Element for $ty {
                type Slot = LockedSlot<$ty>;
            }
        )*
    };
}

locked_element!(bool, char, u8, u16, u32, u64, usize, i8, i16, isize, f32, String, &'static str);

impl<T: Send + Sync + 'static> Element for Arc<T> {
    type Slot = LockedSlot<Self>;
}

impl<T: Clone + Send + Sync + 'static> Element for Vec<T> {
    type Slot = LockedSlot<Self>;
}

impl<T: Clone + Send + Sync + 'static> Element for Option<T> {
    type Slot = LockedSlot<Self>;
}

impl<A, B> Element for (A, B)
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
{
    type Slot = LockedSlot<Self>;
}
