//! Error types for ringseries buffers and dataset views.

use thiserror::Error;

use crate::order::Order;

/// The main error type for all ringseries operations.
///
/// Every condition is reported synchronously at the point of violation.
/// Nothing is retried or clamped by the library; the caller decides whether
/// to restart a traversal, resize a buffer, or give up.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RingSeriesError {
    /// An argument was rejected before any allocation or mutation happened.
    #[error("invalid argument: {0}")]
    Argument(#[from] ArgumentError),

    /// An index or offset fell outside the populated or structural range.
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// A traversal cursor observed the producer overwriting undelivered data.
    #[error("traversal error: {0}")]
    Traversal(#[from] TraversalError),

    /// An order-dependent operation was requested on an unordered sequence.
    #[error("order error: {0}")]
    Order(#[from] OrderError),

    /// Integer arithmetic on a numeric dataset could not be carried out.
    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),
}

/// Errors raised eagerly for malformed arguments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// A count, length, period or capacity argument was zero.
    #[error("argument `{name}` must be positive")]
    NotPositive {
        /// Name of the offending argument.
        name: &'static str,
    },

    /// A back-reference argument pointed into the future.
    #[error("argument `{name}` ({value}) cannot be positive")]
    Positive {
        /// Name of the offending argument.
        name: &'static str,
        /// The rejected value.
        value: isize,
    },

    /// The requested capacity cannot be rounded up to a power of two.
    #[error("capacity {capacity} is too large to allocate")]
    CapacityTooLarge {
        /// The rejected capacity.
        capacity: usize,
    },

    /// An exact-size operation asked for more elements than are available.
    #[error("`{operation}` requires {required} elements but dataset length is {length}")]
    ExceedsLength {
        /// Operation that rejected the request.
        operation: &'static str,
        /// Number of elements the operation needed.
        required: usize,
        /// Number of elements actually available.
        length: usize,
    },
}

/// Errors raised for indexes outside a valid range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// The index is structurally possible but not populated, or lies outside
    /// a view's declared length.
    #[error("index {index} out of range for length {length}")]
    OutOfRange {
        /// The requested index.
        index: usize,
        /// The length at the time of the request.
        length: usize,
    },

    /// The buffer can never hold the requested position.
    #[error("buffer too small: capacity {actual_capacity}, required {required_capacity}")]
    BufferTooSmall {
        /// Capacity of the buffer that was addressed.
        actual_capacity: usize,
        /// Capacity that would be needed to satisfy the request.
        required_capacity: usize,
    },
}

/// Errors raised by traversal cursors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraversalError {
    /// The producer advanced past the point where the element at `offset`
    /// was still retained.
    #[error(
        "concurrent modification at offset {offset}: write sequence {write_sequence} exceeds safe bound {safe_write_sequence}"
    )]
    ConcurrentModification {
        /// Logical offset (relative to the cursor's snapshot) being read.
        offset: usize,
        /// Highest write sequence under which the element was still valid.
        safe_write_sequence: u64,
        /// Number of writes the producer had started when the element was read.
        write_sequence: u64,
    },
}

/// Errors raised by the order algebra.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// The operation needs to know which end of the sequence is the oldest.
    #[error("operation `{operation}` not supported for order {order:?}")]
    Unsupported {
        /// The windowing operation that was requested.
        operation: &'static str,
        /// The order of the sequence it was requested on.
        order: Order,
    },
}

/// Errors raised by integer arithmetic views.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArithmeticError {
    /// A scalar divisor of zero was supplied.
    #[error("division by zero")]
    DivisionByZero,

    /// A dataset element used as a divisor was zero.
    #[error("division by zero element at index {index}")]
    ZeroDivisor {
        /// Index of the zero-valued divisor.
        index: usize,
    },
}

/// Type alias for `Result<T, RingSeriesError>`.
pub type Result<T> = std::result::Result<T, RingSeriesError>;
