//! # ringseries
//!
//! Fixed-capacity history buffers with lazy dataset views.
//!
//! ringseries keeps the most recent N values of a series in a circular
//! buffer that silently overwrites the oldest element once full, and exposes
//! that history through a zero-copy view algebra: shift, truncate, window,
//! map, slide, and numeric transforms such as adjacent differences or
//! threshold crossings. It is meant for indicator and signal pipelines that
//! look back over a bounded window of live data.
//!
//! **Status**: This crate is in early development. The API is not yet stable.
//!
//! ## Key Properties
//!
//! - O(1) insertion with no allocation after construction
//! - Index 0 is always the newest element
//! - Lock-free slots for `i32`, `i64` and `f64`; other payloads use a
//!   per-slot lock that a reader holds only while cloning
//! - Views never copy; they stay live as the buffer moves on
//! - Traversal detects overwrites by a concurrent producer and fails fast
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use ringseries::{DoubleRingBuffer, Order};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Keep the last 3 closing prices
//! let closes = Arc::new(DoubleRingBuffer::new(3)?);
//! closes.add_all([10.0, 11.0, 12.0, 11.5]);
//!
//! // Newest first; the oldest value was overwritten
//! assert_eq!(closes.to_vec()?, vec![11.5, 12.0, 11.0]);
//!
//! // Views over the live buffer
//! let previous = closes.dataset().reference(-1)?;
//! let moves = closes.dataset().differences();
//! assert_eq!(previous.get(0)?, 12.0);
//! assert_eq!(moves.to_vec()?, vec![-0.5, 1.0]);
//! assert_eq!(moves.order(), Order::DescendingIndex);
//!
//! // Threshold crossings
//! let broke_out = closes.dataset().crosses_over(11.5);
//! assert_eq!(broke_out.to_vec()?, vec![false, true]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`RingBuffer`] — Producer-facing circular buffer, one writer at a time
//! - [`RingCursor`] — Splittable, fail-fast traversal of a buffer snapshot
//! - [`Dataset`] — Cloneable handle to a lazy, read-only view chain
//! - [`Order`] — Index/age relation and the window algebra built on it
//!
//! ## Modules
//!
//! For lower-level access, the individual modules are also public:
//!
//! - [`ring`] — Ring buffer and its typed aliases
//! - [`cursor`] — Traversal cursor and its characteristics
//! - [`dataset`] — View algebra, stores and numeric transforms
//! - [`index`] — Circular index arithmetic
//! - [`element`] — Slot storage per element type
//! - [`order`] — Sequence contract and window spans
//! - [`config`] — Serializable buffer configuration
//! - [`error`] — Error types

pub mod config;
pub mod cursor;
pub mod dataset;
pub mod element;
pub mod error;
pub mod index;
pub mod order;
pub mod ring;

// Re-export primary API types at crate root for convenience.
pub use config::{BufferConfig, DEFAULT_CAPACITY};
pub use cursor::{Characteristics, RingCursor};
pub use dataset::{Dataset, DoubleDataset, IntDataset, LongDataset, Snapshot, Store, Stream};
pub use element::{AtomicSlot, Element, LockedSlot, Numeric, Slot};
pub use error::{
    ArgumentError, ArithmeticError, IndexError, OrderError, Result, RingSeriesError,
    TraversalError,
};
pub use index::CircularIndex;
pub use order::{Order, Sequence, Span};
pub use ring::{DoubleRingBuffer, IntRingBuffer, LongRingBuffer, RingBuffer};
