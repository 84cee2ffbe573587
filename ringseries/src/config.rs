//! Buffer configuration.
//!
//! [`BufferConfig`] is the serializable description of a ring buffer. It is
//! validated before any storage is allocated, so a bad configuration never
//! produces a partially constructed buffer.

use serde::{Deserialize, Serialize};

use crate::error::{ArgumentError, Result};

/// Capacity used when none is given explicitly.
pub const DEFAULT_CAPACITY: usize = 64;

/// Configuration for a ring buffer.
///
/// # Example
///
/// ```rust
/// use ringseries::{BufferConfig, DoubleRingBuffer};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = BufferConfig::new(300)?;
/// let closes = DoubleRingBuffer::with_config(&config)?;
/// assert_eq!(closes.capacity(), 300);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Number of most recent elements the buffer retains.
    ///
    /// Backing storage is rounded up to the next power of two, but every
    /// observable bound (`length`, `is_full`, `remaining_capacity`) uses this
    /// exact value.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl BufferConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError`] if the configuration is invalid.
    pub fn new(capacity: usize) -> Result<Self> {
        let config = Self { capacity };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::NotPositive`] for a zero capacity and
    /// [`ArgumentError::CapacityTooLarge`] if the rounded storage size would
    /// overflow.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(ArgumentError::NotPositive { name: "capacity" }.into());
        }
        if self.capacity.checked_next_power_of_two().is_none() {
            return Err(ArgumentError::CapacityTooLarge {
                capacity: self.capacity,
            }
            .into());
        }
        Ok(())
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}
