//! Configuration for heap-constructed arenas.

use crate::error::ArenaError;

/// Configuration for [`Arena::with_config`](crate::Arena::with_config).
///
/// Only arenas that own their region are configured; arenas initialised
/// over a caller buffer take whatever the caller hands them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Capacity of the owned region in bytes. Must be nonzero.
    pub capacity: usize,

    /// Byte the owned region is initialised with.
    ///
    /// Default: [`ArenaConfig::DEFAULT_FILL`]. Setting
    /// [`ArenaConfig::POISON_FILL`] makes reads of never-written bytes easy
    /// to spot in a debugger.
    pub fill: u8,
}

impl ArenaConfig {
    /// Default capacity: 64 KiB.
    pub const DEFAULT_CAPACITY: usize = 64 * 1024;

    /// Default fill byte.
    pub const DEFAULT_FILL: u8 = 0;

    /// Recognisable fill pattern for debugging uninitialised reads.
    pub const POISON_FILL: u8 = 0xCD;

    /// Create a config for a region of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            fill: Self::DEFAULT_FILL,
        }
    }

    /// Set the fill byte for the owned region.
    pub fn with_fill(mut self, fill: u8) -> Self {
        self.fill = fill;
        self
    }

    /// Check that the config describes a region the heap can supply.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.capacity == 0 {
            return Err(ArenaError::InvalidArgument {
                reason: "arena capacity must be nonzero",
            });
        }
        if self.capacity > isize::MAX as usize {
            return Err(ArenaError::InvalidArgument {
                reason: "arena capacity exceeds isize::MAX",
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
