//! Integer address arithmetic for carving allocations.
//!
//! Alignment is a property of the absolute address handed to the caller,
//! not of the offset inside the region. A region that starts at an odd
//! address needs different padding than one that starts on a page
//! boundary, so padding is computed on `usize` addresses and only turned
//! back into a pointer once the whole range has been checked.

use crate::error::ArenaError;

/// Returns `true` if `alignment` is a nonzero power of two.
pub fn is_valid_alignment(alignment: usize) -> bool {
    alignment.is_power_of_two()
}

/// Smallest padding that makes `address + padding` a multiple of `alignment`.
///
/// `alignment` must be a nonzero power of two.
pub fn padding_for(address: usize, alignment: usize) -> usize {
    debug_assert!(is_valid_alignment(alignment));
    address.wrapping_neg() & (alignment - 1)
}

/// A checked byte range about to be handed out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Carve {
    /// Offset of the first byte returned to the caller (after padding).
    pub offset: usize,
    /// Offset one past the last byte; the arena's next index.
    pub end: usize,
}

/// The arena's bump state, detached from the region for range checks.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Cursor {
    pub index: usize,
    pub capacity: usize,
}

impl Cursor {
    /// Bytes left before the end of the region.
    ///
    /// Fails if the index was left beyond the capacity; such a cursor can
    /// never satisfy a request.
    pub fn remaining(&self, requested: usize) -> Result<usize, ArenaError> {
        self.capacity
            .checked_sub(self.index)
            .ok_or(ArenaError::CapacityExceeded {
                requested,
                available: 0,
            })
    }

    /// Padding needed for an allocation aligned against `base + index`.
    pub fn padding(&self, base: usize, alignment: usize) -> Result<usize, ArenaError> {
        let address = base.checked_add(self.index).ok_or(ArenaError::Overflow {
            index: self.index,
            requested: alignment,
        })?;
        Ok(padding_for(address, alignment))
    }

    /// Check that `padding + size` bytes fit after the index.
    pub fn carve(&self, padding: usize, size: usize) -> Result<Carve, ArenaError> {
        let requested = padding.saturating_add(size);
        let available = self.remaining(requested)?;
        let overflow = ArenaError::Overflow {
            index: self.index,
            requested,
        };
        let offset = self.index.checked_add(padding).ok_or(overflow.clone())?;
        let end = offset.checked_add(size).ok_or(overflow)?;
        if end > self.capacity {
            return Err(ArenaError::CapacityExceeded {
                requested,
                available,
            });
        }
        Ok(Carve { offset, end })
    }
}
