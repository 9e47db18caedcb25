//! Allocation ledgers.
//!
//! The ledger is chosen at compile time through the arena's type
//! parameter. [`Untracked`] is zero-sized and records nothing, so a plain
//! [`Arena`](crate::Arena) carries no per-allocation overhead beyond its
//! offset and counter. [`Tracked`] keeps an [`AllocationRecord`] for every
//! live allocation and supports pointer-to-record lookup, which is what
//! [`DebugArena`](crate::DebugArena) uses.

use std::mem;
use std::ptr::NonNull;

use crate::error::ArenaError;

/// Metadata describing one live allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocationRecord {
    /// Offset of the allocation within the region. For aligned
    /// allocations this is the offset after padding.
    pub index: usize,
    /// Requested length in bytes.
    pub size: usize,
    /// Address returned to the caller.
    pub pointer: NonNull<u8>,
}

// SAFETY: a record is plain metadata; the engine never dereferences
// `pointer` through it.
#[allow(unsafe_code)]
unsafe impl Send for AllocationRecord {}

impl AllocationRecord {
    /// Offset one past the last byte of the allocation.
    pub fn end(&self) -> usize {
        self.index + self.size
    }

    /// Whether `ptr` is the start of this allocation.
    pub fn starts_at(&self, ptr: *const u8) -> bool {
        self.pointer.as_ptr().cast_const() == ptr
    }
}

/// Bookkeeping hooks called by the arena around each allocation.
pub trait Ledger: Default {
    /// Make room for one more record.
    ///
    /// Called before the arena commits an allocation, so a failure here
    /// leaves the arena untouched.
    fn reserve(&mut self) -> Result<(), ArenaError>;

    /// Record a committed allocation. Room was reserved beforehand.
    fn record(&mut self, record: AllocationRecord);

    /// Discard every record.
    fn clear(&mut self);

    /// Number of records held.
    fn len(&self) -> usize;

    /// Whether no records are held.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A ledger that records nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Untracked;

impl Ledger for Untracked {
    #[inline]
    fn reserve(&mut self) -> Result<(), ArenaError> {
        Ok(())
    }

    #[inline]
    fn record(&mut self, _record: AllocationRecord) {}

    #[inline]
    fn clear(&mut self) {}

    #[inline]
    fn len(&self) -> usize {
        0
    }
}

/// A ledger holding a record for every live allocation.
///
/// Records are appended in allocation order; lookups and iteration walk
/// them newest-first.
#[derive(Clone, Debug, Default)]
pub struct Tracked {
    records: Vec<AllocationRecord>,
}

impl Tracked {
    /// Find the record whose pointer equals `ptr` exactly.
    ///
    /// Addresses inside an allocation that are not its first byte do not
    /// match. A null `ptr` never matches.
    pub fn lookup(&self, ptr: *const u8) -> Option<&AllocationRecord> {
        if ptr.is_null() {
            return None;
        }
        self.records.iter().rev().find(|r| r.starts_at(ptr))
    }

    /// The most recent record.
    pub fn head(&self) -> Option<&AllocationRecord> {
        self.records.last()
    }

    /// Records, newest first.
    pub fn records(
        &self,
    ) -> impl DoubleEndedIterator<Item = &AllocationRecord> + ExactSizeIterator + '_ {
        self.records.iter().rev()
    }
}

impl Ledger for Tracked {
    fn reserve(&mut self) -> Result<(), ArenaError> {
        self.records
            .try_reserve(1)
            .map_err(|_| ArenaError::OutOfMemory {
                requested: mem::size_of::<AllocationRecord>(),
            })
    }

    fn record(&mut self, record: AllocationRecord) {
        self.records.push(record);
    }

    fn clear(&mut self) {
        self.records.clear();
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
