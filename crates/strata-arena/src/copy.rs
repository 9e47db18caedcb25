//! Cross-arena byte snapshots.

use tracing::debug;

use crate::arena::Arena;
use crate::ledger::Ledger;

/// Copy the bytes in use in `src` onto the start of `dest`.
///
/// Copies `n = min(src.index, src.capacity, dest.capacity)` bytes from the
/// start of `src`'s region to the start of `dest`'s region, overwriting
/// rather than appending, then sets `dest`'s index to `n` and returns `n`.
/// The regions may overlap. Allocation counters and ledgers are not
/// touched: this is a raw byte snapshot.
///
/// Returns 0 and changes nothing if either arena is unbound.
///
/// ```
/// use strata_arena::{copy, Arena};
///
/// let mut src: Box<Arena> = Arena::create(8).unwrap();
/// src.alloc_slice(3).unwrap().copy_from_slice(&[7, 8, 9]);
/// let mut dest: Box<Arena> = Arena::create(16).unwrap();
/// assert_eq!(copy(&mut dest, &src), 3);
/// assert_eq!(dest.live_bytes(), &[7, 8, 9]);
/// ```
pub fn copy<L, M>(dest: &mut Arena<'_, L>, src: &Arena<'_, M>) -> usize
where
    L: Ledger,
    M: Ledger,
{
    let Some(src_region) = src.region() else {
        return 0;
    };
    let n = src.index().min(src.capacity()).min(dest.capacity());
    let Some(dest_region) = dest.region_mut() else {
        return 0;
    };
    if !dest_region.copy_prefix_from(src_region, n) {
        return 0;
    }
    dest.set_index(n);
    debug!(bytes = n, "copied arena snapshot");
    n
}

impl<L: Ledger> Arena<'_, L> {
    /// Overwrite this arena with the bytes in use in `src`.
    ///
    /// See [`copy`].
    pub fn copy_from<M: Ledger>(&mut self, src: &Arena<'_, M>) -> usize {
        copy(self, src)
    }
}
