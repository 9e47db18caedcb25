//! The linear arena: region binding, bump allocation, clear and destroy.

use std::alloc::Layout;
use std::ptr::NonNull;

use tracing::{debug, trace};

use crate::address::{self, Cursor};
use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::ledger::{AllocationRecord, Ledger, Tracked, Untracked};
use crate::ownership::{Ownership, OwnershipMode};
use crate::region::{try_box, Region};

/// A fixed-capacity linear allocator.
///
/// Allocations are carved from the region sequentially by advancing an
/// offset (`index`). There is no per-allocation free: [`clear`](Self::clear)
/// resets the offset and discards every allocation at once, and
/// [`destroy`](Self::destroy) releases owned resources.
///
/// The ledger type `L` selects allocation tracking at compile time; see
/// [`Untracked`] and [`Tracked`].
///
/// Every failing call returns an [`ArenaError`] and leaves the arena
/// exactly as it was.
#[derive(Debug)]
pub struct Arena<'a, L: Ledger = Untracked> {
    region: Option<Region<'a>>,
    index: usize,
    allocations: usize,
    storage: Ownership,
    ledger: L,
}

/// An arena that records every allocation and supports pointer lookup.
pub type DebugArena<'a> = Arena<'a, Tracked>;

impl<L: Ledger> Arena<'static, L> {
    /// Heap-obtain an arena and a `size`-byte region for it.
    ///
    /// Both the arena storage and the region are owned by the engine.
    ///
    /// ```
    /// use strata_arena::Arena;
    ///
    /// let mut arena: Box<Arena> = Arena::create(1024).unwrap();
    /// let greeting = arena.alloc_slice(7).unwrap();
    /// greeting.copy_from_slice(b"Hello \0");
    /// assert_eq!(arena.index(), 7);
    /// arena.clear();
    /// assert_eq!(arena.index(), 0);
    /// ```
    pub fn create(size: usize) -> Result<Box<Self>, ArenaError> {
        Self::with_config(ArenaConfig::new(size))
    }

    /// Heap-obtain an arena configured by `config`.
    ///
    /// Fails with [`ArenaError::OutOfMemory`] if either the region or the
    /// arena's own storage cannot be allocated; nothing is leaked.
    pub fn with_config(config: ArenaConfig) -> Result<Box<Self>, ArenaError> {
        config.validate()?;
        let region = Region::owned(config.capacity, config.fill)?;
        let arena = try_box(Self {
            region: Some(region),
            index: 0,
            allocations: 0,
            storage: Ownership::Owned,
            ledger: L::default(),
        })?;
        debug!(capacity = config.capacity, "created owned arena");
        Ok(arena)
    }
}

impl<'a, L: Ledger> Arena<'a, L> {
    /// An arena with no region, ready for [`init`](Self::init).
    pub fn unbound() -> Self {
        Self {
            region: None,
            index: 0,
            allocations: 0,
            storage: Ownership::Borrowed,
            ledger: L::default(),
        }
    }

    /// Bind the arena to a caller buffer.
    ///
    /// Resets the offset, the allocation counter and the ledger, and marks
    /// both storage and region as borrowed. An empty buffer is rejected and
    /// leaves every field untouched. A region the arena previously owned is
    /// released.
    pub fn init(&mut self, region: &'a mut [u8]) -> Result<(), ArenaError> {
        let region = Region::borrowed(region).ok_or(ArenaError::InvalidArgument {
            reason: "cannot initialise an arena over an empty region",
        })?;
        self.bind(region);
        Ok(())
    }

    /// Bind the arena to `size` bytes starting at `ptr`.
    ///
    /// Same as [`init`](Self::init), for buffers that cannot be expressed as
    /// a unique slice (for example two arenas over overlapping windows of
    /// one allocation). A null `ptr` or zero `size` is rejected and leaves
    /// every field untouched.
    ///
    /// # Safety
    ///
    /// See [`Region::from_raw_parts`]. In particular, arenas over
    /// overlapping windows must never be used from two threads at once.
    #[allow(unsafe_code)]
    pub unsafe fn init_raw(&mut self, ptr: *mut u8, size: usize) -> Result<(), ArenaError> {
        // SAFETY: forwarded to the caller.
        let region = unsafe { Region::from_raw_parts(ptr, size) }.ok_or(
            ArenaError::InvalidArgument {
                reason: "cannot initialise an arena over a null or empty region",
            },
        )?;
        self.bind(region);
        Ok(())
    }

    fn bind(&mut self, region: Region<'a>) {
        debug!(capacity = region.len(), "arena bound to borrowed region");
        self.region = Some(region);
        self.index = 0;
        self.allocations = 0;
        self.storage = Ownership::Borrowed;
        self.ledger.clear();
    }

    /// Carve `size` bytes at the current offset.
    ///
    /// Returns the address `region + index` and advances the offset by
    /// `size`.
    pub fn alloc(&mut self, size: usize) -> Result<NonNull<u8>, ArenaError> {
        self.try_alloc(size)
            .inspect_err(|err| trace!(size, index = self.index, %err, "allocation rejected"))
    }

    fn try_alloc(&mut self, size: usize) -> Result<NonNull<u8>, ArenaError> {
        if size == 0 {
            return Err(ArenaError::InvalidArgument {
                reason: "zero-sized allocation",
            });
        }
        if self.region.is_none() {
            return Err(ArenaError::Unbound);
        }
        let carve = self.cursor().carve(0, size)?;
        self.commit(carve, size)
    }

    /// Carve `size` bytes whose absolute address is a multiple of
    /// `alignment`.
    ///
    /// Padding is computed against the real address of `region + index`, so
    /// two arenas in identical states over differently aligned buffers may
    /// pad differently. The offset advances by padding plus `size`.
    ///
    /// ```
    /// use strata_arena::Arena;
    ///
    /// let mut arena: Box<Arena> = Arena::create(1024).unwrap();
    /// let ptr = arena.alloc_aligned(10, 4).unwrap();
    /// assert_eq!(ptr.as_ptr() as usize % 4, 0);
    /// ```
    pub fn alloc_aligned(
        &mut self,
        size: usize,
        alignment: usize,
    ) -> Result<NonNull<u8>, ArenaError> {
        self.try_alloc_aligned(size, alignment).inspect_err(|err| {
            trace!(size, alignment, index = self.index, %err, "aligned allocation rejected")
        })
    }

    fn try_alloc_aligned(
        &mut self,
        size: usize,
        alignment: usize,
    ) -> Result<NonNull<u8>, ArenaError> {
        if !address::is_valid_alignment(alignment) {
            return Err(ArenaError::InvalidAlignment { alignment });
        }
        if size == 0 {
            return Err(ArenaError::InvalidArgument {
                reason: "zero-sized allocation",
            });
        }
        let base = self.region.as_ref().ok_or(ArenaError::Unbound)?.addr();
        let cursor = self.cursor();
        cursor.remaining(size)?;
        let padding = cursor.padding(base, alignment)?;
        let carve = cursor.carve(padding, size)?;
        self.commit(carve, size)
    }

    /// Carve space for `layout`.
    pub fn alloc_layout(&mut self, layout: Layout) -> Result<NonNull<u8>, ArenaError> {
        self.alloc_aligned(layout.size(), layout.align())
    }

    /// Carve `size` bytes and return them as a slice.
    ///
    /// The slice borrows the arena, so it must be dropped before the next
    /// allocation; use [`alloc`](Self::alloc) to keep several allocations
    /// alive at once.
    pub fn alloc_slice(&mut self, size: usize) -> Result<&mut [u8], ArenaError> {
        let offset = self.index;
        self.alloc(size)?;
        self.region
            .as_mut()
            .and_then(|region| region.bytes_mut(offset, size))
            .ok_or(ArenaError::Unbound)
    }

    /// Carve `size` bytes, set them to zero, and return them as a slice.
    pub fn alloc_zeroed(&mut self, size: usize) -> Result<&mut [u8], ArenaError> {
        let bytes = self.alloc_slice(size)?;
        bytes.fill(0);
        Ok(bytes)
    }

    fn cursor(&self) -> Cursor {
        Cursor {
            index: self.index,
            capacity: self.capacity(),
        }
    }

    fn commit(&mut self, carve: address::Carve, size: usize) -> Result<NonNull<u8>, ArenaError> {
        let pointer = self
            .region
            .as_ref()
            .and_then(|region| region.pointer_at(carve.offset))
            .ok_or(ArenaError::Unbound)?;
        self.ledger.reserve()?;
        self.index = carve.end;
        self.allocations += 1;
        self.ledger.record(AllocationRecord {
            index: carve.offset,
            size,
            pointer,
        });
        trace!(offset = carve.offset, size, index = self.index, "allocated");
        Ok(pointer)
    }

    /// Discard every allocation.
    ///
    /// Resets the offset and the allocation counter and empties the ledger.
    /// The region and its capacity are left alone.
    pub fn clear(&mut self) {
        debug!(discarded = self.allocations, used = self.used(), "arena cleared");
        self.index = 0;
        self.allocations = 0;
        self.ledger.clear();
    }

    /// Release owned resources and reset the arena to the unbound state.
    ///
    /// An owned region is freed. A borrowed region is detached without its
    /// bytes being read or written. Afterwards the arena has no region, a
    /// zero offset and capacity, and both ownership modes are borrowed.
    ///
    /// An arena whose storage is owned (one returned by
    /// [`create`](Arena::create)) is released by dropping its box; see
    /// [`dispose`](Self::dispose).
    pub fn destroy(&mut self) {
        let mode = self.ownership();
        let freed = self.region.take().map_or(0, Region::release);
        self.index = 0;
        self.allocations = 0;
        self.ledger.clear();
        self.storage = Ownership::Borrowed;
        match mode.storage {
            Ownership::Owned => {
                debug!(region = ?mode.region, freed, "destroyed arena; storage released with its box")
            }
            Ownership::Borrowed => debug!(region = ?mode.region, freed, "destroyed arena"),
        }
    }

    /// Destroy a heap-constructed arena and release its storage.
    pub fn dispose(mut arena: Box<Self>) {
        arena.destroy();
    }

    /// Capacity of the region in bytes; zero when unbound.
    pub fn capacity(&self) -> usize {
        self.region.as_ref().map_or(0, Region::len)
    }

    /// Offset of the next free byte.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Overwrite the offset.
    ///
    /// The value is not validated. An offset beyond the capacity makes
    /// every later allocation fail until the arena is cleared.
    pub fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    /// Bytes in use, clamped to the capacity.
    pub fn used(&self) -> usize {
        self.index.min(self.capacity())
    }

    /// Bytes left before the end of the region.
    pub fn remaining(&self) -> usize {
        self.capacity().saturating_sub(self.index)
    }

    /// Number of live allocations.
    pub fn allocations(&self) -> usize {
        self.allocations
    }

    /// Whether the arena is bound to a region.
    pub fn is_valid(&self) -> bool {
        self.capacity() > 0
    }

    /// Ownership of the arena storage and of the region.
    ///
    /// An unbound arena reports its region as borrowed.
    pub fn ownership(&self) -> OwnershipMode {
        OwnershipMode {
            storage: self.storage,
            region: self
                .region
                .as_ref()
                .map_or(Ownership::Borrowed, Region::ownership),
        }
    }

    /// Whether the arena storage was heap-obtained by [`create`](Arena::create).
    pub fn owns_self(&self) -> bool {
        self.storage.is_owned()
    }

    /// Whether the region was heap-obtained by the engine.
    pub fn owns_region(&self) -> bool {
        self.ownership().region.is_owned()
    }

    /// Base address of the region, if bound.
    pub fn as_ptr(&self) -> Option<NonNull<u8>> {
        self.region.as_ref().map(Region::as_ptr)
    }

    /// The bound region, if any.
    pub fn region(&self) -> Option<&Region<'a>> {
        self.region.as_ref()
    }

    pub(crate) fn region_mut(&mut self) -> Option<&mut Region<'a>> {
        self.region.as_mut()
    }

    /// Offset of `ptr` within the region, if it points inside it.
    pub fn offset_of(&self, ptr: *const u8) -> Option<usize> {
        let region = self.region.as_ref()?;
        let offset = ptr.addr().checked_sub(region.addr())?;
        (offset < region.len()).then_some(offset)
    }

    /// The bytes in use: the region prefix up to the clamped offset.
    pub fn live_bytes(&self) -> &[u8] {
        self.slice(0, self.used()).unwrap_or(&[])
    }

    /// `len` bytes at `offset`, if the range lies within the bytes in use.
    pub fn slice(&self, offset: usize, len: usize) -> Option<&[u8]> {
        if offset.checked_add(len)? > self.used() {
            return None;
        }
        self.region.as_ref()?.bytes(offset, len)
    }

    /// Mutable `len` bytes at `offset`, if the range lies within the bytes
    /// in use.
    pub fn slice_mut(&mut self, offset: usize, len: usize) -> Option<&mut [u8]> {
        if offset.checked_add(len)? > self.used() {
            return None;
        }
        self.region.as_mut()?.bytes_mut(offset, len)
    }

    /// The arena's ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }
}

impl<'a> Arena<'a, Tracked> {
    /// Look up the record of the allocation starting at `ptr`.
    ///
    /// Returns `None` for a null pointer, for an address that was never
    /// returned by this arena, and for addresses inside an allocation that
    /// are not its first byte.
    ///
    /// ```
    /// use strata_arena::DebugArena;
    ///
    /// let mut arena = DebugArena::create(1024).unwrap();
    /// let x = arena.alloc(5).unwrap();
    /// let y = arena.alloc(25).unwrap();
    /// assert_eq!(arena.lookup(x.as_ptr()).unwrap().size, 5);
    /// assert_eq!(arena.lookup(y.as_ptr()).unwrap().index, 5);
    /// ```
    pub fn lookup(&self, ptr: *const u8) -> Option<&AllocationRecord> {
        self.ledger.lookup(ptr)
    }

    /// The most recent allocation record.
    pub fn head_allocation(&self) -> Option<&AllocationRecord> {
        self.ledger.head()
    }
}

impl<L: Ledger> Default for Arena<'_, L> {
    fn default() -> Self {
        Self::unbound()
    }
}
