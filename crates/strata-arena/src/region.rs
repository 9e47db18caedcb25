//! Backing byte regions.
//!
//! A [`Region`] is the contiguous buffer an arena carves allocations from.
//! It is either borrowed from the caller (a `&mut [u8]`, or a raw pointer
//! and length for buffers the borrow checker cannot describe, such as two
//! overlapping windows of one allocation) or owned: heap-obtained when the
//! arena is constructed and released when the region is dropped.
//!
//! The region stores a raw base pointer rather than a slice so that
//! pointers handed out by the arena stay valid while the arena is mutated.
//! All pointer arithmetic and raw memory access in the crate lives here;
//! every `unsafe` block is bounded by a length check against `len`.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};
use std::slice;

use crate::error::ArenaError;
use crate::ownership::Ownership;

/// A contiguous byte buffer of known, nonzero length.
pub struct Region<'a> {
    ptr: NonNull<u8>,
    len: usize,
    ownership: Ownership,
    _marker: PhantomData<&'a mut [u8]>,
}

// SAFETY: owned and slice-borrowed regions hold exclusive access to their
// bytes, so moving one moves that access with it. Raw regions may overlap;
// `from_raw_parts` makes the caller keep overlapping regions on one thread
// at a time.
unsafe impl Send for Region<'_> {}

impl<'a> Region<'a> {
    /// Borrow a caller buffer.
    ///
    /// Returns `None` for an empty buffer.
    pub fn borrowed(bytes: &'a mut [u8]) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        let len = bytes.len();
        Some(Self {
            ptr: NonNull::from(bytes).cast::<u8>(),
            len,
            ownership: Ownership::Borrowed,
            _marker: PhantomData,
        })
    }

    /// Borrow `len` bytes starting at `ptr`.
    ///
    /// Returns `None` if `ptr` is null or `len` is zero.
    ///
    /// # Safety
    ///
    /// For the whole lifetime `'a`, `ptr` must be valid for reads and writes
    /// of `len` initialised bytes, and those bytes must not be accessed
    /// through references other than the ones this region hands out.
    ///
    /// Other regions built with this function may overlap this one. While
    /// any two overlapping regions are alive, they (and the arenas holding
    /// them) must only be accessed from one thread at a time: `Region` is
    /// `Send`, so moving overlapping regions to different threads and using
    /// them concurrently is a data race.
    pub unsafe fn from_raw_parts(ptr: *mut u8, len: usize) -> Option<Self> {
        let ptr = NonNull::new(ptr)?;
        if len == 0 {
            return None;
        }
        Some(Self {
            ptr,
            len,
            ownership: Ownership::Borrowed,
            _marker: PhantomData,
        })
    }

    /// Base address of the region.
    pub fn as_ptr(&self) -> NonNull<u8> {
        self.ptr
    }

    /// Base address as an integer, for alignment arithmetic.
    pub fn addr(&self) -> usize {
        self.ptr.as_ptr().addr()
    }

    /// Length of the region in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: empty regions cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the bytes were obtained by the engine or by the caller.
    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// Pointer to the byte at `offset`, or one past the end when
    /// `offset == len`.
    pub fn pointer_at(&self, offset: usize) -> Option<NonNull<u8>> {
        if offset > self.len {
            return None;
        }
        // SAFETY: offset <= len and the region is valid for len bytes, so
        // the result is in bounds of (or one past) the same allocation.
        Some(unsafe { self.ptr.add(offset) })
    }

    /// Shared view of `len` bytes starting at `offset`.
    pub fn bytes(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let end = offset.checked_add(len)?;
        if end > self.len {
            return None;
        }
        // SAFETY: [offset, end) lies inside the region, which is valid and
        // initialised for len bytes; the borrow of `self` keeps it alive.
        Some(unsafe { slice::from_raw_parts(self.ptr.as_ptr().add(offset), len) })
    }

    /// Mutable view of `len` bytes starting at `offset`.
    pub fn bytes_mut(&mut self, offset: usize, len: usize) -> Option<&mut [u8]> {
        let end = offset.checked_add(len)?;
        if end > self.len {
            return None;
        }
        // SAFETY: as in `bytes`; the exclusive borrow of `self` prevents any
        // other view handed out by this region from coexisting.
        Some(unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr().add(offset), len) })
    }

    /// Copy the first `len` bytes of `src` onto the first `len` bytes of
    /// `self`. The two regions may overlap.
    ///
    /// Returns `false` without copying if `len` exceeds either region.
    pub fn copy_prefix_from(&mut self, src: &Region<'_>, len: usize) -> bool {
        if len > self.len || len > src.len {
            return false;
        }
        // SAFETY: both ranges are in bounds of their regions. `ptr::copy`
        // has memmove semantics, so overlapping windows are fine.
        unsafe { ptr::copy(src.ptr.as_ptr(), self.ptr.as_ptr(), len) };
        true
    }

    /// Give the region back. Owned bytes are freed; borrowed bytes are left
    /// untouched. Returns the number of bytes freed.
    pub fn release(self) -> usize {
        match self.ownership {
            Ownership::Owned => self.len,
            Ownership::Borrowed => 0,
        }
        // `self` drops here; `Drop` frees owned bytes.
    }
}

impl Region<'static> {
    /// Heap-obtain a region of `len` bytes, each set to `fill`.
    ///
    /// Uses a fallible reservation so that an exhausted heap surfaces as
    /// [`ArenaError::OutOfMemory`] instead of aborting.
    pub fn owned(len: usize, fill: u8) -> Result<Self, ArenaError> {
        if len == 0 {
            return Err(ArenaError::InvalidArgument {
                reason: "owned region must be nonzero",
            });
        }
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(len)
            .map_err(|_| ArenaError::OutOfMemory { requested: len })?;
        bytes.resize(len, fill);
        let bytes = bytes.into_boxed_slice();
        Ok(Self {
            ptr: NonNull::from(Box::leak(bytes)).cast::<u8>(),
            len,
            ownership: Ownership::Owned,
            _marker: PhantomData,
        })
    }
}

/// Move `value` into a fresh heap allocation, reporting exhaustion as
/// [`ArenaError::OutOfMemory`] where `Box::new` would abort.
///
/// On failure `value` is dropped.
pub(crate) fn try_box<T>(value: T) -> Result<Box<T>, ArenaError> {
    let layout = Layout::new::<T>();
    if layout.size() == 0 {
        return Ok(Box::new(value));
    }
    // SAFETY: `layout` has nonzero size.
    let raw = unsafe { alloc::alloc(layout) }.cast::<T>();
    let Some(ptr) = NonNull::new(raw) else {
        return Err(ArenaError::OutOfMemory {
            requested: layout.size(),
        });
    };
    // SAFETY: `ptr` is a fresh, unaliased allocation made with
    // `Layout::new::<T>()` by the global allocator, which is exactly what
    // `Box<T>` expects to free.
    unsafe {
        ptr.as_ptr().write(value);
        Ok(Box::from_raw(ptr.as_ptr()))
    }
}

impl Drop for Region<'_> {
    fn drop(&mut self) {
        if let Ownership::Owned = self.ownership {
            let bytes = ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), self.len);
            // SAFETY: owned regions come from `Box::leak` in `owned` with
            // exactly this length, and are freed only here.
            drop(unsafe { Box::from_raw(bytes) });
        }
    }
}

impl fmt::Debug for Region<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("ownership", &self.ownership)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrowed_rejects_empty_buffer() {
        let mut empty: [u8; 0] = [];
        assert!(Region::borrowed(&mut empty).is_none());
    }

    #[test]
    fn raw_parts_rejects_null_and_zero() {
        let mut buf = [0u8; 4];
        // SAFETY: rejected before any access.
        unsafe {
            assert!(Region::from_raw_parts(ptr::null_mut(), 4).is_none());
            assert!(Region::from_raw_parts(buf.as_mut_ptr(), 0).is_none());
        }
    }

    #[test]
    fn borrowed_region_sees_caller_bytes() {
        let mut buf = [1u8, 2, 3, 4];
        let region = Region::borrowed(&mut buf).unwrap();
        assert_eq!(region.len(), 4);
        assert_eq!(region.ownership(), Ownership::Borrowed);
        assert_eq!(region.bytes(1, 2), Some(&[2u8, 3][..]));
        assert_eq!(region.bytes(3, 2), None);
    }

    #[test]
    fn owned_region_is_filled() {
        let region = Region::owned(16, 0xCD).unwrap();
        assert_eq!(region.ownership(), Ownership::Owned);
        assert!(region.bytes(0, 16).unwrap().iter().all(|&b| b == 0xCD));
    }

    #[test]
    fn owned_region_rejects_zero_length() {
        assert!(matches!(
            Region::owned(0, 0),
            Err(ArenaError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn owned_region_reports_heap_exhaustion() {
        assert_eq!(
            Region::owned(usize::MAX, 0).unwrap_err(),
            ArenaError::OutOfMemory {
                requested: usize::MAX
            }
        );
    }

    #[test]
    fn pointer_at_allows_one_past_end() {
        let region = Region::owned(8, 0).unwrap();
        let base = region.addr();
        assert_eq!(region.pointer_at(8).unwrap().as_ptr().addr(), base + 8);
        assert!(region.pointer_at(9).is_none());
    }

    #[test]
    fn release_reports_freed_bytes() {
        let mut buf = [0u8; 8];
        assert_eq!(Region::borrowed(&mut buf).unwrap().release(), 0);
        assert_eq!(Region::owned(32, 0).unwrap().release(), 32);
    }

    #[test]
    fn copy_prefix_handles_overlap() {
        let mut buf: Vec<u8> = (0..16).collect();
        let base = buf.as_mut_ptr();
        // SAFETY: both windows lie inside `buf`, which outlives them, and
        // `buf` is not touched through references until they are dropped.
        let (src, mut dest) = unsafe {
            (
                Region::from_raw_parts(base, 8).unwrap(),
                Region::from_raw_parts(base.wrapping_add(2), 8).unwrap(),
            )
        };
        assert!(dest.copy_prefix_from(&src, 8));
        drop((src, dest));
        assert_eq!(&buf[..10], &[0, 1, 0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn copy_prefix_rejects_oversized_len() {
        let mut a = [0u8; 4];
        let mut b = [0u8; 8];
        let src = Region::borrowed(&mut b).unwrap();
        let mut dest = Region::borrowed(&mut a).unwrap();
        assert!(!dest.copy_prefix_from(&src, 5));
    }

    #[test]
    fn try_box_moves_value_to_heap() {
        let boxed = try_box([7u64; 4]).unwrap();
        assert_eq!(*boxed, [7; 4]);
        assert_eq!(try_box(()).unwrap(), Box::new(()));
    }

    #[test]
    fn try_box_value_is_dropped_once() {
        use std::rc::Rc;

        let counter = Rc::new(());
        let boxed = try_box(Rc::clone(&counter)).unwrap();
        assert_eq!(Rc::strong_count(&counter), 2);
        drop(boxed);
        assert_eq!(Rc::strong_count(&counter), 1);
    }

    #[test]
    fn try_box_keeps_owned_region_alive() {
        let region = Region::owned(16, 0xAB).unwrap();
        let base = region.addr();
        let boxed = try_box(region).unwrap();
        assert_eq!(boxed.addr(), base);
        assert!(boxed.bytes(0, 16).unwrap().iter().all(|&b| b == 0xAB));
    }
}
