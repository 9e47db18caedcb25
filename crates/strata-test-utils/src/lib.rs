//! Test fixtures and proptest strategies for Strata development.
//!
//! Arena behaviour depends on absolute addresses (aligned allocation pads
//! against the real address of the next free byte) and on aliasing (arena
//! copies must tolerate overlapping regions). The fixtures here give tests
//! control over both:
//!
//! - [`OffsetBuffer`]: a buffer whose start sits at a chosen remainder
//!   modulo an alignment.
//! - [`SharedBuffer`]: one allocation handed out as raw, possibly
//!   overlapping windows.
//! - [`strategies`]: proptest strategies for sizes and alignments.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod strategies;

/// A byte buffer whose usable window starts at `remainder` past an
/// `alignment` boundary.
///
/// Backed by an over-sized `Vec<u8>`; the window is carved out after the
/// vector's real address is known.
pub struct OffsetBuffer {
    storage: Vec<u8>,
    start: usize,
    len: usize,
}

impl OffsetBuffer {
    /// A zeroed window of `len` bytes starting at
    /// `address % alignment == remainder`.
    ///
    /// # Panics
    ///
    /// Panics if `alignment` is not a power of two or `remainder >= alignment`.
    pub fn new(len: usize, alignment: usize, remainder: usize) -> Self {
        assert!(alignment.is_power_of_two(), "alignment must be a power of two");
        assert!(remainder < alignment, "remainder must be below alignment");
        let storage = vec![0u8; len + 2 * alignment];
        let base = storage.as_ptr() as usize;
        let start = (base.wrapping_neg() & (alignment - 1)) + remainder;
        Self {
            storage,
            start,
            len,
        }
    }

    /// Absolute address of the first byte of the window.
    pub fn addr(&self) -> usize {
        self.as_slice().as_ptr() as usize
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.storage[self.start..self.start + self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.storage[self.start..self.start + self.len]
    }

    /// Fill the window with `0, 1, 2, ...` (wrapping at 256).
    pub fn fill_ascending(&mut self) {
        for (i, byte) in self.as_mut_slice().iter_mut().enumerate() {
            *byte = i as u8;
        }
    }
}

/// One heap allocation handed out as raw windows.
///
/// Windows are derived with [`Vec::as_mut_ptr`], which does not create an
/// intermediate reference, so earlier windows stay usable after later ones
/// are taken.
pub struct SharedBuffer {
    bytes: Vec<u8>,
}

impl SharedBuffer {
    /// A buffer holding `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// A buffer of `len` bytes holding `0, 1, 2, ...` (wrapping at 256).
    pub fn ascending(len: usize) -> Self {
        Self {
            bytes: (0..len).map(|i| i as u8).collect(),
        }
    }

    /// Raw pointer to the byte at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is past the end of the buffer.
    pub fn window(&mut self, offset: usize) -> *mut u8 {
        assert!(offset <= self.bytes.len(), "window offset out of bounds");
        self.bytes.as_mut_ptr().wrapping_add(offset)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}
