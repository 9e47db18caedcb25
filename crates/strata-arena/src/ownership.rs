//! Ownership modes for an arena's storage and its region.

/// Whether a resource was obtained by the engine or supplied by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ownership {
    /// Heap-obtained by the engine; released on destroy.
    Owned,
    /// Supplied by the caller; never released or modified by the engine.
    Borrowed,
}

impl Ownership {
    /// Returns `true` if the engine is responsible for releasing the resource.
    pub fn is_owned(self) -> bool {
        matches!(self, Self::Owned)
    }
}

/// Ownership of the two resources an arena can hold.
///
/// `storage` covers the arena value itself (owned when it was boxed by
/// [`Arena::create`](crate::Arena::create)); `region` covers the byte
/// buffer allocations are carved from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OwnershipMode {
    /// Ownership of the arena's own storage.
    pub storage: Ownership,
    /// Ownership of the backing region.
    pub region: Ownership,
}

impl OwnershipMode {
    /// Both storage and region belong to the caller.
    pub const BORROWED: Self = Self {
        storage: Ownership::Borrowed,
        region: Ownership::Borrowed,
    };

    /// Both storage and region were heap-obtained by the engine.
    pub const OWNED: Self = Self {
        storage: Ownership::Owned,
        region: Ownership::Owned,
    };
}

impl Default for OwnershipMode {
    fn default() -> Self {
        Self::BORROWED
    }
}
