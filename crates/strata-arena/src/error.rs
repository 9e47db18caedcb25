//! Arena-specific error types.

use thiserror::Error;

/// Errors that can occur during arena operations.
///
/// Every error is reported before the arena is mutated: a failed call
/// leaves the offset, the allocation counter and the ledger exactly as
/// they were.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ArenaError {
    /// A size or region argument was zero, null, or otherwise unusable.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the argument.
        reason: &'static str,
    },
    /// The requested alignment is zero or not a power of two.
    #[error("invalid alignment {alignment}: must be a nonzero power of two")]
    InvalidAlignment {
        /// The rejected alignment.
        alignment: usize,
    },
    /// The arena has no backing region (never initialised, or destroyed).
    #[error("arena has no backing region")]
    Unbound,
    /// The request, including any alignment padding, does not fit in the
    /// remaining capacity.
    #[error("arena capacity exceeded: requested {requested} bytes, {available} available")]
    CapacityExceeded {
        /// Bytes requested, padding included.
        requested: usize,
        /// Bytes left between the current offset and the end of the region.
        available: usize,
    },
    /// Computing the end of the allocation would wrap `usize`.
    #[error("allocation at offset {index} of {requested} bytes overflows the address space")]
    Overflow {
        /// Offset the allocation would have started from.
        index: usize,
        /// Bytes requested, padding included where it could be computed.
        requested: usize,
    },
    /// The heap could not supply memory for an owned region or a ledger
    /// record.
    #[error("heap allocation of {requested} bytes failed")]
    OutOfMemory {
        /// Number of bytes the heap was asked for.
        requested: usize,
    },
}

impl ArenaError {
    /// Returns `true` for failures caused by running out of arena space.
    ///
    /// Arithmetic overflow counts as a capacity failure: a range that cannot
    /// be represented can never fit.
    pub fn is_capacity_error(&self) -> bool {
        matches!(self, Self::CapacityExceeded { .. } | Self::Overflow { .. })
    }
}
