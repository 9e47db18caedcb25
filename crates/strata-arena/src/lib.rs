//! Fixed-capacity linear (bump) allocation.
//!
//! An [`Arena`] carves allocations sequentially out of one contiguous byte
//! region by advancing an offset. There is no per-allocation free: the
//! whole arena is reset with [`Arena::clear`] and torn down with
//! [`Arena::destroy`]. The region never grows.
//!
//! # Architecture
//!
//! ```text
//! Arena<'a, L: Ledger>
//! ├── Region<'a>          (borrowed &mut [u8] / raw window, or heap-owned)
//! ├── index, allocations  (bump offset and live-allocation counter)
//! ├── Ownership           (storage: Owned|Borrowed)
//! └── L: Ledger           (Untracked: zero-sized | Tracked: Vec<AllocationRecord>)
//! ```
//!
//! # Allocation tracking
//!
//! The ledger is a type parameter. `Arena<'a>` uses [`Untracked`] and
//! keeps no per-allocation metadata. [`DebugArena`] uses [`Tracked`],
//! which records offset, size and address of every live allocation and
//! adds [`Arena::lookup`].
//!
//! # Concurrency
//!
//! Arenas carry no synchronization. An arena can be moved between threads
//! but not shared; callers serialize access themselves.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod address;
pub mod arena;
pub mod config;
pub mod copy;
pub mod error;
pub mod ledger;
pub mod ownership;
pub mod region;

// Public re-exports for the primary API surface.
pub use arena::{Arena, DebugArena};
pub use config::ArenaConfig;
pub use copy::copy;
pub use error::ArenaError;
pub use ledger::{AllocationRecord, Ledger, Tracked, Untracked};
pub use ownership::{Ownership, OwnershipMode};
pub use region::Region;
