//! Integration test: arena lifecycle across owned and borrowed regions.
//!
//! Walks the create / init / allocate / clear / destroy cycle the way a
//! caller would, checking that ownership decides what destroy releases and
//! that caller buffers are never modified by teardown.

use strata_arena::{Arena, ArenaConfig, ArenaError, DebugArena, Ownership, OwnershipMode};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn owned_arena_reuses_region_after_clear() {
    init_tracing();
    let mut arena: Box<Arena> = Arena::create(1024).unwrap();

    arena.alloc_slice(7).unwrap().copy_from_slice(b"Hello \0");
    arena.alloc_slice(7).unwrap().copy_from_slice(b"world!\0");
    assert_eq!(arena.slice(0, 6), Some(&b"Hello "[..]));
    assert_eq!(arena.slice(7, 6), Some(&b"world!"[..]));
    assert_eq!(arena.allocations(), 2);

    arena.clear();
    assert_eq!(arena.index(), 0);
    assert_eq!(arena.capacity(), 1024);

    arena.alloc_slice(14).unwrap().copy_from_slice(b"Numbers 1-3: \0");
    let numbers = arena.alloc_slice(3 * 4).unwrap();
    for (chunk, value) in numbers.chunks_exact_mut(4).zip([1i32, 2, 3]) {
        chunk.copy_from_slice(&value.to_ne_bytes());
    }
    let read: Vec<i32> = arena
        .slice(14, 12)
        .unwrap()
        .chunks_exact(4)
        .map(|c| i32::from_ne_bytes(c.try_into().unwrap()))
        .collect();
    assert_eq!(read, vec![1, 2, 3]);

    Arena::dispose(arena);
}

#[test]
fn aligned_allocations_advance_by_padding_and_size() {
    init_tracing();
    let mut arena: Box<Arena> = Arena::create(1024).unwrap();
    let base = arena.as_ptr().unwrap().as_ptr() as usize;
    // The owned region comes from the global allocator, which hands out
    // at least word-aligned blocks.
    assert_eq!(base % 4, 0);

    arena.alloc_aligned(10, 4).unwrap();
    assert_eq!(arena.index(), 10);
    arena.alloc_aligned(10, 4).unwrap();
    assert_eq!(arena.index(), 22);
    arena.alloc_aligned(10, 4).unwrap();
    assert_eq!(arena.index(), 34);
}

#[test]
fn debug_arena_reports_allocation_metadata() {
    init_tracing();
    let mut arena = DebugArena::create(1024).unwrap();
    let x = arena.alloc(5).unwrap();
    let y = arena.alloc(25).unwrap();

    let x_record = *arena.lookup(x.as_ptr()).unwrap();
    let y_record = *arena.lookup(y.as_ptr()).unwrap();
    assert_eq!((x_record.index, x_record.size), (0, 5));
    assert_eq!((y_record.index, y_record.size), (5, 25));
    assert_eq!(arena.head_allocation(), Some(&y_record));

    let order: Vec<usize> = arena.ledger().records().map(|r| r.size).collect();
    assert_eq!(order, vec![25, 5]);
}

#[test]
fn lookup_rejects_unknown_interior_and_null_pointers() {
    let mut region = [0u8; 64];
    let unrelated = 0u8;
    let mut arena: DebugArena<'_> = Arena::unbound();
    arena.init(&mut region).unwrap();

    let ptr = arena.alloc(8).unwrap();
    assert!(arena.lookup(&unrelated).is_none());
    assert!(arena.lookup(std::ptr::null()).is_none());
    assert!(arena.lookup(ptr.as_ptr().wrapping_add(3)).is_none());
    assert!(arena.lookup(ptr.as_ptr()).is_some());
}

#[test]
fn lookup_after_clear_finds_nothing() {
    let mut arena = DebugArena::create(32).unwrap();
    let ptr = arena.alloc(8).unwrap();
    arena.clear();
    assert!(arena.lookup(ptr.as_ptr()).is_none());
    assert_eq!(arena.ledger().records().len(), 0);
}

#[test]
fn destroy_never_touches_caller_bytes() {
    init_tracing();
    let mut region = [0x5Au8; 32];
    {
        let mut arena: Arena<'_> = Arena::unbound();
        arena.init(&mut region).unwrap();
        arena.alloc(8).unwrap();
        assert_eq!(arena.ownership(), OwnershipMode::BORROWED);

        arena.destroy();

        assert!(arena.region().is_none());
        assert_eq!(arena.index(), 0);
        assert_eq!(arena.capacity(), 0);
        assert_eq!(arena.ownership(), OwnershipMode::BORROWED);
        // A destroyed arena rejects allocations until it is re-initialised.
        assert_eq!(arena.alloc(1), Err(ArenaError::Unbound));
    }
    assert!(region.iter().all(|&b| b == 0x5A));
}

#[test]
fn owned_modes_reported_until_destroy() {
    let mut arena: Box<Arena> =
        Arena::with_config(ArenaConfig::new(64).with_fill(ArenaConfig::POISON_FILL)).unwrap();
    assert_eq!(arena.ownership(), OwnershipMode::OWNED);
    assert_eq!(arena.region().unwrap().ownership(), Ownership::Owned);

    arena.destroy();
    assert_eq!(arena.ownership(), OwnershipMode::BORROWED);
    assert!(!arena.is_valid());
}

#[test]
fn create_rejects_zero_bytes() {
    assert!(matches!(
        Arena::<strata_arena::Untracked>::create(0),
        Err(ArenaError::InvalidArgument { .. })
    ));
    assert!(DebugArena::create(0).is_err());
}

#[test]
fn reinit_after_destroy_binds_new_region() {
    let mut first = [0u8; 8];
    let mut second = [0u8; 24];
    let mut arena: Arena<'_> = Arena::unbound();
    arena.init(&mut first).unwrap();
    arena.alloc(8).unwrap();
    arena.destroy();

    arena.init(&mut second).unwrap();
    assert_eq!(arena.capacity(), 24);
    assert_eq!(arena.allocations(), 0);
    assert!(arena.alloc(24).is_ok());
}

#[test]
fn rejected_init_leaves_bound_arena_untouched() {
    init_tracing();
    let mut data = [0u8; 32];
    let mut empty: [u8; 0] = [];
    let mut spare = [0u8; 8];
    let mut arena: DebugArena<'_> = Arena::unbound();
    arena.init(&mut data).unwrap();
    let first = arena.alloc(12).unwrap();
    let base = arena.as_ptr();

    assert!(matches!(
        arena.init(&mut empty),
        Err(ArenaError::InvalidArgument { .. })
    ));
    // SAFETY: both calls are rejected before the pointer is stored.
    unsafe {
        assert!(arena.init_raw(std::ptr::null_mut(), 64).is_err());
        assert!(arena.init_raw(spare.as_mut_ptr(), 0).is_err());
    }

    assert_eq!(arena.as_ptr(), base);
    assert_eq!(arena.capacity(), 32);
    assert_eq!(arena.index(), 12);
    assert_eq!(arena.allocations(), 1);
    assert_eq!(arena.lookup(first.as_ptr()).map(|r| r.size), Some(12));
}
