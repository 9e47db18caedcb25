//! Proptest strategies for arena inputs.

use proptest::prelude::*;

/// Power-of-two alignments from 1 up to `1 << max_shift`.
pub fn alignments(max_shift: u32) -> impl Strategy<Value = usize> {
    (0..=max_shift).prop_map(|shift| 1usize << shift)
}

/// Alignments the arena must reject: zero and non-powers of two.
pub fn invalid_alignments() -> impl Strategy<Value = usize> {
    prop_oneof![
        Just(0usize),
        any::<usize>().prop_filter("must not be a power of two", |a| !a.is_power_of_two()),
    ]
}

/// Nonzero request sizes up to `max`.
pub fn request_sizes(max: usize) -> impl Strategy<Value = usize> {
    1..=max
}

/// A sequence of `(size, alignment)` requests.
pub fn requests(
    max_size: usize,
    max_shift: u32,
    max_len: usize,
) -> impl Strategy<Value = Vec<(usize, usize)>> {
    proptest::collection::vec((request_sizes(max_size), alignments(max_shift)), 0..=max_len)
}
