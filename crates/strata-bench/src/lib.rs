//! Benchmark workloads for the Strata arena allocator.
//!
//! - [`Request`]: one `(size, alignment)` allocation request
//! - [`request_mix`]: deterministic mixed-size request stream via seed
//! - [`fill_frame`]: replay a request stream into an arena until it fills

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use strata_arena::{Arena, Ledger};

/// A single allocation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Request {
    /// Bytes requested.
    pub size: usize,
    /// Power-of-two alignment.
    pub alignment: usize,
}

/// Generate `n` deterministic requests of 1..=`max_size` bytes with
/// alignments between 1 and 64.
///
/// Sizes and alignments come from a simple LCG over the seed, so the same
/// seed always yields the same stream.
pub fn request_mix(n: usize, max_size: usize, seed: u64) -> Vec<Request> {
    let max_size = max_size.max(1) as u64;
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let size = ((state >> 33) % max_size) as usize + 1;
            let alignment = 1usize << ((state >> 24) % 7);
            Request { size, alignment }
        })
        .collect()
}

/// Replay `requests` into `arena` in order, stopping at the first request
/// that does not fit. Returns the number of requests served.
pub fn fill_frame<L: Ledger>(arena: &mut Arena<'_, L>, requests: &[Request]) -> usize {
    requests
        .iter()
        .take_while(|r| arena.alloc_aligned(r.size, r.alignment).is_ok())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_arena::DebugArena;

    #[test]
    fn request_mix_deterministic() {
        let a = request_mix(64, 256, 42);
        let b = request_mix(64, 256, 42);
        assert_eq!(a, b);
        assert_ne!(a, request_mix(64, 256, 43));
    }

    #[test]
    fn request_mix_within_bounds() {
        for r in request_mix(1000, 100, 7) {
            assert!((1..=100).contains(&r.size), "size {} out of bounds", r.size);
            assert!(r.alignment.is_power_of_two() && r.alignment <= 64);
        }
    }

    #[test]
    fn fill_frame_stops_at_first_miss() {
        let requests = request_mix(10_000, 128, 1);
        let mut arena: Box<DebugArena> = Arena::create(4096).unwrap();
        let served = fill_frame(&mut arena, &requests);
        assert!(served > 0 && served < requests.len());
        assert_eq!(arena.allocations(), served);
        assert!(arena.index() <= arena.capacity());
    }
}
