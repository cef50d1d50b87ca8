//! Random node heights.
//!
//! A new node's rank (finger count) is drawn from a geometric-style
//! distribution defined by a probability table: `table[i]` is the chance
//! that a node reaches at least `i + 1` fingers. The default table uses
//! `p = 1/e`, which sizes [`L`] for roughly 4 billion elements.

use rand_core::RngCore;

/// Maximum finger depth of any node.
///
/// Estimated as `log(n) / log(1/p)` for `n = 2^32` and `p = 1/e`.
pub const L: usize = 22;

/// Table with `table[i] = p^i`; `table[0]` is 1, so ranks are at least 1.
pub(crate) fn table(p: f64) -> [f64; L] {
    let mut table = [0.0; L];
    let mut x = 1.0;
    for slot in &mut table {
        *slot = x;
        x *= p;
    }
    table
}

/// Default table at `p = 1/e`, mean rank ~1.58.
pub(crate) fn default_table() -> [f64; L] {
    table(std::f64::consts::E.recip())
}

/// Table tuned for an anticipated block size `b`: `p = b^(-1/2)`, so the
/// expected distance between rank-`i` nodes is `b^(i/2)`.
pub(crate) fn block_size_table(b: usize) -> [f64; L] {
    table((b as f64).powf(-0.5))
}

/// Draws a rank in `[1, max]`.
///
/// Takes a uniform `p` in `[0, 1)` and returns the smallest rank that is
/// either `max` or has `p >= table[rank]`.
pub(crate) fn random_rank<R: RngCore>(rng: &mut R, table: &[f64; L], max: usize) -> usize {
    // 53-bit mantissa conversion to a uniform double in [0, 1).
    let p = (rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64;

    let mut rank = 0;
    while rank < max && p < table[rank] {
        rank += 1;
    }
    rank
}
