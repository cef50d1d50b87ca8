//! Recursive binary subdivision of an unsigned-integer domain.
//!
//! The field partitions `[0, K::MAX]` into disjoint arcs. Each arc keeps
//! a rank — its remaining bisection depth — and splitting an arc halves
//! it, spending one rank on each half. Arcs are indexed by their upper
//! bound in a [`SkipSet`], so the arc covering a key is its successor
//! lookup; the side table maps each upper bound to the arc's rank and
//! lower bound.

use core::fmt;
use core::hash::Hash;

use rand_core::RngCore;
use rustc_hash::FxHashMap;

use crate::iter::Elements;
use crate::set::SkipSet;

/// An unsigned key domain that the field can bisect.
///
/// Implemented for `u8`, `u16`, `u32`, and `u64`.
pub trait Bisect: Copy + Ord + Hash + fmt::Display + fmt::LowerHex {
    /// Smallest key of the domain.
    const ZERO: Self;
    /// Largest key of the domain.
    const MAX: Self;
    /// Bisection depth of the whole domain.
    const BITS: u32;

    /// `lo + (hi - lo) / 2`, the split point of an arc.
    fn midpoint(lo: Self, hi: Self) -> Self;

    /// The key immediately above `self`; never called on `MAX`.
    fn step_up(self) -> Self;
}

macro_rules! impl_bisect {
    ($($ty:ty),+) => {
        $(
            impl Bisect for $ty {
                const ZERO: Self = 0;
                const MAX: Self = <$ty>::MAX;
                const BITS: u32 = <$ty>::BITS;

                #[inline]
                fn midpoint(lo: Self, hi: Self) -> Self {
                    lo + (hi - lo) / 2
                }

                #[inline]
                fn step_up(self) -> Self {
                    self + 1
                }
            }
        )+
    };
}

impl_bisect!(u8, u16, u32, u64);

/// One arc of the partition: the closed interval `[lo, hi]` with its
/// remaining bisection depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arc<K> {
    /// Remaining bisection depth; a rank-0 arc covers a single key.
    pub rank: u32,
    /// Lower bound, inclusive.
    pub lo: K,
    /// Upper bound, inclusive; the arc's index key.
    pub hi: K,
}

/// Rank and lower bound stored beside an arc's index key.
#[derive(Clone, Copy)]
struct Span<K> {
    rank: u32,
    lo: K,
}

/// A total partition of `[0, K::MAX]` into bisection arcs.
///
/// # Example
///
/// ```
/// use rand::{rngs::SmallRng, SeedableRng};
/// use strata::Gf2;
///
/// let mut field: Gf2<u8, _> = Gf2::new(SmallRng::seed_from_u64(12345));
///
/// // The whole domain is one arc until a key splits it.
/// assert_eq!(field.get(0x39).lo, 0x00);
/// assert_eq!(field.get(0x39).hi, 0xff);
///
/// let (head, tail) = field.add(0x39);
/// assert_eq!((head.lo, head.hi), (0x00, 0x7f));
/// assert_eq!((tail.lo, tail.hi), (0x80, 0xff));
/// ```
///
/// # Panics
///
/// Lookups panic with `"non-continuous field"` if the partition no
/// longer covers the probed key; that state is unreachable through this
/// API and indicates a programming error.
pub struct Gf2<K, R>
where
    K: Bisect,
{
    keys: SkipSet<K, R>,
    arcs: FxHashMap<K, Span<K>>,
}

impl<K, R> Gf2<K, R>
where
    K: Bisect,
    R: RngCore,
{
    /// Creates a field holding one arc over the whole domain.
    pub fn new(rng: R) -> Self {
        let mut keys = SkipSet::new(rng);
        keys.add(K::MAX);

        let mut arcs = FxHashMap::default();
        arcs.insert(
            K::MAX,
            Span {
                rank: K::BITS,
                lo: K::ZERO,
            },
        );

        Self { keys, arcs }
    }

    /// Number of arcs in the partition.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// The field always covers its domain, so it is never empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The arc covering `key`.
    pub fn get(&self, key: K) -> Arc<K> {
        let el = self
            .keys
            .successor(&key)
            .unwrap_or_else(|| panic!("non-continuous field"));
        let hi = *el.key();
        let span = self.arcs[&hi];
        Arc {
            rank: span.rank,
            lo: span.lo,
            hi,
        }
    }

    /// Splits the arc covering `key` and returns the two halves.
    ///
    /// A rank-0 arc cannot subdivide further and is returned as both
    /// halves; otherwise the covering arc `[lo, hi]` becomes a head
    /// `[lo, mid]` and a tail `[mid + 1, hi]`, each one rank shallower,
    /// and `mid` joins the index.
    pub fn add(&mut self, key: K) -> (Arc<K>, Arc<K>) {
        let tail = self.get(key);
        if tail.rank == 0 {
            return (tail, tail);
        }

        let rank = tail.rank - 1;
        let mid = K::midpoint(tail.lo, tail.hi);

        let head = Arc {
            rank,
            lo: tail.lo,
            hi: mid,
        };
        let tail = Arc {
            rank,
            lo: mid.step_up(),
            hi: tail.hi,
        };

        self.keys.add(mid);
        self.arcs.insert(
            mid,
            Span {
                rank,
                lo: head.lo,
            },
        );
        self.arcs.insert(
            tail.hi,
            Span {
                rank,
                lo: tail.lo,
            },
        );

        (head, tail)
    }

    /// Inserts or overwrites an arc keyed by its upper bound.
    ///
    /// The caller is responsible for keeping the partition total and
    /// disjoint; lookups on a field with gaps panic.
    pub fn put(&mut self, arc: Arc<K>) {
        self.keys.add(arc.hi);
        self.arcs.insert(
            arc.hi,
            Span {
                rank: arc.rank,
                lo: arc.lo,
            },
        );
    }

    /// Iterator over the arc index keys in ascending order.
    #[inline]
    pub fn keys(&self) -> Elements<'_, K, ()> {
        self.keys.elements()
    }

    /// Iterator over index keys starting at the successor of `key`.
    #[inline]
    pub fn successors(&self, key: K) -> Elements<'_, K, ()> {
        self.keys.successors(&key)
    }
}

impl<K, R> fmt::Display for Gf2<K, R>
where
    K: Bisect,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- SkipGF2 ---")?;
        for el in self.keys.elements() {
            let hi = *el.key();
            let span = self.arcs[&hi];
            writeln!(
                f,
                "{{ {:>2} : {:>8x} - {:>8x} | {:>10} - {:>10} }}",
                span.rank, span.lo, hi, span.lo, hi
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn make_rng() -> SmallRng {
        SmallRng::seed_from_u64(12345)
    }

    #[test]
    fn subdivision_converges_on_the_key() {
        let mut field: Gf2<u8, _> = Gf2::new(make_rng());
        let key = 0x39;

        for [lo, mid, hi] in [
            [0x00, 0x7f, 0xff],
            [0x00, 0x3f, 0x7f],
            [0x00, 0x1f, 0x3f],
            [0x20, 0x2f, 0x3f],
            [0x30, 0x37, 0x3f],
            [0x38, 0x3b, 0x3f],
            [0x38, 0x39, 0x3b],
            [0x38, 0x38, 0x39],
            [0x39, 0x39, 0x39],
        ] {
            let arc = field.get(key);
            assert_eq!(arc.lo, lo);
            assert_eq!(arc.hi, hi);

            let (head, tail) = field.add(key);
            assert_eq!(head.lo, lo);
            assert_eq!(head.hi, mid);
            assert_eq!(tail.hi, hi);
        }

        // Rank 0: further adds are fixed points.
        let (head, tail) = field.add(key);
        assert_eq!(head, tail);
        assert_eq!((head.lo, head.hi), (key, key));
    }

    #[test]
    fn index_topology_after_convergence() {
        let mut field: Gf2<u8, _> = Gf2::new(make_rng());
        for _ in 0..9 {
            field.add(0x39);
        }

        let topo: Vec<u8> = field.keys().map(|el| *el.key()).collect();
        assert_eq!(
            topo,
            vec![0x1f, 0x2f, 0x37, 0x38, 0x39, 0x3b, 0x3f, 0x7f, 0xff]
        );

        let from: Vec<u8> = field.successors(0x31).map(|el| *el.key()).collect();
        assert_eq!(from, topo[2..]);
    }

    #[test]
    fn halves_stay_adjacent() {
        let mut field: Gf2<u32, _> = Gf2::new(make_rng());
        let mut keys = [1024u32, 77, 0, u32::MAX, 123_456_789];
        keys.sort_unstable();

        for key in keys {
            let (head, tail) = field.add(key);
            if head != tail {
                assert!(head.hi.step_up() == tail.lo);
                assert!(head.lo <= head.hi && tail.lo <= tail.hi);
            }
            let covering = field.get(key);
            assert!(covering.lo <= key && key <= covering.hi);
        }
    }

    #[test]
    fn put_installs_arcs() {
        let mut field: Gf2<u8, _> = Gf2::new(make_rng());
        field.put(Arc {
            rank: 7,
            lo: 0x00,
            hi: 0x7f,
        });
        field.put(Arc {
            rank: 7,
            lo: 0x80,
            hi: 0xff,
        });

        let arc = field.get(0x60);
        assert_eq!((arc.lo, arc.hi), (0x00, 0x7f));
        let arc = field.get(0xa0);
        assert_eq!((arc.lo, arc.hi), (0x80, 0xff));
    }

    #[test]
    #[should_panic(expected = "non-continuous field")]
    fn tampered_field_panics() {
        let mut field: Gf2<u8, _> = Gf2::new(make_rng());
        // Remove the top arc behind the field's back.
        field.keys.cut(&0xff);
        field.get(0xfe);
    }

    #[test]
    fn dump_names_the_field() {
        let field: Gf2<u8, _> = Gf2::new(make_rng());
        let dump = field.to_string();
        assert!(dump.starts_with("--- SkipGF2 ---"));
        assert!(dump.contains("ff"));
    }
}
