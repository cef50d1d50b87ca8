//! Ordered set of keys.

use core::fmt;

use rand_core::RngCore;

use crate::alloc::{Allocator, Heap};
use crate::iter::{Elements, Keys, LevelElements, Range};
use crate::level::{block_size_table, default_table, table};
use crate::list::{Drain, SkipList};
use crate::node::Element;
use crate::ordering::{Comparator, Natural};

/// An ordered set backed by a probabilistic skip list.
///
/// Keys are kept in comparator order on the bottom level, with sparser
/// express lanes above; add, lookup, and cut are O(log n) expected, and
/// [`split`](SkipSet::split) slices off the suffix at a key with O(L)
/// pointer surgery.
///
/// # Example
///
/// ```
/// use rand::{rngs::SmallRng, SeedableRng};
/// use strata::SkipSet;
///
/// let mut set: SkipSet<u32, _> = SkipSet::new(SmallRng::seed_from_u64(12345));
///
/// assert!(set.add(50).0);
/// assert!(set.add(10).0);
/// assert!(!set.add(50).0); // already present
///
/// assert!(set.has(&10));
/// let keys: Vec<u32> = set.iter().copied().collect();
/// assert_eq!(keys, vec![10, 50]);
/// ```
pub struct SkipSet<K, R, C = Natural, A = Heap>
where
    C: Comparator<K>,
    A: Allocator<K, ()>,
{
    list: SkipList<K, (), C, R, A>,
}

impl<K, R> SkipSet<K, R>
where
    K: Ord,
    R: RngCore,
{
    /// Creates an empty set with the default rank distribution
    /// (`p = 1/e`, mean rank ~1.58).
    pub fn new(rng: R) -> Self {
        Self {
            list: SkipList::new(rng, Natural, Heap, default_table()),
        }
    }

    /// Creates an empty set with rank probability `p` per level.
    pub fn with_probability(rng: R, p: f64) -> Self {
        Self {
            list: SkipList::new(rng, Natural, Heap, table(p)),
        }
    }

    /// Creates an empty set tuned for an anticipated size `b`, so the
    /// expected distance between rank-`i` elements is `b^(i/2)`.
    pub fn with_block_size(rng: R, b: usize) -> Self {
        Self {
            list: SkipList::new(rng, Natural, Heap, block_size_table(b)),
        }
    }
}

impl<K, R, C> SkipSet<K, R, C>
where
    R: RngCore,
    C: Comparator<K>,
{
    /// Creates an empty set ordered by a custom comparator.
    pub fn with_comparator(rng: R, cmp: C) -> Self {
        Self {
            list: SkipList::new(rng, cmp, Heap, default_table()),
        }
    }
}

impl<K, R, C, A> SkipSet<K, R, C, A>
where
    R: RngCore,
    C: Comparator<K>,
    A: Allocator<K, ()>,
{
    /// Creates an empty set with a custom comparator and allocator hook.
    pub fn with_allocator(rng: R, cmp: C, alloc: A) -> Self {
        Self {
            list: SkipList::new(rng, cmp, alloc, default_table()),
        }
    }

    /// Adds `key` to the set.
    ///
    /// Returns `true` and the new element if the key was absent, `false`
    /// and the existing element otherwise.
    pub fn add(&mut self, key: K) -> (bool, &Element<K, ()>) {
        let (inserted, el) = self.list.upsert(key, ());
        // Safety: the element is linked; the reference borrows `self`.
        (inserted, unsafe { &*el.as_ptr() })
    }

    /// Adds `key` with the rank draw capped at `max_rank` fingers,
    /// keeping the new element out of levels at `max_rank` and above.
    pub fn add_on(&mut self, max_rank: usize, key: K) -> (bool, &Element<K, ()>) {
        let (inserted, el) = self.list.upsert_capped(max_rank, key, ());
        // Safety: as for `add`.
        (inserted, unsafe { &*el.as_ptr() })
    }
}

impl<K, R, C, A> SkipSet<K, R, C, A>
where
    C: Comparator<K>,
    A: Allocator<K, ()>,
{
    /// Number of keys in the set, O(1).
    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.len() == 0
    }

    /// Highest populated level, `None` when the set is empty.
    #[inline]
    pub fn level(&self) -> Option<usize> {
        self.list.level()
    }

    /// Whether an equal key is in the set.
    #[inline]
    pub fn has(&self, key: &K) -> bool {
        self.list.get(key).is_some()
    }

    /// The element with an equal key, if present.
    #[inline]
    pub fn get(&self, key: &K) -> Option<&Element<K, ()>> {
        self.list.get(key)
    }

    /// Removes `key` from the set; `true` if it was present.
    pub fn cut(&mut self, key: &K) -> bool {
        self.list.remove(key).is_some()
    }

    /// Excises the run of keys `(from, from.next_on(level)]` in one
    /// pass; the run extends to the end of the set when `from` has no
    /// finger at `level`. Returns a drain over the excised keys.
    #[inline]
    pub fn cut_on(&mut self, level: usize, from: &K) -> Drain<'_, K, (), A> {
        self.list.cut_on(level, from)
    }

    /// First element in key order.
    #[inline]
    pub fn first(&self) -> Option<&Element<K, ()>> {
        self.list.first()
    }

    /// The least element with key not less than `key`.
    #[inline]
    pub fn successor(&self, key: &K) -> Option<&Element<K, ()>> {
        self.list.successor(key)
    }

    /// The greatest element with key less than `key`.
    #[inline]
    pub fn predecessor(&self, key: &K) -> Option<&Element<K, ()>> {
        self.list.neighbours(key).0
    }

    /// Both neighbours of `key` in one walk: predecessor and successor.
    #[inline]
    pub fn neighbours(&self, key: &K) -> (Option<&Element<K, ()>>, Option<&Element<K, ()>>) {
        self.list.neighbours(key)
    }

    /// Moves every key not less than `key` into a new set.
    ///
    /// The source keeps the strict prefix. The returned set shares the
    /// comparator, rank distribution, and allocator configuration (by
    /// clone) and is empty when no key is at or above `key`.
    pub fn split(&mut self, key: &K) -> Self
    where
        C: Clone,
        R: Clone,
        A: Clone,
    {
        Self {
            list: self.list.split(key),
        }
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Iterator over keys in ascending order.
    #[inline]
    pub fn iter(&self) -> Keys<'_, K, ()> {
        Keys {
            inner: self.elements(),
        }
    }

    /// Iterator over elements in ascending key order.
    #[inline]
    pub fn elements(&self) -> Elements<'_, K, ()> {
        Elements::new(self.list.first())
    }

    /// Iterator over elements starting at the successor of `key`.
    #[inline]
    pub fn successors(&self, key: &K) -> Elements<'_, K, ()> {
        Elements::new(self.list.successor(key))
    }

    /// Iterator over the sparser element chain at `level`.
    #[inline]
    pub fn elements_on(&self, level: usize) -> LevelElements<'_, K, ()> {
        LevelElements::new(self.list.first_on(level), level)
    }

    /// Iterator over elements with keys in the inclusive range
    /// `[from, to]`.
    #[inline]
    pub fn range<'a>(&'a self, from: &K, to: &'a K) -> Range<'a, K, (), C> {
        Range {
            inner: self.successors(from),
            to,
            cmp: self.list.comparator(),
        }
    }

    pub(crate) fn fmt_dump(&self, f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result
    where
        K: fmt::Display,
    {
        self.list.fmt_dump(f, title)
    }

    #[cfg(test)]
    pub(crate) fn audit(&self) {
        self.list.audit();
    }
}

impl<K, R, C, A> fmt::Display for SkipSet<K, R, C, A>
where
    K: fmt::Display,
    C: Comparator<K>,
    A: Allocator<K, ()>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.list.fmt_dump(f, "SkipSet")
    }
}
