//! Ordered key-value map.

use core::fmt;

use rand_core::RngCore;

use crate::alloc::{Allocator, Heap};
use crate::iter::{Elements, Entries, Keys, LevelElements, Range};
use crate::level::{block_size_table, default_table, table};
use crate::list::{Drain, SkipList};
use crate::node::Element;
use crate::ordering::{Comparator, Natural};

/// An ordered map backed by a probabilistic skip list.
///
/// Each element carries its value alongside the key; everything else —
/// the level structure, successor walks, O(L) splitting — behaves as in
/// [`SkipSet`](crate::SkipSet).
///
/// # Example
///
/// ```
/// use rand::{rngs::SmallRng, SeedableRng};
/// use strata::SkipMap;
///
/// let mut map: SkipMap<u32, &str, _> = SkipMap::new(SmallRng::seed_from_u64(12345));
///
/// assert!(map.put(5, "a").0);
/// assert!(!map.put(5, "b").0); // overwrote
///
/// assert_eq!(map.get(&5), Some(&"b"));
/// assert_eq!(map.len(), 1);
/// assert_eq!(map.cut(&5), Some("b"));
/// ```
pub struct SkipMap<K, V, R, C = Natural, A = Heap>
where
    C: Comparator<K>,
    A: Allocator<K, V>,
{
    list: SkipList<K, V, C, R, A>,
}

impl<K, V, R> SkipMap<K, V, R>
where
    K: Ord,
    R: RngCore,
{
    /// Creates an empty map with the default rank distribution.
    pub fn new(rng: R) -> Self {
        Self {
            list: SkipList::new(rng, Natural, Heap, default_table()),
        }
    }

    /// Creates an empty map with rank probability `p` per level.
    pub fn with_probability(rng: R, p: f64) -> Self {
        Self {
            list: SkipList::new(rng, Natural, Heap, table(p)),
        }
    }

    /// Creates an empty map tuned for an anticipated size `b`.
    pub fn with_block_size(rng: R, b: usize) -> Self {
        Self {
            list: SkipList::new(rng, Natural, Heap, block_size_table(b)),
        }
    }
}

impl<K, V, R, C> SkipMap<K, V, R, C>
where
    R: RngCore,
    C: Comparator<K>,
{
    /// Creates an empty map ordered by a custom comparator.
    pub fn with_comparator(rng: R, cmp: C) -> Self {
        Self {
            list: SkipList::new(rng, cmp, Heap, default_table()),
        }
    }
}

impl<K, V, R, C, A> SkipMap<K, V, R, C, A>
where
    R: RngCore,
    C: Comparator<K>,
    A: Allocator<K, V>,
{
    /// Creates an empty map with a custom comparator and allocator hook.
    pub fn with_allocator(rng: R, cmp: C, alloc: A) -> Self {
        Self {
            list: SkipList::new(rng, cmp, alloc, default_table()),
        }
    }

    /// Inserts `key -> value`, overwriting the value of an existing key.
    ///
    /// Returns `true` and the new element if the key was absent, `false`
    /// and the overwritten element otherwise.
    pub fn put(&mut self, key: K, value: V) -> (bool, &Element<K, V>) {
        let (inserted, el) = self.list.upsert(key, value);
        // Safety: the element is linked; the reference borrows `self`.
        (inserted, unsafe { &*el.as_ptr() })
    }

    /// [`put`](SkipMap::put) with the rank draw capped at `max_rank`
    /// fingers.
    pub fn put_on(&mut self, max_rank: usize, key: K, value: V) -> (bool, &Element<K, V>) {
        let (inserted, el) = self.list.upsert_capped(max_rank, key, value);
        // Safety: as for `put`.
        (inserted, unsafe { &*el.as_ptr() })
    }
}

impl<K, V, R, C, A> SkipMap<K, V, R, C, A>
where
    C: Comparator<K>,
    A: Allocator<K, V>,
{
    /// Number of entries, O(1).
    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether the map is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.len() == 0
    }

    /// Highest populated level, `None` when the map is empty.
    #[inline]
    pub fn level(&self) -> Option<usize> {
        self.list.level()
    }

    /// Whether an equal key is present.
    #[inline]
    pub fn has(&self, key: &K) -> bool {
        self.list.get(key).is_some()
    }

    /// The value for `key`, if present.
    #[inline]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.list.get(key).map(Element::value)
    }

    /// Mutable access to the value for `key`, if present.
    #[inline]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.list.get_value_mut(key)
    }

    /// The element with an equal key, if present.
    #[inline]
    pub fn element(&self, key: &K) -> Option<&Element<K, V>> {
        self.list.get(key)
    }

    /// Removes `key` and returns its previous value.
    pub fn cut(&mut self, key: &K) -> Option<V> {
        self.list.remove(key).map(|(_, value)| value)
    }

    /// Excises the run of entries `(from, from.next_on(level)]` in one
    /// pass; see [`SkipSet::cut_on`](crate::SkipSet::cut_on).
    #[inline]
    pub fn cut_on(&mut self, level: usize, from: &K) -> Drain<'_, K, V, A> {
        self.list.cut_on(level, from)
    }

    /// First element in key order.
    #[inline]
    pub fn first(&self) -> Option<&Element<K, V>> {
        self.list.first()
    }

    /// The least element with key not less than `key`.
    #[inline]
    pub fn successor(&self, key: &K) -> Option<&Element<K, V>> {
        self.list.successor(key)
    }

    /// The greatest element with key less than `key`.
    #[inline]
    pub fn predecessor(&self, key: &K) -> Option<&Element<K, V>> {
        self.list.neighbours(key).0
    }

    /// Both neighbours of `key` in one walk.
    #[inline]
    pub fn neighbours(&self, key: &K) -> (Option<&Element<K, V>>, Option<&Element<K, V>>) {
        self.list.neighbours(key)
    }

    /// Moves every entry with key not less than `key` into a new map.
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

    /// Iterator over `(key, value)` pairs in ascending key order.
    #[inline]
    pub fn iter(&self) -> Entries<'_, K, V> {
        Entries {
            inner: self.elements(),
        }
    }

    /// Iterator over keys in ascending order.
    #[inline]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            inner: self.elements(),
        }
    }

    /// Iterator over elements in ascending key order.
    #[inline]
    pub fn elements(&self) -> Elements<'_, K, V> {
        Elements::new(self.list.first())
    }

    /// Iterator over elements starting at the successor of `key`.
    #[inline]
    pub fn successors(&self, key: &K) -> Elements<'_, K, V> {
        Elements::new(self.list.successor(key))
    }

    /// Iterator over the sparser element chain at `level`.
    #[inline]
    pub fn elements_on(&self, level: usize) -> LevelElements<'_, K, V> {
        LevelElements::new(self.list.first_on(level), level)
    }

    /// Iterator over elements with keys in the inclusive range
    /// `[from, to]`.
    #[inline]
    pub fn range<'a>(&'a self, from: &K, to: &'a K) -> Range<'a, K, V, C> {
        Range {
            inner: self.successors(from),
            to,
            cmp: self.list.comparator(),
        }
    }

    #[cfg(test)]
    pub(crate) fn audit(&self) {
        self.list.audit();
    }
}

impl<K, V, R, C, A> fmt::Display for SkipMap<K, V, R, C, A>
where
    K: fmt::Display,
    C: Comparator<K>,
    A: Allocator<K, V>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.list.fmt_dump(f, "SkipMap")
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
    fn new_is_empty() {
        let map: SkipMap<u32, String, _> = SkipMap::new(make_rng());
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert!(map.first().is_none());
    }

    #[test]
    fn put_overwrites_existing() {
        let mut map = SkipMap::new(make_rng());

        let (inserted, _) = map.put(5, "a");
        assert!(inserted);
        let (inserted, el) = map.put(5, "b");
        assert!(!inserted);
        assert_eq!(*el.value(), "b");

        assert_eq!(map.get(&5), Some(&"b"));
        assert_eq!(map.len(), 1);
        map.audit();
    }

    #[test]
    fn get_and_get_mut() {
        let mut map = SkipMap::new(make_rng());
        map.put(10, "ten".to_string());
        map.put(20, "twenty".to_string());

        assert_eq!(map.get(&10), Some(&"ten".to_string()));
        assert_eq!(map.get(&99), None);

        if let Some(v) = map.get_mut(&10) {
            v.push_str("!");
        }
        assert_eq!(map.get(&10), Some(&"ten!".to_string()));
        assert_eq!(map.get_mut(&99), None);
    }

    #[test]
    fn cut_returns_previous_value() {
        let mut map = SkipMap::new(make_rng());
        map.put(10, "ten");
        map.put(20, "twenty");

        assert_eq!(map.cut(&10), Some("ten"));
        assert_eq!(map.cut(&10), None);
        assert_eq!(map.len(), 1);
        map.audit();
    }

    #[test]
    fn iter_pairs_are_sorted() {
        let mut map = SkipMap::new(make_rng());
        for (k, v) in [(50, "fifty"), (10, "ten"), (90, "ninety"), (30, "thirty")] {
            map.put(k, v);
        }

        let pairs: Vec<(u32, &str)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(
            pairs,
            vec![(10, "ten"), (30, "thirty"), (50, "fifty"), (90, "ninety")]
        );
        let keys: Vec<u32> = map.keys().copied().collect();
        assert_eq!(keys, vec![10, 30, 50, 90]);
    }

    #[test]
    fn successor_carries_the_value() {
        let mut map = SkipMap::new(make_rng());
        map.put(10, "ten");
        map.put(20, "twenty");

        let el = map.successor(&15).unwrap();
        assert_eq!(*el.key(), 20);
        assert_eq!(*el.value(), "twenty");

        let (pred, succ) = map.neighbours(&20);
        assert_eq!(*pred.unwrap().key(), 10);
        assert_eq!(*succ.unwrap().key(), 20);
    }

    #[test]
    fn split_partitions_entries() {
        let mut map = SkipMap::new(make_rng());
        for k in [1u32, 2, 3, 4, 5, 6] {
            map.put(k, k * 10);
        }

        let tail = map.split(&4);
        assert_eq!(map.len(), 3);
        assert_eq!(tail.len(), 3);
        assert_eq!(map.get(&3), Some(&30));
        assert_eq!(map.get(&4), None);
        assert_eq!(tail.get(&4), Some(&40));
        assert_eq!(tail.get(&3), None);
        map.audit();
        tail.audit();
    }

    #[test]
    fn range_yields_values() {
        let mut map = SkipMap::new(make_rng());
        for k in 0..10u32 {
            map.put(k, k * k);
        }
        let squares: Vec<u32> = map.range(&3, &6).map(|el| *el.value()).collect();
        assert_eq!(squares, vec![9, 16, 25, 36]);
    }

    #[test]
    fn put_on_caps_rank() {
        let mut map = SkipMap::new(make_rng());
        for k in 0..256u32 {
            let (_, el) = map.put_on(3, k, ());
            assert!(el.rank() <= 3);
        }
        map.audit();
    }

    #[test]
    fn cut_on_yields_values() {
        let mut map = SkipMap::new(make_rng());
        for k in 0..64u32 {
            map.put(k, k + 1000);
        }
        let anchor = map
            .elements()
            .find(|el| el.rank() > 1 && el.next_on(1).is_some())
            .map(|el| *el.key())
            .unwrap();
        let drained: Vec<(u32, u32)> = map.cut_on(1, &anchor).collect();
        assert!(!drained.is_empty());
        assert!(drained.iter().all(|(k, v)| *v == *k + 1000));
        map.audit();
    }

    #[test]
    fn dump_names_the_map() {
        let mut map = SkipMap::new(make_rng());
        map.put(7u32, "seven");
        let dump = map.to_string();
        assert!(dump.starts_with("--- SkipMap ---"));
        assert!(dump.contains('7'));
    }

    #[test]
    fn string_keys_order_lexicographically() {
        let mut map: SkipMap<String, u32, _> = SkipMap::new(make_rng());
        for word in ["cb", "a8", "d9", "b1"] {
            map.put(word.to_string(), 0);
        }
        let keys: Vec<String> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["a8", "b1", "cb", "d9"]);
        map.audit();
    }
}
