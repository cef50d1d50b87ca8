//! Side-table map variant: an ordered key set next to a hash map.
//!
//! Trades double key storage for value lookups that never touch the
//! level structure. Contracts match [`SkipMap`](crate::SkipMap) where
//! the two overlap.

use core::fmt;
use core::hash::Hash;

use rand_core::RngCore;
use rustc_hash::FxHashMap;

use crate::iter::{Elements, Keys};
use crate::node::Element;
use crate::set::SkipSet;

/// An ordered map storing values in a hash table beside the key set.
pub struct SkipHashMap<K, V, R>
where
    K: Ord + Hash + Clone,
{
    keys: SkipSet<K, R>,
    values: FxHashMap<K, V>,
}

impl<K, V, R> SkipHashMap<K, V, R>
where
    K: Ord + Hash + Clone,
    R: RngCore,
{
    /// Creates an empty map.
    pub fn new(rng: R) -> Self {
        Self {
            keys: SkipSet::new(rng),
            values: FxHashMap::default(),
        }
    }

    /// Number of entries, O(1).
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the map is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Highest populated level of the key set.
    #[inline]
    pub fn level(&self) -> Option<usize> {
        self.keys.level()
    }

    /// Inserts `key -> value`; `true` if the key was absent.
    pub fn put(&mut self, key: K, value: V) -> bool {
        if self.values.insert(key.clone(), value).is_some() {
            return false;
        }
        self.keys.add(key);
        true
    }

    /// The value for `key`, if present.
    #[inline]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.values.get(key)
    }

    /// Mutable access to the value for `key`, if present.
    #[inline]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.values.get_mut(key)
    }

    /// Removes `key` and returns its previous value.
    pub fn cut(&mut self, key: &K) -> Option<V> {
        let value = self.values.remove(key)?;
        self.keys.cut(key);
        Some(value)
    }

    /// First key element in order.
    #[inline]
    pub fn first(&self) -> Option<&Element<K, ()>> {
        self.keys.first()
    }

    /// The least key element not less than `key`.
    #[inline]
    pub fn successor(&self, key: &K) -> Option<&Element<K, ()>> {
        self.keys.successor(key)
    }

    /// Iterator over keys in ascending order.
    #[inline]
    pub fn keys(&self) -> Keys<'_, K, ()> {
        self.keys.iter()
    }

    /// Iterator over key elements starting at the successor of `key`.
    #[inline]
    pub fn successors(&self, key: &K) -> Elements<'_, K, ()> {
        self.keys.successors(key)
    }

    /// Moves every entry with key not less than `key` into a new map,
    /// values included.
    pub fn split(&mut self, key: &K) -> Self
    where
        R: Clone,
    {
        let keys = self.keys.split(key);
        let mut values = FxHashMap::default();
        for el in keys.elements() {
            if let Some(value) = self.values.remove(el.key()) {
                values.insert(el.key().clone(), value);
            }
        }
        Self { keys, values }
    }
}

impl<K, V, R> fmt::Display for SkipHashMap<K, V, R>
where
    K: Ord + Hash + Clone + fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.keys.fmt_dump(f, "SkipHashMap")
    }
}
