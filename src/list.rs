//! The skip-list engine shared by every container.
//!
//! One generic core holds the head sentinel, the length, the level
//! oracle, and the comparator; [`SkipSet`](crate::SkipSet) instantiates
//! it at `V = ()`, [`SkipMap`](crate::SkipMap) with its value type, and
//! the GF2 field goes through the set. All pointer surgery lives here:
//! the path-recording `skip` walk, insertion, unlinking, the O(L) split,
//! and the per-level segment excision.

use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;
use core::ptr::NonNull;

use rand_core::RngCore;

use crate::alloc::Allocator;
use crate::level::{random_rank, L};
use crate::node::{fmt_row, Element, Link, Slot};
use crate::ordering::Comparator;

// ============================================================================
// SkipList
// ============================================================================

/// The engine: a singly-linked skip list with a head sentinel.
///
/// Mutating walks record the rightmost predecessor per level into a
/// stack-allocated path of `L` entries; re-linking happens through that
/// path. The head sentinel always owns `L` finger cells, which removes
/// the empty-list branch from every level loop.
pub(crate) struct SkipList<K, V, C, R, A>
where
    A: Allocator<K, V>,
{
    /// Head sentinel; its key and value cells stay uninitialized.
    head: NonNull<Element<K, V>>,
    /// Number of linked elements, maintained O(1).
    len: usize,
    /// Random source for rank draws.
    rng: R,
    /// Rank distribution; `table[i]` = chance of reaching rank `i + 1`.
    table: [f64; L],
    cmp: C,
    alloc: A,
    _own: PhantomData<Box<Element<K, V>>>,
}

// Safety: the engine exclusively owns the head and every reachable
// element; shared references only read.
unsafe impl<K, V, C, R, A> Send for SkipList<K, V, C, R, A>
where
    K: Send,
    V: Send,
    C: Send,
    R: Send,
    A: Send + Allocator<K, V>,
{
}
unsafe impl<K, V, C, R, A> Sync for SkipList<K, V, C, R, A>
where
    K: Sync,
    V: Sync,
    C: Sync,
    R: Sync,
    A: Sync + Allocator<K, V>,
{
}

impl<K, V, C, R, A> SkipList<K, V, C, R, A>
where
    C: Comparator<K>,
    A: Allocator<K, V>,
{
    pub(crate) fn new(rng: R, cmp: C, alloc: A, table: [f64; L]) -> Self {
        Self {
            head: NonNull::from(Box::leak(Element::slot(L))),
            len: 0,
            rng,
            table,
            cmp,
            alloc,
            _own: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Highest populated level, `None` when the list is empty.
    pub(crate) fn level(&self) -> Option<usize> {
        // Safety: the head is live for the lifetime of the engine.
        let head = unsafe { self.head.as_ref() };
        (0..L).take_while(|&i| head.finger(i).is_some()).last()
    }

    /// First element on the bottom level.
    #[inline]
    pub(crate) fn first(&self) -> Option<&Element<K, V>> {
        // Safety: linked elements are live while `self` is borrowed.
        unsafe { self.head.as_ref().finger(0).map(|p| &*p.as_ptr()) }
    }

    /// First element on `level`.
    #[inline]
    pub(crate) fn first_on(&self, level: usize) -> Option<&Element<K, V>> {
        assert!(level < L, "level out of range");
        // Safety: as for `first`.
        unsafe { self.head.as_ref().finger(level).map(|p| &*p.as_ptr()) }
    }

    // ========================================================================
    // Walks
    // ========================================================================

    /// Top-down walk from level `L - 1` down to `from_level`, advancing
    /// while the next key is strictly less than `key` and recording the
    /// rightmost predecessor per level.
    ///
    /// Returns the candidate at `from_level` (the least element with key
    /// not less than `key`, if any) and the path; `path[i]` is where a
    /// mutation at level `i` must re-link.
    fn skip(&self, from_level: usize, key: &K) -> (Link<K, V>, [NonNull<Element<K, V>>; L]) {
        let mut path = [self.head; L];
        let mut node = self.head;
        // Safety: every link reachable from the head targets a live
        // element; traversal only reads.
        unsafe {
            for level in (from_level..L).rev() {
                while let Some(next) = node.as_ref().finger(level) {
                    if self.cmp.compare(next.as_ref().key(), key) != Ordering::Less {
                        break;
                    }
                    node = next;
                }
                path[level] = node;
            }
            (node.as_ref().finger(from_level), path)
        }
    }

    /// Read-only walk; like `skip` without recording the path.
    fn search(&self, key: &K) -> Link<K, V> {
        let mut node = self.head;
        // Safety: as for `skip`.
        unsafe {
            for level in (0..L).rev() {
                while let Some(next) = node.as_ref().finger(level) {
                    if self.cmp.compare(next.as_ref().key(), key) != Ordering::Less {
                        break;
                    }
                    node = next;
                }
            }
            node.as_ref().finger(0)
        }
    }

    // ========================================================================
    // Point operations
    // ========================================================================

    /// The element with an equal key, if present.
    pub(crate) fn get(&self, key: &K) -> Option<&Element<K, V>> {
        let el = self.search(key)?;
        // Safety: candidate is a live linked element.
        let hit = unsafe { self.cmp.compare(el.as_ref().key(), key) == Ordering::Equal };
        hit.then(|| unsafe { &*el.as_ptr() })
    }

    /// Mutable access to the value of the element with an equal key.
    pub(crate) fn get_value_mut(&mut self, key: &K) -> Option<&mut V> {
        let el = self.search(key)?;
        // Safety: candidate is live; `&mut self` guarantees exclusivity.
        let hit = unsafe { self.cmp.compare(el.as_ref().key(), key) == Ordering::Equal };
        hit.then(|| unsafe { (*el.as_ptr()).value_mut() })
    }

    /// The least element with key not less than `key`.
    #[inline]
    pub(crate) fn successor(&self, key: &K) -> Option<&Element<K, V>> {
        // Safety: candidate is a live linked element.
        self.search(key).map(|p| unsafe { &*p.as_ptr() })
    }

    /// Both neighbours of `key` in one walk: the greatest element below
    /// it and the least element at or above it.
    pub(crate) fn neighbours(&self, key: &K) -> (Option<&Element<K, V>>, Option<&Element<K, V>>) {
        let (candidate, path) = self.skip(0, key);
        let pred = (path[0] != self.head)
            // Safety: path entries other than the head are live elements.
            .then(|| unsafe { &*path[0].as_ptr() });
        // Safety: as above.
        let succ = candidate.map(|p| unsafe { &*p.as_ptr() });
        (pred, succ)
    }

    /// Unlinks the element with an equal key and returns its key and
    /// value.
    pub(crate) fn remove(&mut self, key: &K) -> Option<(K, V)> {
        let (candidate, path) = self.skip(0, key);
        let target = candidate?;

        // Safety: candidate and path entries are live; after the splice
        // below nothing links to `target` any more.
        unsafe {
            if self.cmp.compare(target.as_ref().key(), key) != Ordering::Equal {
                return None;
            }

            let rank = target.as_ref().rank();
            for level in 0..L {
                let prev = path[level].as_ptr();
                if (*prev).finger(level) == Some(target) {
                    let onward = if level < rank {
                        target.as_ref().finger(level)
                    } else {
                        None
                    };
                    (*prev).set_finger(level, onward);
                }
            }

            self.len -= 1;
            Some(self.release(target))
        }
    }
}

impl<K, V, C, R, A> SkipList<K, V, C, R, A>
where
    C: Comparator<K>,
    R: RngCore,
    A: Allocator<K, V>,
{
    /// Inserts `key` if absent; overwrites the value otherwise.
    ///
    /// Returns whether a new element was linked, and the element.
    #[inline]
    pub(crate) fn upsert(&mut self, key: K, value: V) -> (bool, NonNull<Element<K, V>>) {
        self.upsert_capped(L, key, value)
    }

    /// `upsert` with the rank draw capped at `max_rank` fingers.
    pub(crate) fn upsert_capped(
        &mut self,
        max_rank: usize,
        key: K,
        value: V,
    ) -> (bool, NonNull<Element<K, V>>) {
        assert!((1..=L).contains(&max_rank), "rank cap out of range");

        let (candidate, path) = self.skip(0, &key);
        if let Some(mut el) = candidate {
            // Safety: candidate is a live linked element.
            unsafe {
                if self.cmp.compare(el.as_ref().key(), &key) == Ordering::Equal {
                    el.as_mut().replace_value(value);
                    return (false, el);
                }
            }
        }

        let rank = random_rank(&mut self.rng, &self.table, max_rank);
        let slot = self.alloc.alloc(&key, rank);
        debug_assert_eq!(slot.rank(), rank, "allocator returned a mis-sized slot");
        let mut slot = slot.0;
        slot.write(key, value);
        let el = NonNull::from(Box::leak(slot));

        // Re-bind fingers through the recorded path.
        for level in 0..rank {
            // Safety: `el` is fresh and unaliased; path entries are live.
            unsafe {
                let prev = path[level].as_ptr();
                (*el.as_ptr()).set_finger(level, (*prev).finger(level));
                (*prev).set_finger(level, Some(el));
            }
        }

        self.len += 1;
        (true, el)
    }
}

impl<K, V, C, R, A> SkipList<K, V, C, R, A>
where
    C: Comparator<K>,
    A: Allocator<K, V>,
{
    // ========================================================================
    // Bulk operations
    // ========================================================================

    /// Moves every element with key not less than `key` into a new list.
    ///
    /// Severs `path[i].fingers[i]` at every level in one pass, then wires
    /// the candidate successor into a fresh head at level 0. Higher
    /// levels of the new head stay null and re-form through subsequent
    /// inserts. Always returns a list, empty when nothing is at or above
    /// `key`.
    pub(crate) fn split(&mut self, key: &K) -> Self
    where
        C: Clone,
        R: Clone,
        A: Clone,
    {
        let (candidate, path) = self.skip(0, key);

        // Safety: path entries are live; their level-i fingers either
        // cross the cut or are already null.
        for (level, prev) in path.iter().enumerate() {
            unsafe { (*prev.as_ptr()).set_finger(level, None) };
        }

        let mut tail = Self::new(
            self.rng.clone(),
            self.cmp.clone(),
            self.alloc.clone(),
            self.table,
        );
        // Safety: the tail head is fresh and unaliased.
        unsafe { tail.head.as_mut().set_finger(0, candidate) };

        let mut moved = 0;
        let mut cur = candidate;
        while let Some(p) = cur {
            moved += 1;
            // Safety: the moved chain stays internally linked.
            cur = unsafe { p.as_ref().finger(0) };
        }
        tail.len = moved;
        self.len -= moved;
        tail
    }

    /// Excises the run `(from, from.fingers[level]]` in one pass.
    ///
    /// `from` must name an existing element with rank above `level`;
    /// otherwise nothing is excised. When the level finger is null the
    /// run extends to the end of the list. Every source-side finger that
    /// crosses into the run — from `from` itself or from the skip path
    /// above `from`'s rank — is re-pointed past the last excised element
    /// (or nulled). The excised elements come back as a [`Drain`] over
    /// their still-linked bottom-level chain.
    pub(crate) fn cut_on(&mut self, level: usize, from: &K) -> Drain<'_, K, V, A> {
        assert!(level < L, "level out of range");

        let (candidate, path) = self.skip(0, from);
        let from_el = match candidate {
            Some(el)
                // Safety: candidate is a live linked element.
                if unsafe { self.cmp.compare(el.as_ref().key(), from) == Ordering::Equal } =>
            {
                el
            }
            _ => return Drain { next: None, alloc: &mut self.alloc },
        };

        // Safety: all pointer surgery below touches live elements; the
        // excised chain is detached before the Drain hands it out.
        unsafe {
            let from_rank = from_el.as_ref().rank();
            if from_rank <= level {
                return Drain { next: None, alloc: &mut self.alloc };
            }

            let first = from_el.as_ref().finger(0);
            match from_el.as_ref().finger(level) {
                Some(to) => {
                    let to_rank = to.as_ref().rank();
                    for i in 0..L {
                        let owner = if i < from_rank { from_el } else { path[i] };
                        let Some(target) = (*owner.as_ptr()).finger(i) else {
                            continue;
                        };
                        // Inside the run iff its key is at most `to`'s.
                        if self
                            .cmp
                            .compare(target.as_ref().key(), to.as_ref().key())
                            != Ordering::Greater
                        {
                            let onward = if i < to_rank {
                                to.as_ref().finger(i)
                            } else {
                                None
                            };
                            (*owner.as_ptr()).set_finger(i, onward);
                        }
                    }
                    // Terminate the detached chain at its last element.
                    for i in 0..to_rank {
                        (*to.as_ptr()).set_finger(i, None);
                    }
                }
                None => {
                    // The run extends to the end of the list: every
                    // source-side finger past `from` crosses into it.
                    for i in 0..L {
                        let owner = if i < from_rank { from_el } else { path[i] };
                        (*owner.as_ptr()).set_finger(i, None);
                    }
                }
            }

            let mut excised = 0;
            let mut cur = first;
            while let Some(p) = cur {
                excised += 1;
                cur = p.as_ref().finger(0);
            }
            self.len -= excised;

            Drain {
                next: first,
                alloc: &mut self.alloc,
            }
        }
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Reclaims an unlinked element: moves its key and value out and
    /// hands the emptied slot to the allocator.
    ///
    /// # Safety
    ///
    /// `el` must be unlinked and not referenced anywhere.
    unsafe fn release(&mut self, el: NonNull<Element<K, V>>) -> (K, V) {
        let mut slot = Box::from_raw(el.as_ptr());
        let (key, value) = slot.take();
        self.alloc.free(&key, Slot(slot));
        (key, value)
    }

    /// Writes the multi-line dump: head row first, one row per element.
    pub(crate) fn fmt_dump(&self, f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result
    where
        K: fmt::Display,
    {
        writeln!(f, "--- {title} ---")?;
        // Safety: the head and the chain are live while `self` is
        // borrowed.
        unsafe {
            fmt_row(f, None::<&K>, self.head.as_ref().fingers())?;
            writeln!(f)?;
            let mut cur = self.head.as_ref().finger(0);
            while let Some(p) = cur {
                let el = &*p.as_ptr();
                writeln!(f, "{el}")?;
                cur = el.finger(0);
            }
        }
        Ok(())
    }

    /// Verifies the structural invariants: strict per-level order, level
    /// containment, and length accuracy.
    #[cfg(test)]
    pub(crate) fn audit(&self) {
        unsafe {
            let head = self.head.as_ref();
            let mut count = 0usize;
            let mut prev: Link<K, V> = None;
            let mut cur = head.finger(0);
            while let Some(p) = cur {
                let el = p.as_ref();
                assert!((1..=L).contains(&el.rank()));
                if let Some(pr) = prev {
                    assert_eq!(
                        self.cmp.compare(pr.as_ref().key(), el.key()),
                        Ordering::Less,
                        "level 0 out of order"
                    );
                }
                count += 1;
                prev = cur;
                cur = el.finger(0);
            }
            assert_eq!(count, self.len, "stored length drifted");

            for level in 1..L {
                let mut prev: Link<K, V> = None;
                let mut cur = head.finger(level);
                while let Some(p) = cur {
                    let el = p.as_ref();
                    assert!(el.rank() > level, "element linked above its rank");
                    if let Some(pr) = prev {
                        assert_eq!(
                            self.cmp.compare(pr.as_ref().key(), el.key()),
                            Ordering::Less,
                            "level {level} out of order"
                        );
                    }
                    prev = cur;
                    cur = el.finger(level);
                }
            }
        }
    }
}

impl<K, V, C, R, A> Drop for SkipList<K, V, C, R, A>
where
    A: Allocator<K, V>,
{
    fn drop(&mut self) {
        // Safety: the engine owns the whole chain; each element is
        // released exactly once, the head last (its cells were never
        // initialized, so only its allocation is reclaimed).
        unsafe {
            let mut cur = self.head.as_ref().finger(0);
            while let Some(p) = cur {
                cur = p.as_ref().finger(0);
                let mut slot = Box::from_raw(p.as_ptr());
                let (key, value) = slot.take();
                self.alloc.free(&key, Slot(slot));
                drop(key);
                drop(value);
            }
            drop(Box::from_raw(self.head.as_ptr()));
        }
    }
}

// ============================================================================
// Drain
// ============================================================================

/// An owning iterator over an excised run, produced by
/// [`SkipSet::cut_on`](crate::SkipSet::cut_on) and
/// [`SkipMap::cut_on`](crate::SkipMap::cut_on).
///
/// Yields the excised `(key, value)` pairs in key order, releasing each
/// slot through the container's allocator; elements not consumed are
/// released when the drain is dropped.
pub struct Drain<'a, K, V, A>
where
    A: Allocator<K, V>,
{
    next: Link<K, V>,
    alloc: &'a mut A,
}

impl<K, V, A> Iterator for Drain<'_, K, V, A>
where
    A: Allocator<K, V>,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let el = self.next?;
        // Safety: the drain exclusively owns the detached chain; each
        // element is consumed exactly once.
        unsafe {
            self.next = el.as_ref().finger(0);
            let mut slot = Box::from_raw(el.as_ptr());
            let pair = slot.take();
            self.alloc.free(&pair.0, Slot(slot));
            Some(pair)
        }
    }
}

impl<K, V, A> Drop for Drain<'_, K, V, A>
where
    A: Allocator<K, V>,
{
    fn drop(&mut self) {
        while self.next().is_some() {}
    }
}
