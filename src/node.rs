//! Skip-list node layout.
//!
//! Every element carries its key, its value, and a finger array of
//! forward links whose length is the element's rank. `fingers[i]` is the
//! next element at level `i`, or `None` past the tail. The containers own
//! one head sentinel per list: a rank-[`L`](crate::L) element whose key
//! and value cells are never initialized, which is why both cells are
//! `MaybeUninit`. Every element reachable through the public API is
//! initialized.

use core::fmt;
use core::mem::MaybeUninit;
use core::ptr::NonNull;

/// A forward pointer at one level, `None` past the tail.
pub(crate) type Link<K, V> = Option<NonNull<Element<K, V>>>;

/// A node of a skip-list container.
///
/// Elements are handed out by reference from container operations
/// ([`SkipSet::add`](crate::SkipSet::add),
/// [`SkipSet::successor`](crate::SkipSet::successor), …) and stay valid
/// while the container is borrowed. Walk the bottom level with
/// [`next`](Element::next):
///
/// ```
/// use rand::{rngs::SmallRng, SeedableRng};
/// use strata::SkipSet;
///
/// let mut set: SkipSet<u32, _> = SkipSet::new(SmallRng::seed_from_u64(12345));
/// set.add(10);
/// set.add(20);
///
/// let mut el = set.first();
/// while let Some(e) = el {
///     println!("{}", e.key());
///     el = e.next();
/// }
/// ```
pub struct Element<K, V> {
    key: MaybeUninit<K>,
    value: MaybeUninit<V>,
    fingers: Box<[Link<K, V>]>,
}

// Safety: an Element owns its key and value; its links are only
// dereferenced through the owning container, which hands out references
// bound to its own borrow.
unsafe impl<K: Send, V: Send> Send for Element<K, V> {}
unsafe impl<K: Sync, V: Sync> Sync for Element<K, V> {}

impl<K, V> Element<K, V> {
    /// Allocates an uninitialized element with `rank` finger cells.
    pub(crate) fn slot(rank: usize) -> Box<Self> {
        Box::new(Self {
            key: MaybeUninit::uninit(),
            value: MaybeUninit::uninit(),
            fingers: vec![None; rank].into_boxed_slice(),
        })
    }

    /// The element's key.
    #[inline]
    pub fn key(&self) -> &K {
        // Safety: every element reachable through the public API has an
        // initialized key; the head sentinel is never handed out.
        unsafe { self.key.assume_init_ref() }
    }

    /// The element's value.
    #[inline]
    pub fn value(&self) -> &V {
        // Safety: as for `key`.
        unsafe { self.value.assume_init_ref() }
    }

    /// Rank of the element: how many levels it participates in.
    #[inline]
    pub fn rank(&self) -> usize {
        self.fingers.len()
    }

    /// The next element on the bottom level, `None` at the tail.
    #[inline]
    pub fn next(&self) -> Option<&Element<K, V>> {
        // Safety: linked elements are live while the container is
        // borrowed, and the returned reference extends that borrow.
        self.fingers[0].map(|p| unsafe { &*p.as_ptr() })
    }

    /// The next element on `level`, `None` if the element does not
    /// participate at that level or no element follows there.
    #[inline]
    pub fn next_on(&self, level: usize) -> Option<&Element<K, V>> {
        if level >= self.fingers.len() {
            return None;
        }
        // Safety: as for `next`.
        self.fingers[level].map(|p| unsafe { &*p.as_ptr() })
    }

    // ========================================================================
    // Engine-side cell access
    // ========================================================================

    #[inline]
    pub(crate) fn finger(&self, level: usize) -> Link<K, V> {
        self.fingers[level]
    }

    #[inline]
    pub(crate) fn fingers(&self) -> &[Link<K, V>] {
        &self.fingers
    }

    #[inline]
    pub(crate) fn set_finger(&mut self, level: usize, link: Link<K, V>) {
        self.fingers[level] = link;
    }

    /// Initializes the key and value cells of a fresh slot.
    #[inline]
    pub(crate) fn write(&mut self, key: K, value: V) {
        self.key.write(key);
        self.value.write(value);
    }

    /// Swaps the value of an initialized element, returning the old one.
    #[inline]
    pub(crate) fn replace_value(&mut self, value: V) -> V {
        // Safety: only called on linked (initialized) elements.
        unsafe { core::mem::replace(self.value.assume_init_mut(), value) }
    }

    #[inline]
    pub(crate) fn value_mut(&mut self) -> &mut V {
        // Safety: only called on linked (initialized) elements.
        unsafe { self.value.assume_init_mut() }
    }

    /// Moves the key and value out, leaving the cells uninitialized.
    ///
    /// # Safety
    ///
    /// The element must be initialized and must not be read again.
    #[inline]
    pub(crate) unsafe fn take(&mut self) -> (K, V) {
        (self.key.assume_init_read(), self.value.assume_init_read())
    }
}

impl<K: fmt::Display, V> fmt::Display for Element<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_row(f, Some(self.key()), &self.fingers)
    }
}

/// An unlinked element slot exchanged between the engine and an
/// [`Allocator`](crate::Allocator).
///
/// The key and value cells inside are uninitialized: the engine fills
/// them before linking a slot and empties them before handing one back,
/// so a slot may be cached and reissued freely. Only the finger-cell
/// count is observable.
pub struct Slot<K, V>(pub(crate) Box<Element<K, V>>);

impl<K, V> Slot<K, V> {
    /// Allocates a slot with `rank` finger cells.
    pub fn new(rank: usize) -> Self {
        Slot(Element::slot(rank))
    }

    /// Number of finger cells.
    #[inline]
    pub fn rank(&self) -> usize {
        self.0.rank()
    }
}

/// One dump row: the key (or `_` for the head sentinel) followed by the
/// keys of the finger targets, `_` for null fingers.
pub(crate) fn fmt_row<K: fmt::Display, V>(
    f: &mut fmt::Formatter<'_>,
    key: Option<&K>,
    fingers: &[Link<K, V>],
) -> fmt::Result {
    match key {
        Some(key) => write!(f, "{{ {key:>4} |")?,
        None => write!(f, "{{ {:>4} |", '_')?,
    }
    for finger in fingers {
        match finger {
            // Safety: finger targets are live elements of the container
            // being formatted.
            Some(p) => write!(f, " {}", unsafe { &*p.as_ptr() }.key())?,
            None => write!(f, " _")?,
        }
    }
    write!(f, " }}")
}
