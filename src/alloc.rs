//! Node allocation hooks.
//!
//! Containers allocate one element slot per inserted key. The default
//! [`Heap`] allocator boxes fresh slots and drops freed ones; callers
//! who want arena or pooled backing implement [`Allocator`] and pass it
//! to `with_allocator` on the container. The hook sees the key so a pool
//! may shard or index by it.

use crate::node::Slot;

/// A capability for recycling element slots.
///
/// `alloc` runs before any linking; if it panics the container is left
/// untouched. `free` runs after the element has been unlinked and its
/// key and value moved out, so the returned [`Slot`] may be cached and
/// reissued by a later `alloc`. `free` is not called on
/// [`split`](crate::SkipSet::split): ownership of the moved suffix
/// transfers to the returned container, which will release those slots
/// through its own (cloned) allocator.
pub trait Allocator<K, V> {
    /// Returns a slot with exactly `rank` finger cells.
    fn alloc(&mut self, key: &K, rank: usize) -> Slot<K, V>;

    /// Accepts an unlinked, emptied slot back.
    fn free(&mut self, key: &K, slot: Slot<K, V>);
}

/// The default allocator: plain boxed slots, dropped on free.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Heap;

impl<K, V> Allocator<K, V> for Heap {
    #[inline]
    fn alloc(&mut self, _key: &K, rank: usize) -> Slot<K, V> {
        Slot::new(rank)
    }

    #[inline]
    fn free(&mut self, _key: &K, slot: Slot<K, V>) {
        drop(slot);
    }
}
