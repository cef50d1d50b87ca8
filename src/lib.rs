//! Ordered-key containers built on a probabilistic skip list.
//!
//! A skip list keeps its keys sorted in a linked bottom level, with
//! sparser express lanes stacked above it; a node's height is drawn at
//! random on insertion, so lookups, inserts, and removals run in
//! O(log n) expected time without any rebalancing.
//!
//! ```text
//! Level 3:  HEAD ─────────────────────► 50 ──────────────────► NIL
//!             │                          │
//! Level 2:  HEAD ────────► 20 ──────────► 50 ──────────────────► NIL
//!             │            │              │
//! Level 1:  HEAD ──► 10 ──► 20 ──► 30 ──► 50 ──► 60 ──► NIL
//! ```
//!
//! Three containers share one engine:
//!
//! - [`SkipSet`] — an ordered set of keys.
//! - [`SkipMap`] — an ordered key-value map (values live in the nodes);
//!   [`SkipHashMap`] is the side-table variant with the same contracts.
//! - [`Gf2`] — a recursive bisection index over an unsigned domain,
//!   layered on a set of arc bounds.
//!
//! Beyond point operations, the engine supports ordered walks from any
//! successor ([`SkipSet::successors`]), O(L) suffix splitting
//! ([`SkipSet::split`]), and per-level segment excision
//! ([`SkipSet::cut_on`]). Range deletion composes from splits: split at
//! `a`, split the tail at `b`, drop the middle.
//!
//! Containers are single-threaded values: every operation takes `&self`
//! or `&mut self`, iterators borrow the container, and concurrent use
//! means wrapping the container in an external lock.
//!
//! # Example
//!
//! ```
//! use rand::{rngs::SmallRng, SeedableRng};
//! use strata::SkipSet;
//!
//! let mut set: SkipSet<u32, _> = SkipSet::new(SmallRng::seed_from_u64(12345));
//! for key in [0x67, 0xaa, 0x21, 0x7c] {
//!     set.add(key);
//! }
//!
//! let keys: Vec<u32> = set.iter().copied().collect();
//! assert_eq!(keys, vec![0x21, 0x67, 0x7c, 0xaa]);
//!
//! let tail = set.split(&0x7c);
//! assert_eq!(set.len(), 2);
//! assert_eq!(tail.len(), 2);
//! ```

#![warn(missing_docs)]

mod alloc;
mod field;
mod hashmap;
mod iter;
mod level;
mod list;
mod map;
mod node;
mod ordering;
mod set;

pub use alloc::{Allocator, Heap};
pub use field::{Arc, Bisect, Gf2};
pub use hashmap::SkipHashMap;
pub use iter::{Elements, Entries, Keys, LevelElements, Range};
pub use level::L;
pub use list::Drain;
pub use map::SkipMap;
pub use node::{Element, Slot};
pub use ordering::{By, Comparator, Natural, Total};
pub use set::SkipSet;
