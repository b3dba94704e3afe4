//! backshift: containers with explicit, fallible growth, built around an
//! open-addressing hash table with backward-shift deletion.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: give callers full control over when memory is obtained. Nothing
//!   grows behind the caller's back; every growth step is a `Result` and a
//!   failed step leaves the container exactly as it was.
//! - Layers:
//!   - `Array<T>`: contiguous buffer with a logical capacity that doubles on
//!     demand. The doubling rule (`grow_capacity`) is shared by every
//!     container.
//!   - `HashSet<K>`: the table engine. Linear probing from
//!     `hash(key) mod capacity`, a per-type empty sentinel instead of
//!     occupancy bits, and no tombstones.
//!   - `HashMap<K, V>`: a `HashSet<K>` plus a value buffer indexed by bucket,
//!     moved in lockstep with every key relocation and backward shift.
//!   - `ArrayMap<K, V>`: parallel key/value arrays with linear lookup, for
//!     small maps where hashing does not pay off.
//! - Around them: `sort` (hybrid quicksort / insertion sort, with a pair
//!   form that drags a second slice along), `sorted_set` (merge-based set
//!   algebra on sorted slices) and `codec` (the binary layout).
//!
//! Constraints
//! - Load factor: before every insertion the table grows until the
//!   prospective size is strictly below half the capacity. This runs even
//!   when the key turns out to be present already.
//! - Reachability: for every occupied bucket, no empty bucket lies on the
//!   forward path from the key's home bucket to it. Deletion restores this
//!   by shifting later members of the run back into the hole.
//! - Reversible growth: new buffers are allocated in full before any element
//!   moves. Resize relocates with a plain "next empty bucket" probe, which
//!   is only correct because keys in a table are always distinct.
//! - Key capabilities come from `TableKey`: the sentinel, the emptiness test,
//!   the hash. Integers and `char` use zero as the sentinel; `Option<T>` of
//!   byte-like `T` uses `None`. Built-in hashes are xxHash with seed 0.
//!
//! Ownership
//! - Containers own their elements. Dropping a container drops everything
//!   in it; copying is an explicit `Clone`.
//!
//! Reentrancy policy
//! - Tables carry a debug-only single-writer guard. Mutating entry points
//!   hold it for their whole duration and lookups check it, so a lookup or
//!   mutation that reaches a table from inside its own mutation (for
//!   example from a `TableKey::hash` impl through a raw pointer) panics in
//!   debug builds. In release builds the guard is zero-sized.
//! - There is no internal locking. Containers are `Send` and `Sync` when
//!   their elements are; the borrow checker provides "many readers or one
//!   writer".
//!
//! Allocation
//! - Growth goes through the `Allocator` trait. `Global` uses
//!   `Vec::try_reserve_exact`; `Budget` caps the bytes reserved through it
//!   and is how tests drive allocation failure deterministically.
//!
//! Notes and non-goals
//! - Precondition violations (querying the sentinel, a zero initial
//!   capacity) are reported with `log::warn!` in debug builds only.
//! - Association-list removal swaps the last entry into the hole and so
//!   breaks insertion order; hash-table removal keeps probe order. Callers
//!   that depend on order should use `ArrayMap` without removing.
//! - No incremental resize and no iterator invalidation tracking beyond the
//!   borrow rules.

pub mod alloc;
pub mod array;
pub mod array_map;
pub mod capability;
pub mod codec;
pub mod error;
pub mod hash_map;
pub mod hash_set;
mod hash_set_proptest;
mod lockstep;
mod reentrancy;
pub mod sort;
pub mod sorted_set;

// Public surface
pub use crate::alloc::{Allocator, Budget, Global};
pub use array::{grow_capacity, Array, RESIZE_FACTOR};
pub use array_map::ArrayMap;
pub use capability::{default_hash, ByteKey, SizeOf, TableKey, HASH_SEED};
pub use codec::{Decode, Encode};
pub use error::{AllocError, CodecError};
pub use hash_map::HashMap;
pub use hash_set::{index_between, HashSet};
pub use reentrancy::{DebugReentrancy, ReentrancyGuard};
pub use sorted_set::Scan;
