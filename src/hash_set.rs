//! HashSet: open-addressing set with linear probing and backward-shift
//! deletion.
//!
//! Buckets are plain key slots. A slot holding the key type's sentinel
//! ([`TableKey::empty`]) is free; anything else is occupied. There are no
//! tombstones: removal shifts later members of the probe run back into the
//! hole so every surviving key stays reachable from its home bucket.
//!
//! Before every insertion the table grows so that the prospective size stays
//! strictly below half the capacity. Growth allocates the new bucket buffer
//! first and only then moves keys across, so an allocation failure leaves the
//! set exactly as it was.
//!
//! The same engine backs [`HashMap`](crate::HashMap), which carries a value
//! buffer along with every key move through the crate-private `_with`
//! entry points.

use crate::alloc::{Allocator, Global};
use crate::capability::{SizeOf, TableKey};
use crate::error::AllocError;
use crate::lockstep::Lockstep;
use crate::reentrancy::DebugReentrancy;
use core::fmt;
use core::mem;
use log::{debug, error, warn};

/// Whether `probe` lies in the cyclic interval `(start, end]`.
///
/// `start == end` is the empty interval.
#[inline]
pub fn index_between(probe: usize, start: usize, end: usize) -> bool {
    if end >= start {
        probe > start && probe <= end
    } else {
        probe <= end || probe > start
    }
}

/// A table of `capacity` buckets must keep at least one empty bucket after
/// holding `len` keys, or probing never terminates.
pub(crate) fn fits(capacity: usize, len: usize) -> Result<(), AllocError> {
    if capacity <= len {
        if cfg!(debug_assertions) {
            warn!("hash set: {} buckets cannot hold {} keys", capacity, len);
        }
        return Err(AllocError::CapacityTooSmall { capacity, len });
    }
    Ok(())
}

/// Smallest capacity, reached from `capacity` by doubling, at which
/// `new_size < capacity / 2` holds.
pub(crate) fn capacity_for(capacity: usize, new_size: usize) -> Result<usize, AllocError> {
    let mut capacity = capacity.max(1);
    while new_size >= capacity / 2 {
        capacity = capacity
            .checked_mul(crate::array::RESIZE_FACTOR)
            .ok_or(AllocError::CapacityOverflow)?;
    }
    Ok(capacity)
}

#[inline]
fn next(i: usize, capacity: usize) -> usize {
    if i + 1 == capacity {
        0
    } else {
        i + 1
    }
}

#[inline]
fn home<K: TableKey>(key: &K, capacity: usize) -> usize {
    (key.hash() % capacity as u64) as usize
}

fn empty_slots<K: TableKey, A: Allocator>(capacity: usize, alloc: &A) -> Result<Vec<K>, AllocError> {
    let mut slots = Vec::new();
    alloc.reserve(&mut slots, capacity)?;
    slots.resize_with(capacity, K::empty);
    Ok(slots)
}

fn clamp_capacity(capacity: usize) -> usize {
    if capacity == 0 {
        if cfg!(debug_assertions) {
            warn!("hash set: initial capacity is zero, using 1");
        }
        1
    } else {
        capacity
    }
}

#[inline]
fn warn_sentinel(op: &str) {
    if cfg!(debug_assertions) {
        warn!("hash set: {} called with the empty sentinel", op);
    }
}

/// Bucket storage and counters, without the writer guard so that guarded
/// entry points can call into it freely.
#[derive(Clone)]
struct Table<K> {
    slots: Vec<K>,
    len: usize,
}

impl<K: TableKey> Table<K> {
    #[inline]
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// `Ok(i)`: the key sits at `i`. `Err(i)`: the probe stopped at the empty
    /// slot `i`, which is where the key would be inserted.
    fn probe(&self, key: &K) -> Result<usize, usize> {
        let capacity = self.capacity();
        let start = home(key, capacity);
        let mut i = start;
        loop {
            let slot = &self.slots[i];
            if slot.is_empty() {
                return Err(i);
            }
            if slot == key {
                return Ok(i);
            }
            i = next(i, capacity);
            if i == start {
                // The load factor keeps at least one bucket free.
                if cfg!(debug_assertions) {
                    warn!("hash set: probed a full table");
                }
                return Err(start);
            }
        }
    }

    /// Move every key into a fresh buffer of `new_capacity` buckets, calling
    /// `moved(old, new)` for each relocation. Keys are assumed distinct, so
    /// each goes to the first empty bucket of its new probe run.
    fn relocate<A, F>(&mut self, new_capacity: usize, alloc: &A, mut moved: F) -> Result<(), AllocError>
    where
        A: Allocator,
        F: FnMut(usize, usize),
    {
        let mut slots = empty_slots::<K, A>(new_capacity, alloc)?;
        let mut relocated = 0;
        for (i, old) in self.slots.iter_mut().enumerate() {
            if old.is_empty() {
                continue;
            }
            let key = mem::replace(old, K::empty());
            let mut j = home(&key, new_capacity);
            while !slots[j].is_empty() {
                j = next(j, new_capacity);
            }
            slots[j] = key;
            moved(i, j);
            relocated += 1;
        }
        debug_assert_eq!(relocated, self.len, "resize lost or duplicated keys");
        self.slots = slots;
        Ok(())
    }

    /// Backward-shift deletion of the occupied bucket `i`.
    fn remove_at<C: Lockstep + ?Sized>(&mut self, i: usize, companion: &mut C) -> K {
        let capacity = self.capacity();
        let removed = mem::replace(&mut self.slots[i], K::empty());
        let mut last = i;
        let mut search = next(i, capacity);
        while !self.slots[search].is_empty() {
            let h = home(&self.slots[search], capacity);
            if !index_between(h, last, search) {
                // `last` is the hole; after the swap `search` is.
                self.slots.swap(last, search);
                companion.swap(last, search);
                last = search;
            }
            search = next(search, capacity);
        }
        self.len -= 1;
        removed
    }
}

/// Unordered set of [`TableKey`] values.
pub struct HashSet<K> {
    table: Table<K>,
    guard: DebugReentrancy,
}

impl<K: TableKey> HashSet<K> {
    /// Create an empty set with `capacity` buckets. Aborts on allocation
    /// failure, like `Vec::with_capacity`.
    pub fn new(capacity: usize) -> Self {
        let capacity = clamp_capacity(capacity);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, K::empty);
        Self {
            table: Table { slots, len: 0 },
            guard: DebugReentrancy::new(),
        }
    }

    pub fn try_new(capacity: usize) -> Result<Self, AllocError> {
        Self::try_new_in(capacity, &Global)
    }

    pub fn try_new_in<A: Allocator>(capacity: usize, alloc: &A) -> Result<Self, AllocError> {
        let capacity = clamp_capacity(capacity);
        let slots = empty_slots::<K, A>(capacity, alloc).map_err(|e| {
            error!("hash set: unable to allocate {} buckets: {}", capacity, e);
            e
        })?;
        Ok(Self {
            table: Table { slots, len: 0 },
            guard: DebugReentrancy::new(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.table.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Physical buckets, empty ones included.
    pub fn slots(&self) -> &[K] {
        self.guard.check();
        &self.table.slots
    }

    pub fn add(&mut self, key: K) -> Result<bool, AllocError> {
        self.add_in(key, &Global)
    }

    /// Insert `key`. Returns `true` when it was not already present.
    ///
    /// The table is grown first, even when the key turns out to be present.
    /// The sentinel is never stored; passing it is a caller bug.
    pub fn add_in<A: Allocator>(&mut self, key: K, alloc: &A) -> Result<bool, AllocError> {
        if key.is_empty() {
            warn_sentinel("add");
            return Ok(false);
        }
        let _g = self.guard.enter();
        let new_size = self.table.len + 1;
        Self::grow_table(&mut self.table, new_size, alloc, |_, _| {})?;
        match self.table.probe(&key) {
            Ok(_) => Ok(false),
            Err(i) => {
                self.table.slots[i] = key;
                self.table.len += 1;
                Ok(true)
            }
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index_of(key).is_ok()
    }

    /// `Ok(i)` when `key` is in bucket `i`, otherwise `Err(i)` with the empty
    /// bucket where the probe stopped.
    pub fn index_of(&self, key: &K) -> Result<usize, usize> {
        self.guard.check();
        if key.is_empty() {
            warn_sentinel("index_of");
        }
        self.table.probe(key)
    }

    /// The stored key equal to `key`.
    pub fn get(&self, key: &K) -> Option<&K> {
        match self.index_of(key) {
            Ok(i) => Some(&self.table.slots[i]),
            Err(_) => None,
        }
    }

    /// Remove `key`, returning the stored key if it was present.
    pub fn remove(&mut self, key: &K) -> Option<K> {
        if key.is_empty() {
            warn_sentinel("remove");
            return None;
        }
        let _g = self.guard.enter();
        match self.table.probe(key) {
            Ok(i) => Some(self.table.remove_at(i, &mut ())),
            Err(_) => None,
        }
    }

    /// Remove whatever key occupies bucket `index`. `None` if it is empty.
    ///
    /// # Panics
    /// If `index` is not below the capacity.
    pub fn remove_at(&mut self, index: usize) -> Option<K> {
        self.remove_at_with(index, &mut ())
    }

    pub fn resize(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        self.resize_in(new_capacity, &Global)
    }

    /// Rebuild the table with `new_capacity` buckets.
    ///
    /// `new_capacity` must leave at least one bucket free, otherwise
    /// `AllocError::CapacityTooSmall` is returned. On failure the set is
    /// unchanged.
    pub fn resize_in<A: Allocator>(&mut self, new_capacity: usize, alloc: &A) -> Result<(), AllocError> {
        self.resize_with(new_capacity, alloc, |_, _| {})
    }

    pub fn check_size(&mut self, new_size: usize) -> Result<(), AllocError> {
        self.check_size_in(new_size, &Global)
    }

    /// Grow, if needed, so that `new_size` keys fit under the load factor.
    pub fn check_size_in<A: Allocator>(&mut self, new_size: usize, alloc: &A) -> Result<(), AllocError> {
        let _g = self.guard.enter();
        Self::grow_table(&mut self.table, new_size, alloc, |_, _| {})
    }

    /// Empty every bucket; capacity is kept.
    pub fn clear(&mut self) {
        let _g = self.guard.enter();
        K::set_all_empty(&mut self.table.slots);
        self.table.len = 0;
    }

    /// Whether every key of `self` is in `other`.
    pub fn is_subset(&self, other: &HashSet<K>) -> bool {
        self.len() <= other.len() && self.iter().all(|k| other.contains(k))
    }

    /// Occupied keys in bucket order.
    pub fn iter(&self) -> Iter<'_, K> {
        self.guard.check();
        Iter {
            slots: self.table.slots.iter(),
            remaining: self.table.len,
        }
    }

    pub(crate) fn remove_at_with<C: Lockstep + ?Sized>(&mut self, index: usize, companion: &mut C) -> Option<K> {
        let _g = self.guard.enter();
        if self.table.slots[index].is_empty() {
            return None;
        }
        Some(self.table.remove_at(index, companion))
    }

    /// Store `key` in the empty bucket `index`, as returned by a failed
    /// [`HashSet::index_of`] after the size check.
    pub(crate) fn insert_at(&mut self, index: usize, key: K) {
        let _g = self.guard.enter();
        debug_assert!(self.table.slots[index].is_empty());
        self.table.slots[index] = key;
        self.table.len += 1;
    }

    /// Capacity the table must grow to before holding `new_size` keys, or
    /// `None` if it already can.
    pub(crate) fn required_capacity(&self, new_size: usize) -> Result<Option<usize>, AllocError> {
        let capacity = capacity_for(self.capacity(), new_size)?;
        Ok((capacity != self.capacity()).then_some(capacity))
    }

    pub(crate) fn resize_with<A, F>(&mut self, new_capacity: usize, alloc: &A, moved: F) -> Result<(), AllocError>
    where
        A: Allocator,
        F: FnMut(usize, usize),
    {
        let _g = self.guard.enter();
        Self::resize_table(&mut self.table, new_capacity, alloc, moved)
    }

    fn grow_table<A, F>(table: &mut Table<K>, new_size: usize, alloc: &A, moved: F) -> Result<(), AllocError>
    where
        A: Allocator,
        F: FnMut(usize, usize),
    {
        let capacity = capacity_for(table.capacity(), new_size)?;
        if capacity == table.capacity() {
            return Ok(());
        }
        Self::resize_table(table, capacity, alloc, moved)
    }

    fn resize_table<A, F>(table: &mut Table<K>, new_capacity: usize, alloc: &A, moved: F) -> Result<(), AllocError>
    where
        A: Allocator,
        F: FnMut(usize, usize),
    {
        fits(new_capacity, table.len)?;
        debug!(
            "hash set: resizing {} -> {} buckets ({} keys)",
            table.capacity(),
            new_capacity,
            table.len
        );
        table.relocate(new_capacity, alloc, moved).map_err(|e| {
            error!("hash set: unable to resize to {} buckets: {}", new_capacity, e);
            e
        })
    }
}

impl<K: TableKey + Clone> HashSet<K> {
    /// Set holding `keys`, starting from `2 * keys.len() + 1` buckets.
    pub fn from_slice(keys: &[K]) -> Result<Self, AllocError> {
        let mut set = Self::try_new(2 * keys.len() + 1)?;
        set.add_all_slice(keys)?;
        Ok(set)
    }

    pub fn add_all(&mut self, other: &HashSet<K>) -> Result<(), AllocError> {
        self.add_all_in(other.iter(), other.len(), &Global)
    }

    pub fn add_all_slice(&mut self, keys: &[K]) -> Result<(), AllocError> {
        self.add_all_in(keys.iter(), keys.len(), &Global)
    }

    /// One size check for the whole batch, then plain inserts.
    fn add_all_in<'a, I, A>(&mut self, keys: I, count: usize, alloc: &A) -> Result<(), AllocError>
    where
        I: Iterator<Item = &'a K>,
        K: 'a,
        A: Allocator,
    {
        let _g = self.guard.enter();
        let new_size = self
            .table
            .len
            .checked_add(count)
            .ok_or(AllocError::CapacityOverflow)?;
        Self::grow_table(&mut self.table, new_size, alloc, |_, _| {})?;
        for key in keys {
            if key.is_empty() {
                warn_sentinel("add_all");
                continue;
            }
            if let Err(i) = self.table.probe(key) {
                self.table.slots[i] = key.clone();
                self.table.len += 1;
            }
        }
        Ok(())
    }
}

impl<K: TableKey> FromIterator<K> for HashSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let keys: Vec<K> = iter.into_iter().collect();
        let capacity = capacity_for(2 * keys.len() + 1, keys.len()).unwrap_or(usize::MAX);
        let mut set = Self::new(capacity);
        for key in keys {
            if key.is_empty() {
                warn_sentinel("from_iter");
                continue;
            }
            if let Err(i) = set.table.probe(&key) {
                set.table.slots[i] = key;
                set.table.len += 1;
            }
        }
        set
    }
}

/// Occupied keys of a [`HashSet`], in bucket order.
pub struct Iter<'a, K> {
    slots: core::slice::Iter<'a, K>,
    remaining: usize,
}

impl<'a, K: TableKey> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.slots.find(|k| !k.is_empty())?;
        self.remaining -= 1;
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: TableKey> ExactSizeIterator for Iter<'a, K> {}

impl<'a, K: TableKey> IntoIterator for &'a HashSet<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;
    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

impl<K: TableKey + Clone> Clone for HashSet<K> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            guard: DebugReentrancy::new(),
        }
    }
}

/// Same size and every key of one is in the other.
impl<K: TableKey> PartialEq for HashSet<K> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.is_subset(other)
    }
}

impl<K: TableKey> Eq for HashSet<K> {}

impl<K: TableKey + fmt::Debug> fmt::Debug for HashSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: TableKey + SizeOf> SizeOf for HashSet<K> {
    fn size_of(&self) -> usize {
        let header = 2 * mem::size_of::<usize>();
        let buckets: usize = self
            .table
            .slots
            .iter()
            .map(|k| if k.is_empty() { mem::size_of::<K>() } else { k.size_of() })
            .sum();
        header + buckets
    }
}
