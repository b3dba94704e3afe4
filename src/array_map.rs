//! ArrayMap: small association list over parallel key and value arrays.
//!
//! Lookups are linear scans, which beats hashing for a handful of entries.
//! Insertion order is kept until something is removed: removal moves the
//! last entry into the hole. Growth follows the same doubling rule as
//! [`Array`](crate::Array) and reserves both arrays before the capacity is
//! committed, so a failed growth leaves the map as it was.

use crate::alloc::{Allocator, Global};
use crate::array::grow_capacity;
use crate::capability::SizeOf;
use crate::error::AllocError;
use core::fmt;
use core::mem;
use log::error;

pub struct ArrayMap<K, V> {
    keys: Vec<K>,
    values: Vec<V>,
    capacity: usize,
}

impl<K, V> ArrayMap<K, V> {
    /// Aborts on allocation failure, like `Vec::with_capacity`.
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(initial_capacity),
            values: Vec::with_capacity(initial_capacity),
            capacity: initial_capacity,
        }
    }

    pub fn try_new(initial_capacity: usize) -> Result<Self, AllocError> {
        Self::try_new_in(initial_capacity, &Global)
    }

    pub fn try_new_in<A: Allocator>(initial_capacity: usize, alloc: &A) -> Result<Self, AllocError> {
        let mut map = Self {
            keys: Vec::new(),
            values: Vec::new(),
            capacity: 0,
        };
        map.reserve_both(initial_capacity, alloc)?;
        map.capacity = initial_capacity;
        Ok(map)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ensure_capacity(&mut self, new_length: usize) -> Result<(), AllocError> {
        self.ensure_capacity_in(new_length, &Global)
    }

    /// Grow keys and values together so that `new_length` entries fit.
    pub fn ensure_capacity_in<A: Allocator>(&mut self, new_length: usize, alloc: &A) -> Result<(), AllocError> {
        if new_length <= self.capacity {
            return Ok(());
        }
        let new_capacity = grow_capacity(self.capacity, new_length)?;
        self.reserve_both(new_capacity, alloc)?;
        self.capacity = new_capacity;
        Ok(())
    }

    fn reserve_both<A: Allocator>(&mut self, capacity: usize, alloc: &A) -> Result<(), AllocError> {
        alloc
            .reserve(&mut self.keys, capacity)
            .and_then(|_| alloc.reserve(&mut self.values, capacity))
            .map_err(|e| {
                error!("array map: unable to grow to {} entries: {}", capacity, e);
                e
            })
    }

    /// Key at position `index`.
    pub fn key_at(&self, index: usize) -> Option<&K> {
        self.keys.get(index)
    }

    /// Value at position `index`.
    pub fn get_at(&self, index: usize) -> Option<&V> {
        self.values.get(index)
    }

    pub fn get_at_mut(&mut self, index: usize) -> Option<&mut V> {
        self.values.get_mut(index)
    }

    /// Remove the entry at `index`, moving the last entry into its place.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    pub fn remove_at(&mut self, index: usize) -> (K, V) {
        (self.keys.swap_remove(index), self.values.swap_remove(index))
    }

    /// Drop every entry; capacity is kept.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.values.clear();
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [V] {
        &mut self.values
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&K, &V)> + '_ {
        self.keys.iter().zip(self.values.iter())
    }

    pub fn iter_mut(&mut self) -> impl ExactSizeIterator<Item = (&K, &mut V)> + '_ {
        self.keys.iter().zip(self.values.iter_mut())
    }
}

impl<K: Eq, V> ArrayMap<K, V> {
    /// Position of `key`, scanning from the front.
    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.index_of_from(key, 0)
    }

    /// Position of `key`, scanning from `start`.
    pub fn index_of_from(&self, key: &K, start: usize) -> Option<usize> {
        self.keys
            .get(start..)?
            .iter()
            .position(|k| k == key)
            .map(|i| i + start)
    }

    pub fn last_index_of(&self, key: &K) -> Option<usize> {
        self.keys.iter().rposition(|k| k == key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.index_of(key).is_some()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.index_of(key).map(|i| &self.values[i])
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let i = self.index_of(key)?;
        Some(&mut self.values[i])
    }

    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>, AllocError> {
        self.put_in(key, value, &Global)
    }

    /// Overwrite the value of `key` if present, otherwise append the pair.
    /// Returns the replaced value.
    pub fn put_in<A: Allocator>(&mut self, key: K, value: V, alloc: &A) -> Result<Option<V>, AllocError> {
        if let Some(i) = self.index_of(&key) {
            return Ok(Some(mem::replace(&mut self.values[i], value)));
        }
        let new_length = self.len() + 1;
        self.ensure_capacity_in(new_length, alloc)?;
        self.keys.push(key);
        self.values.push(value);
        Ok(None)
    }

    pub fn remove(&mut self, key: &K) -> Option<(K, V)> {
        let i = self.index_of(key)?;
        Some(self.remove_at(i))
    }
}

impl<K: Ord, V> ArrayMap<K, V> {
    /// Sort entries by key, values moving with their keys.
    pub fn sort_by_key(&mut self) {
        crate::sort::sort_pairs(&mut self.keys, &mut self.values);
    }
}

impl<K: Clone, V: Clone> Clone for ArrayMap<K, V> {
    fn clone(&self) -> Self {
        let mut keys = Vec::with_capacity(self.capacity);
        keys.extend_from_slice(&self.keys);
        let mut values = Vec::with_capacity(self.capacity);
        values.extend_from_slice(&self.values);
        Self {
            keys,
            values,
            capacity: self.capacity,
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for ArrayMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys && self.values == other.values
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ArrayMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: SizeOf, V: SizeOf> SizeOf for ArrayMap<K, V> {
    fn size_of(&self) -> usize {
        let header = 2 * mem::size_of::<usize>();
        let used: usize = self.iter().map(|(k, v)| k.size_of() + v.size_of()).sum();
        let unused = (self.capacity - self.len()) * (mem::size_of::<K>() + mem::size_of::<V>());
        header + used + unused
    }
}
