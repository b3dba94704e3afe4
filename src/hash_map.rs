//! HashMap: the set engine plus a value buffer that follows every key.
//!
//! `values[i]` is `Some` exactly when bucket `i` of the key table is
//! occupied. Both buffers always have the same length. Growth allocates the
//! new value buffer and the new key buffer before anything moves, and every
//! relocation or backward shift of a key is mirrored on its value.

use crate::alloc::{Allocator, Global};
use crate::capability::{SizeOf, TableKey};
use crate::error::AllocError;
use crate::hash_set::{capacity_for, fits, HashSet};
use core::fmt;
use core::mem;
use core::ops::Index;
use log::{error, warn};

pub struct HashMap<K, V> {
    keys: HashSet<K>,
    values: Vec<Option<V>>,
}

fn empty_values<V, A: Allocator>(capacity: usize, alloc: &A) -> Result<Vec<Option<V>>, AllocError> {
    let mut values = Vec::new();
    if let Err(e) = alloc.reserve(&mut values, capacity) {
        error!("hash map: unable to allocate {} values: {}", capacity, e);
        return Err(e);
    }
    values.resize_with(capacity, || None);
    Ok(values)
}

impl<K: TableKey, V> HashMap<K, V> {
    /// Create an empty map with `capacity` buckets. Aborts on allocation
    /// failure, like `Vec::with_capacity`.
    pub fn new(capacity: usize) -> Self {
        let keys = HashSet::new(capacity);
        let mut values = Vec::with_capacity(keys.capacity());
        values.resize_with(keys.capacity(), || None);
        Self { keys, values }
    }

    pub fn try_new(capacity: usize) -> Result<Self, AllocError> {
        Self::try_new_in(capacity, &Global)
    }

    pub fn try_new_in<A: Allocator>(capacity: usize, alloc: &A) -> Result<Self, AllocError> {
        let keys = HashSet::try_new_in(capacity, alloc)?;
        let values = empty_values(keys.capacity(), alloc)?;
        Ok(Self { keys, values })
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
        self.keys.capacity()
    }

    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>, AllocError> {
        self.put_in(key, value, &Global)
    }

    /// Associate `value` with `key`, returning the value it replaces.
    ///
    /// The table is grown first, even when the key is already present; on
    /// failure nothing changes. The sentinel key is never stored: passing it
    /// is a caller bug and `value` is handed straight back.
    pub fn put_in<A: Allocator>(&mut self, key: K, value: V, alloc: &A) -> Result<Option<V>, AllocError> {
        if key.is_empty() {
            if cfg!(debug_assertions) {
                warn!("hash map: put called with the empty sentinel");
            }
            return Ok(Some(value));
        }
        let new_size = self.len() + 1;
        self.check_size_in(new_size, alloc)?;
        Ok(self.insert_fitting(key, value))
    }

    /// Insert assuming the size check already made room.
    fn insert_fitting(&mut self, key: K, value: V) -> Option<V> {
        match self.keys.index_of(&key) {
            Ok(i) => self.values[i].replace(value),
            Err(i) => {
                self.keys.insert_at(i, key);
                self.values[i] = Some(value);
                None
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let i = self.keys.index_of(key).ok()?;
        self.values[i].as_ref()
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let i = self.keys.index_of(key).ok()?;
        self.values[i].as_mut()
    }

    /// Bucket of `key`: `Ok(i)` if present, else `Err(i)` with the empty
    /// bucket where the probe stopped.
    pub fn get_index(&self, key: &K) -> Result<usize, usize> {
        self.keys.index_of(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.keys.contains(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<(K, V)> {
        if key.is_empty() {
            if cfg!(debug_assertions) {
                warn!("hash map: remove called with the empty sentinel");
            }
            return None;
        }
        let i = self.keys.index_of(key).ok()?;
        self.remove_at(i)
    }

    /// Remove the entry in bucket `index`. `None` if the bucket is empty.
    ///
    /// # Panics
    /// If `index` is not below the capacity.
    pub fn remove_at(&mut self, index: usize) -> Option<(K, V)> {
        let value = self.values[index].take()?;
        self.keys
            .remove_at_with(index, self.values.as_mut_slice())
            .map(|key| (key, value))
    }

    pub fn resize(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        self.resize_in(new_capacity, &Global)
    }

    /// Rebuild both buffers with `new_capacity` buckets. Values land in the
    /// bucket chosen for their key. On failure the map is unchanged.
    pub fn resize_in<A: Allocator>(&mut self, new_capacity: usize, alloc: &A) -> Result<(), AllocError> {
        fits(new_capacity, self.len())?;
        let mut values = empty_values(new_capacity, alloc)?;
        let old = &mut self.values;
        self.keys
            .resize_with(new_capacity, alloc, |from, to| values[to] = old[from].take())?;
        self.values = values;
        Ok(())
    }

    pub fn check_size(&mut self, new_size: usize) -> Result<(), AllocError> {
        self.check_size_in(new_size, &Global)
    }

    /// Grow, if needed, so that `new_size` entries fit under the load factor.
    pub fn check_size_in<A: Allocator>(&mut self, new_size: usize, alloc: &A) -> Result<(), AllocError> {
        match self.keys.required_capacity(new_size)? {
            Some(capacity) => self.resize_in(capacity, alloc),
            None => Ok(()),
        }
    }

    /// Drop every entry; capacity is kept.
    pub fn clear(&mut self) {
        self.keys.clear();
        for v in &mut self.values {
            *v = None;
        }
    }

    /// Entries in bucket order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            keys: self.keys.slots().iter(),
            values: self.values.iter(),
            remaining: self.len(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            keys: self.keys.slots().iter(),
            values: self.values.iter_mut(),
            remaining: self.keys.len(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }
}

impl<K: TableKey + Clone, V: Clone> HashMap<K, V> {
    /// Map holding `pairs`, starting from `2 * pairs.len() + 1` buckets.
    /// Later pairs overwrite earlier ones with the same key.
    pub fn from_pairs(pairs: &[(K, V)]) -> Result<Self, AllocError> {
        let mut map = Self::try_new(2 * pairs.len() + 1)?;
        for (k, v) in pairs {
            map.put(k.clone(), v.clone())?;
        }
        Ok(map)
    }

    /// Copy every entry of `other` in, overwriting shared keys. One size
    /// check covers the whole batch.
    pub fn put_all(&mut self, other: &HashMap<K, V>) -> Result<(), AllocError> {
        let new_size = self
            .len()
            .checked_add(other.len())
            .ok_or(AllocError::CapacityOverflow)?;
        self.check_size(new_size)?;
        for (k, v) in other.iter() {
            self.insert_fitting(k.clone(), v.clone());
        }
        Ok(())
    }
}

impl<K: TableKey + Clone> HashMap<K, usize> {
    /// Map from each key to its position in `keys`. A repeated key keeps
    /// its last position.
    pub fn from_keys(keys: &[K]) -> Result<Self, AllocError> {
        let mut map = Self::try_new(2 * keys.len() + 1)?;
        for (i, k) in keys.iter().enumerate() {
            map.put(k.clone(), i)?;
        }
        Ok(map)
    }
}

impl<K: TableKey, V> FromIterator<(K, V)> for HashMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let pairs: Vec<(K, V)> = iter.into_iter().collect();
        let capacity = capacity_for(2 * pairs.len() + 1, pairs.len()).unwrap_or(usize::MAX);
        let mut map = Self::new(capacity);
        for (k, v) in pairs {
            if !k.is_empty() {
                map.insert_fitting(k, v);
            }
        }
        map
    }
}

impl<K: TableKey, V> Index<&K> for HashMap<K, V> {
    type Output = V;

    /// # Panics
    /// If `key` is not present.
    fn index(&self, key: &K) -> &V {
        match self.get(key) {
            Some(v) => v,
            None => panic!("key not found in hash map"),
        }
    }
}

/// Entries of a [`HashMap`], in bucket order.
pub struct Iter<'a, K, V> {
    keys: core::slice::Iter<'a, K>,
    values: core::slice::Iter<'a, Option<V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            let k = self.keys.next()?;
            if let Some(v) = self.values.next()? {
                self.remaining -= 1;
                return Some((k, v));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

pub struct IterMut<'a, K, V> {
    keys: core::slice::Iter<'a, K>,
    values: core::slice::IterMut<'a, Option<V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            let k = self.keys.next()?;
            if let Some(v) = self.values.next()? {
                self.remaining -= 1;
                return Some((k, v));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for IterMut<'a, K, V> {}

impl<'a, K: TableKey, V> IntoIterator for &'a HashMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: TableKey + Clone, V: Clone> Clone for HashMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            keys: self.keys.clone(),
            values: self.values.clone(),
        }
    }
}

/// Same key to value association; bucket layout and capacity are ignored.
impl<K: TableKey, V: PartialEq> PartialEq for HashMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: TableKey, V: Eq> Eq for HashMap<K, V> {}

impl<K: TableKey + fmt::Debug, V: fmt::Debug> fmt::Debug for HashMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: TableKey + SizeOf, V: SizeOf> SizeOf for HashMap<K, V> {
    fn size_of(&self) -> usize {
        let values: usize = self
            .values
            .iter()
            .map(|v| match v {
                Some(v) => v.size_of(),
                None => mem::size_of::<V>(),
            })
            .sum();
        self.keys.size_of() + values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::Budget;

    fn scenario_b() -> HashMap<i32, &'static str> {
        let mut m = HashMap::new(4);
        m.put(-7, "negative seven").unwrap();
        m.put(4, "four").unwrap();
        for (k, v) in [
            (4, "new four"),
            (5, "five"),
            (12, "twelve"),
            (7, "seven"),
            (13, "thirteen"),
        ] {
            m.put(k, v).unwrap();
        }
        m
    }

    #[test]
    fn resize_below_len_keeps_entries() {
        let mut m = scenario_b();
        let capacity = m.capacity();
        let len = m.len();
        let err = m.resize(len).unwrap_err();
        assert!(matches!(err, AllocError::CapacityTooSmall { len: 6, .. }));
        assert_eq!(m.capacity(), capacity);
        assert_eq!(m.get(&13), Some(&"thirteen"));
        assert_eq!(m.get(&-7), Some(&"negative seven"));
    }

    #[test]
    fn put_and_get() {
        let mut m: HashMap<i32, &str> = HashMap::new(4);
        assert_eq!(m.put(-7, "negative seven").unwrap(), None);
        assert_eq!(m.put(4, "four").unwrap(), None);
        assert_eq!(m.len(), 2);
        assert_eq!(m.get(&-7), Some(&"negative seven"));
        assert_eq!(m.get(&4), Some(&"four"));
    }

    /// Invariant: overwrite keeps the size, growth keeps every association.
    #[test]
    fn overwrite_and_grow() {
        let m = scenario_b();
        assert_eq!(m.len(), 6);
        assert_eq!(m.capacity(), 16);
        assert_eq!(m[&4], "new four");
        for (k, v) in [
            (-7, "negative seven"),
            (5, "five"),
            (12, "twelve"),
            (7, "seven"),
            (13, "thirteen"),
        ] {
            assert_eq!(m.get(&k), Some(&v));
        }
    }

    #[test]
    fn remove_keeps_others_reachable() {
        let mut m = scenario_b();
        assert_eq!(m.remove(&4), Some((4, "new four")));
        assert!(!m.contains_key(&4));
        assert_eq!(m.get(&12), Some(&"twelve"));
        assert_eq!(m.get(&13), Some(&"thirteen"));
        assert_eq!(m.get(&5), Some(&"five"));
        assert_eq!(m.get(&-7), Some(&"negative seven"));
        assert_eq!(m.get(&7), Some(&"seven"));
        assert_eq!(m.len(), 5);
        assert_eq!(m.remove(&4), None);
    }

    /// Invariant: values travel with their keys through backward shift.
    #[test]
    fn values_follow_keys_on_backward_shift() {
        let mut m: HashMap<u64, u64> = HashMap::new(64);
        for k in 1..=20u64 {
            m.put(k, k * 100).unwrap();
        }
        for k in (1..=20u64).step_by(3) {
            assert_eq!(m.remove(&k), Some((k, k * 100)));
        }
        for (k, v) in m.iter() {
            assert_eq!(*v, *k * 100);
        }
        for (i, slot) in m.keys.slots().iter().enumerate() {
            assert_eq!(TableKey::is_empty(slot), m.values[i].is_none());
        }
    }

    /// Invariant: a failed resize leaves size, capacity and every
    /// association unchanged.
    #[test]
    fn failed_growth_reverts() {
        let bucket = mem::size_of::<u32>() + mem::size_of::<Option<u32>>();
        let budget = Budget::new(4 * bucket);
        let mut m: HashMap<u32, u32> = HashMap::try_new_in(4, &budget).unwrap();
        m.put_in(1, 10, &budget).unwrap();
        assert!(m.put_in(2, 20, &budget).is_err());
        assert_eq!(m.len(), 1);
        assert_eq!(m.capacity(), 4);
        assert_eq!(m.get(&1), Some(&10));
        assert!(!m.contains_key(&2));

        // Overwrites go through the same size check.
        assert!(m.put_in(1, 11, &budget).is_err());
        assert_eq!(m.get(&1), Some(&10));
    }

    #[test]
    fn get_index_reports_bucket() {
        let mut m: HashMap<u32, char> = HashMap::new(8);
        m.put(3, 'c').unwrap();
        let i = m.get_index(&3).unwrap();
        assert_eq!(m.keys.slots()[i], 3);
        let miss = m.get_index(&4).unwrap_err();
        assert!(TableKey::is_empty(&m.keys.slots()[miss]));
        assert_eq!(m.remove_at(i), Some((3, 'c')));
        assert!(m.is_empty());
    }

    #[test]
    #[should_panic(expected = "key not found")]
    fn index_panics_on_missing_key() {
        let m: HashMap<u32, u32> = HashMap::new(4);
        let _v: &u32 = &m[&1];
    }

    #[test]
    fn constructors() {
        let m = HashMap::from_pairs(&[(1u8, "a"), (2, "b"), (1, "c")]).unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m[&1], "c");

        let idx = HashMap::from_keys(&[Some("x"), Some("y")]).unwrap();
        assert_eq!(idx.get(&Some("y")), Some(&1));

        let c: HashMap<u32, u32> = (1..=5).map(|k| (k, k * k)).collect();
        assert_eq!(c[&4], 16);
        assert!(c.len() < c.capacity() / 2);
    }

    #[test]
    fn put_all_clear_and_equality() {
        let mut a: HashMap<u32, String> = HashMap::new(4);
        a.put(1, "one".to_string()).unwrap();
        let mut b: HashMap<u32, String> = HashMap::new(32);
        b.put(2, "two".to_string()).unwrap();
        b.put_all(&a).unwrap();
        assert_eq!(b.len(), 2);

        let mut c = a.clone();
        c.put(2, "two".to_string()).unwrap();
        assert_eq!(b, c);
        assert_ne!(a, b);

        b.clear();
        assert!(b.is_empty());
        assert_eq!(b.capacity(), 32);
        assert_eq!(b.iter().count(), 0);
    }

    #[test]
    fn iter_mut_updates_in_place() {
        let mut m: HashMap<u32, u32> = (1..=4).map(|k| (k, 0)).collect();
        for (k, v) in m.iter_mut() {
            *v = *k + 1;
        }
        let mut pairs: Vec<(u32, u32)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        pairs.sort();
        assert_eq!(pairs, [(1, 2), (2, 3), (3, 4), (4, 5)]);
        assert_eq!(m.keys().count(), 4);
        assert_eq!(m.values().sum::<u32>(), 14);
    }

    #[test]
    fn debug_prints_map() {
        let mut m: HashMap<u8, &str> = HashMap::new(4);
        m.put(1, "x").unwrap();
        assert_eq!(format!("{:?}", m), "{1: \"x\"}");
    }

    #[test]
    fn sentinel_key_is_handed_back() {
        let mut m: HashMap<i32, &str> = HashMap::new(4);
        assert_eq!(m.put(0, "zero").unwrap(), Some("zero"));
        assert!(m.is_empty());
        assert_eq!(m.remove(&0), None);
    }
}
