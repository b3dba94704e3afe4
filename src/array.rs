//! Array: contiguous, capacity-tracked sequence with geometric growth.
//!
//! The array keeps its own logical `capacity`, and the backing `Vec` always
//! has room for at least that many elements. Elements are only ever pushed
//! within that room, so the `Vec` never reallocates on its own: all growth
//! goes through [`Array::ensure_capacity_in`], which is fallible and leaves
//! the array untouched when it fails.

use crate::alloc::{Allocator, Global};
use crate::capability::SizeOf;
use crate::error::AllocError;
use core::fmt;
use core::mem;
use core::ops::{Deref, DerefMut};
use log::{error, warn};

/// Capacity multiplier applied on every growth step.
pub const RESIZE_FACTOR: usize = 2;

/// Smallest capacity reachable from `current` by repeated doubling that
/// holds `required` elements. A zero `current` is treated as one.
pub fn grow_capacity(current: usize, required: usize) -> Result<usize, AllocError> {
    let mut capacity = current.max(1);
    while capacity < required {
        capacity = capacity
            .checked_mul(RESIZE_FACTOR)
            .ok_or(AllocError::CapacityOverflow)?;
    }
    Ok(capacity)
}

pub struct Array<T> {
    data: Vec<T>,
    capacity: usize,
}

impl<T> Array<T> {
    /// Create an empty array with room for `initial_capacity` elements.
    /// Aborts on allocation failure, like `Vec::with_capacity`.
    pub fn new(initial_capacity: usize) -> Self {
        warn_zero_capacity(initial_capacity);
        Self {
            data: Vec::with_capacity(initial_capacity),
            capacity: initial_capacity,
        }
    }

    pub fn try_new(initial_capacity: usize) -> Result<Self, AllocError> {
        Self::try_new_in(initial_capacity, &Global)
    }

    pub fn try_new_in<A: Allocator>(initial_capacity: usize, alloc: &A) -> Result<Self, AllocError> {
        warn_zero_capacity(initial_capacity);
        let mut data = Vec::new();
        if let Err(e) = alloc.reserve(&mut data, initial_capacity) {
            error!("array: unable to allocate {} elements: {}", initial_capacity, e);
            return Err(e);
        }
        Ok(Self {
            data,
            capacity: initial_capacity,
        })
    }

    /// Take over a `Vec`; its current capacity becomes the array's capacity.
    pub fn from_vec(data: Vec<T>) -> Self {
        let capacity = data.capacity();
        Self { data, capacity }
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn ensure_capacity(&mut self, new_length: usize) -> Result<(), AllocError> {
        self.ensure_capacity_in(new_length, &Global)
    }

    /// Grow so that `new_length` elements fit, doubling the capacity as many
    /// times as needed. No-op when they already fit.
    ///
    /// On failure the contents, length and capacity are exactly as before.
    pub fn ensure_capacity_in<A: Allocator>(
        &mut self,
        new_length: usize,
        alloc: &A,
    ) -> Result<(), AllocError> {
        if new_length <= self.capacity {
            return Ok(());
        }
        let new_capacity = grow_capacity(self.capacity, new_length)?;
        if let Err(e) = alloc.reserve(&mut self.data, new_capacity) {
            error!("array: unable to grow to {} elements: {}", new_capacity, e);
            return Err(e);
        }
        debug_assert!(self.data.capacity() >= new_capacity);
        self.capacity = new_capacity;
        Ok(())
    }

    pub fn add(&mut self, element: T) -> Result<(), AllocError> {
        self.add_in(element, &Global)
    }

    pub fn add_in<A: Allocator>(&mut self, element: T, alloc: &A) -> Result<(), AllocError> {
        let new_length = self
            .len()
            .checked_add(1)
            .ok_or(AllocError::CapacityOverflow)?;
        self.ensure_capacity_in(new_length, alloc)?;
        self.data.push(element);
        Ok(())
    }

    /// Remove the element at `index` by moving the last element into its
    /// place. Order is not preserved.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> T {
        self.data.swap_remove(index)
    }

    pub fn pop(&mut self) -> Option<T> {
        self.data.pop()
    }

    /// Drop every element; capacity is kept.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn first(&self) -> Option<&T> {
        self.data.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.data.last()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> core::cmp::Ordering,
    {
        crate::sort::sort_by(&mut self.data, compare);
    }
}

impl<T: Clone> Array<T> {
    pub fn from_slice(elements: &[T]) -> Self {
        let mut a = Self::new(elements.len().max(1));
        a.data.extend_from_slice(elements);
        a
    }

    pub fn append(&mut self, elements: &[T]) -> Result<(), AllocError> {
        self.append_in(elements, &Global)
    }

    /// Copy `elements` onto the end, growing first. Nothing is appended if
    /// growth fails.
    pub fn append_in<A: Allocator>(&mut self, elements: &[T], alloc: &A) -> Result<(), AllocError> {
        let new_length = self
            .len()
            .checked_add(elements.len())
            .ok_or(AllocError::CapacityOverflow)?;
        self.ensure_capacity_in(new_length, alloc)?;
        self.data.extend_from_slice(elements);
        Ok(())
    }
}

impl<T: PartialEq> Array<T> {
    /// Position of the first element equal to `element` (linear scan).
    pub fn index_of(&self, element: &T) -> Option<usize> {
        self.data.iter().position(|e| e == element)
    }

    pub fn last_index_of(&self, element: &T) -> Option<usize> {
        self.data.iter().rposition(|e| e == element)
    }

    pub fn contains(&self, element: &T) -> bool {
        self.index_of(element).is_some()
    }

    /// Drop consecutive duplicates, keeping the first of each run.
    pub fn unique(&mut self) {
        self.data.dedup();
    }
}

impl<T: Ord> Array<T> {
    /// Hybrid quicksort / insertion sort in natural order.
    pub fn sort(&mut self) {
        crate::sort::sort(&mut self.data);
    }

    pub fn insertion_sort(&mut self) {
        crate::sort::insertion_sort(&mut self.data);
    }

    pub fn quick_sort(&mut self) {
        crate::sort::quick_sort(&mut self.data);
    }
}

#[inline]
fn warn_zero_capacity(initial_capacity: usize) {
    if cfg!(debug_assertions) && initial_capacity == 0 {
        warn!("array: initial capacity is zero");
    }
}

impl<T> Deref for Array<T> {
    type Target = [T];
    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T> DerefMut for Array<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: Clone> Clone for Array<T> {
    fn clone(&self) -> Self {
        let mut data = Vec::with_capacity(self.capacity);
        data.extend_from_slice(&self.data);
        Self {
            data,
            capacity: self.capacity,
        }
    }
}

impl<T: PartialEq> PartialEq for Array<T> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<T: Eq> Eq for Array<T> {}

impl<T: fmt::Debug> fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.data.iter()).finish()
    }
}

impl<T> FromIterator<T> for Array<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut data: Vec<T> = iter.into_iter().collect();
        if data.capacity() == 0 {
            data.reserve_exact(1);
        }
        Self::from_vec(data)
    }
}

impl<T> IntoIterator for Array<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;
    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Array<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<T: SizeOf> SizeOf for Array<T> {
    fn size_of(&self) -> usize {
        let header = 2 * mem::size_of::<usize>();
        let used: usize = self.data.iter().map(SizeOf::size_of).sum();
        header + used + (self.capacity - self.len()) * mem::size_of::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::Budget;

    #[test]
    fn grow_capacity_doubles_until_it_fits() {
        assert_eq!(grow_capacity(1, 11).unwrap(), 16);
        assert_eq!(grow_capacity(16, 38).unwrap(), 64);
        assert_eq!(grow_capacity(0, 1).unwrap(), 1);
        assert_eq!(grow_capacity(8, 8).unwrap(), 8);
        assert!(matches!(
            grow_capacity(usize::MAX / 2 + 1, usize::MAX),
            Err(AllocError::CapacityOverflow)
        ));
    }

    #[test]
    fn append_grows_geometrically() {
        let mut buf: Array<u8> = Array::new(1);
        buf.append(b"0123456789 ").unwrap();
        assert_eq!(buf.len(), 11);
        assert_eq!(buf.capacity(), 16);
        assert_eq!(buf.as_slice(), b"0123456789 ");

        buf.append(b"abcdefghijklmnopqrstuvwxyz ").unwrap();
        assert_eq!(buf.len(), 38);
        assert_eq!(buf.capacity(), 64);

        buf.append(b"9876543210 ").unwrap();
        assert_eq!(buf.len(), 49);
        assert_eq!(buf.capacity(), 64);
        assert_eq!(
            buf.as_slice(),
            b"0123456789 abcdefghijklmnopqrstuvwxyz 9876543210 "
        );
    }

    #[test]
    fn failed_growth_leaves_array_unchanged() {
        let budget = Budget::new(4);
        let mut a: Array<u32> = Array::try_new_in(1, &budget).unwrap();
        a.add_in(7, &budget).unwrap();
        assert_eq!(budget.remaining(), 0);

        let err = a.append_in(&[1, 2, 3], &budget).unwrap_err();
        assert!(matches!(err, AllocError::BudgetExhausted { .. }));
        assert_eq!(a.len(), 1);
        assert_eq!(a.capacity(), 1);
        assert_eq!(a.as_slice(), &[7]);

        assert!(a.add_in(8, &budget).is_err());
        assert_eq!(a.as_slice(), &[7]);
    }

    #[test]
    fn remove_swaps_last_into_hole() {
        let mut a = Array::from_slice(&[10, 20, 30, 40]);
        assert_eq!(a.remove(1), 20);
        assert_eq!(a.as_slice(), &[10, 40, 30]);
        assert_eq!(a.remove(2), 30);
        assert_eq!(a.as_slice(), &[10, 40]);
        assert_eq!(a.pop(), Some(40));
        assert_eq!(a.pop(), Some(10));
        assert_eq!(a.pop(), None);
    }

    #[test]
    fn search_and_unique() {
        let mut numbers: Array<i32> = Array::new(10);
        for x in [4, -6, 4, 2, 0, -6, 1, 4, 2] {
            numbers.add(x).unwrap();
        }
        assert_eq!(numbers.index_of(&4), Some(0));
        assert_eq!(numbers.last_index_of(&4), Some(7));
        assert!(!numbers.contains(&5));

        let mut copy = numbers.clone();
        numbers.insertion_sort();
        copy.quick_sort();
        assert_eq!(numbers.as_slice(), &[-6, -6, 0, 1, 2, 2, 4, 4, 4]);
        assert_eq!(numbers, copy);

        numbers.unique();
        assert_eq!(numbers.as_slice(), &[-6, 0, 1, 2, 4]);
    }

    #[test]
    fn clone_keeps_capacity() {
        let mut a: Array<u8> = Array::new(32);
        a.add(1).unwrap();
        let b = a.clone();
        assert_eq!(b.capacity(), 32);
        assert_eq!(b.as_slice(), &[1]);
    }

    #[test]
    fn size_of_counts_unused_capacity() {
        let mut a: Array<u32> = Array::new(4);
        a.add(1).unwrap();
        assert_eq!(a.size_of(), 2 * mem::size_of::<usize>() + 4 + 3 * 4);
    }

    #[test]
    fn debug_prints_bracketed_list() {
        let a = Array::from_slice(&[1, 2, 3]);
        assert_eq!(format!("{:?}", a), "[1, 2, 3]");
    }
}
