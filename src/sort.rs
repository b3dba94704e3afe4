//! Sorting: insertion sort, quicksort, and the hybrid of the two.
//!
//! Every algorithm comes in a plain form and a `_pairs` form that moves a
//! second slice in lockstep with the keys, so parallel key/value buffers can
//! be sorted by key without zipping them first.

use crate::lockstep::Lockstep;
use core::cmp::Ordering;
use log::debug;

/// Ranges of at most this many elements are finished with insertion sort.
pub const INSERTION_SORT_THRESHOLD: usize = 16;

pub fn insertion_sort<T: Ord>(keys: &mut [T]) {
    let n = keys.len();
    insertion_sort_range(keys, &mut (), 0, n, &mut |a: &T, b: &T| a < b);
}

pub fn insertion_sort_by<T, F>(keys: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let n = keys.len();
    let mut less = |a: &T, b: &T| compare(a, b) == Ordering::Less;
    insertion_sort_range(keys, &mut (), 0, n, &mut less);
}

pub fn quick_sort<T: Ord>(keys: &mut [T]) {
    if check_nonempty(keys.len()) {
        let n = keys.len();
        quick_sort_range(keys, &mut (), 0, n, 1, &mut |a: &T, b: &T| a < b);
    }
}

pub fn quick_sort_by<T, F>(keys: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    if check_nonempty(keys.len()) {
        let n = keys.len();
        let mut less = |a: &T, b: &T| compare(a, b) == Ordering::Less;
        quick_sort_range(keys, &mut (), 0, n, 1, &mut less);
    }
}

/// Hybrid quicksort / insertion sort in natural order.
pub fn sort<T: Ord>(keys: &mut [T]) {
    if check_nonempty(keys.len()) {
        let n = keys.len();
        quick_sort_range(keys, &mut (), 0, n, INSERTION_SORT_THRESHOLD, &mut |a: &T, b: &T| {
            a < b
        });
    }
}

pub fn sort_by<T, F>(keys: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    if check_nonempty(keys.len()) {
        let n = keys.len();
        let mut less = |a: &T, b: &T| compare(a, b) == Ordering::Less;
        quick_sort_range(keys, &mut (), 0, n, INSERTION_SORT_THRESHOLD, &mut less);
    }
}

/// Sort `keys`, applying every move to `values` as well.
///
/// # Panics
/// If the slices differ in length.
pub fn sort_pairs<K: Ord, V>(keys: &mut [K], values: &mut [V]) {
    assert_eq!(keys.len(), values.len(), "key and value lengths differ");
    if check_nonempty(keys.len()) {
        let n = keys.len();
        quick_sort_range(keys, values, 0, n, INSERTION_SORT_THRESHOLD, &mut |a: &K, b: &K| {
            a < b
        });
    }
}

pub fn sort_pairs_by<K, V, F>(keys: &mut [K], values: &mut [V], mut compare: F)
where
    F: FnMut(&K, &K) -> Ordering,
{
    assert_eq!(keys.len(), values.len(), "key and value lengths differ");
    if check_nonempty(keys.len()) {
        let n = keys.len();
        let mut less = |a: &K, b: &K| compare(a, b) == Ordering::Less;
        quick_sort_range(keys, values, 0, n, INSERTION_SORT_THRESHOLD, &mut less);
    }
}

pub fn insertion_sort_pairs<K: Ord, V>(keys: &mut [K], values: &mut [V]) {
    assert_eq!(keys.len(), values.len(), "key and value lengths differ");
    let n = keys.len();
    insertion_sort_range(keys, values, 0, n, &mut |a: &K, b: &K| a < b);
}

pub fn quick_sort_pairs<K: Ord, V>(keys: &mut [K], values: &mut [V]) {
    assert_eq!(keys.len(), values.len(), "key and value lengths differ");
    if check_nonempty(keys.len()) {
        let n = keys.len();
        quick_sort_range(keys, values, 0, n, 1, &mut |a: &K, b: &K| a < b);
    }
}

/// Drop consecutive duplicates, keeping the first of each run. On sorted
/// input this leaves every value once.
pub fn unique<T: PartialEq>(v: &mut Vec<T>) {
    v.dedup();
}

fn check_nonempty(len: usize) -> bool {
    if len == 0 && cfg!(debug_assertions) {
        debug!("sort: length is zero");
    }
    len != 0
}

fn insertion_sort_range<T, C, F>(keys: &mut [T], values: &mut C, lo: usize, hi: usize, less: &mut F)
where
    C: Lockstep + ?Sized,
    F: FnMut(&T, &T) -> bool,
{
    for i in (lo + 1)..hi {
        let mut hole = i;
        while hole > lo && less(&keys[hole], &keys[hole - 1]) {
            keys.swap(hole, hole - 1);
            values.swap(hole, hole - 1);
            hole -= 1;
        }
    }
}

/// Partition `[lo, hi)` (at least two elements) around its middle element.
/// Returns the pivot's final position: everything before it is not greater,
/// everything after it is not less.
fn partition<T, C, F>(keys: &mut [T], values: &mut C, lo: usize, hi: usize, less: &mut F) -> usize
where
    C: Lockstep + ?Sized,
    F: FnMut(&T, &T) -> bool,
{
    let mid = lo + (hi - lo) / 2;
    keys.swap(lo, mid);
    values.swap(lo, mid);

    let mut i = lo + 1;
    let mut j = hi - 1;
    loop {
        while i <= j && less(&keys[i], &keys[lo]) {
            i += 1;
        }
        while i <= j && less(&keys[lo], &keys[j]) {
            j -= 1;
        }
        if i >= j {
            break;
        }
        keys.swap(i, j);
        values.swap(i, j);
        i += 1;
        j -= 1;
    }
    keys.swap(lo, j);
    values.swap(lo, j);
    j
}

fn quick_sort_range<T, C, F>(
    keys: &mut [T],
    values: &mut C,
    mut lo: usize,
    mut hi: usize,
    threshold: usize,
    less: &mut F,
) where
    C: Lockstep + ?Sized,
    F: FnMut(&T, &T) -> bool,
{
    loop {
        if hi - lo <= threshold.max(1) {
            insertion_sort_range(keys, values, lo, hi, less);
            return;
        }
        let p = partition(keys, values, lo, hi, less);
        // recurse into the smaller side to bound stack depth
        if p - lo < hi - p {
            quick_sort_range(keys, values, lo, p, threshold, less);
            lo = p + 1;
        } else {
            quick_sort_range(keys, values, p + 1, hi, threshold, less);
            hi = p;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sorts_small_example() {
        let expected = [-6, -6, 0, 1, 2, 2, 4, 4, 4];
        let input = [4, -6, 4, 2, 0, -6, 1, 4, 2];

        let mut a = input;
        insertion_sort(&mut a);
        assert_eq!(a, expected);

        let mut b = input;
        quick_sort(&mut b);
        assert_eq!(b, expected);

        let mut c = input;
        sort(&mut c);
        assert_eq!(c, expected);
    }

    #[test]
    fn unique_after_sort_leaves_distinct_values() {
        let mut v = vec![3, 1, 3, 2, 1, 3];
        sort(&mut v);
        unique(&mut v);
        assert_eq!(v, [1, 2, 3]);
    }

    #[test]
    fn comparator_reverses_order() {
        let mut a: Vec<u32> = (0..100).collect();
        sort_by(&mut a, |x, y| y.cmp(x));
        assert_eq!(a, (0..100).rev().collect::<Vec<_>>());
    }

    #[test]
    fn empty_and_single_are_noops() {
        let mut empty: [i32; 0] = [];
        sort(&mut empty);
        quick_sort(&mut empty);
        insertion_sort(&mut empty);
        let mut one = [5];
        sort(&mut one);
        assert_eq!(one, [5]);
    }

    #[test]
    fn pairs_move_together() {
        let mut keys = [3, 1, 2];
        let mut values = ["three", "one", "two"];
        sort_pairs(&mut keys, &mut values);
        assert_eq!(keys, [1, 2, 3]);
        assert_eq!(values, ["one", "two", "three"]);
    }

    #[test]
    #[should_panic(expected = "key and value lengths differ")]
    fn pairs_require_equal_lengths() {
        let mut keys = [1, 2];
        let mut values = [1];
        sort_pairs(&mut keys, &mut values);
    }

    // Property: every sort variant agrees with `slice::sort`, and pair
    // variants keep each value attached to its key.
    proptest! {
        #[test]
        fn prop_matches_std_sort(input in proptest::collection::vec(-50i32..50, 0..200)) {
            let mut expected = input.clone();
            expected.sort();

            let mut a = input.clone();
            sort(&mut a);
            prop_assert_eq!(&a, &expected);

            let mut b = input.clone();
            quick_sort(&mut b);
            prop_assert_eq!(&b, &expected);

            let mut c = input.clone();
            insertion_sort(&mut c);
            prop_assert_eq!(&c, &expected);

            let mut d = input.clone();
            sort_by(&mut d, |x, y| x.cmp(y));
            prop_assert_eq!(&d, &expected);
        }

        #[test]
        fn prop_pairs_stay_attached(input in proptest::collection::vec(0u16..1000, 0..200)) {
            let mut keys = input.clone();
            let mut values: Vec<u32> = input.iter().map(|&k| u32::from(k) * 7 + 1).collect();
            sort_pairs(&mut keys, &mut values);

            let mut expected = input.clone();
            expected.sort();
            prop_assert_eq!(&keys, &expected);
            for (k, v) in keys.iter().zip(values.iter()) {
                prop_assert_eq!(*v, u32::from(*k) * 7 + 1);
            }

            let mut keys2 = input.clone();
            let mut values2: Vec<u32> = input.iter().map(|&k| u32::from(k) * 7 + 1).collect();
            quick_sort_pairs(&mut keys2, &mut values2);
            prop_assert_eq!(&keys2, &keys);
            prop_assert_eq!(&values2, &values);
        }
    }
}
