//! Set algebra over sorted, duplicate-free slices.
//!
//! Results are appended to an [`Array`]. The output is grown once, up front,
//! to the worst-case size, so a failed growth appends nothing.
//!
//! The scanning operations come in two flavours selected by [`Scan`]: a
//! lock-step merge, linear in both inputs, and a binary-search variant that
//! walks the shorter input and skips ahead in the longer one. The latter wins
//! when one side is much smaller than the other.

use crate::array::Array;
use crate::error::AllocError;
use core::cmp::Ordering;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Scan {
    #[default]
    Merge,
    BinarySearch,
}

/// Elements in `a` or `b`, each once.
pub fn union<T: Ord + Clone>(a: &[T], b: &[T], out: &mut Array<T>) -> Result<(), AllocError> {
    merge_into(a, b, out, false)
}

/// Merge of `a` and `b` keeping both copies of shared elements.
pub fn union_with_duplicates<T: Ord + Clone>(
    a: &[T],
    b: &[T],
    out: &mut Array<T>,
) -> Result<(), AllocError> {
    merge_into(a, b, out, true)
}

pub fn intersection<T: Ord + Clone>(a: &[T], b: &[T], out: &mut Array<T>) -> Result<(), AllocError> {
    intersection_with(a, b, out, Scan::Merge)
}

pub fn intersection_with<T: Ord + Clone>(
    a: &[T],
    b: &[T],
    out: &mut Array<T>,
    scan: Scan,
) -> Result<(), AllocError> {
    reserve(out, a.len().min(b.len()))?;
    for_each_common(a, b, scan, |x, _| push(out, x));
    Ok(())
}

/// Like [`intersection`], but every shared element is emitted twice: once
/// from `a`, then once from `b`.
pub fn intersection_with_duplicates<T: Ord + Clone>(
    a: &[T],
    b: &[T],
    out: &mut Array<T>,
) -> Result<(), AllocError> {
    reserve(out, 2 * a.len().min(b.len()))?;
    for_each_common(a, b, Scan::Merge, |x, y| {
        push(out, x);
        push(out, y);
    });
    Ok(())
}

/// Elements of `a` that are not in `b`.
pub fn subtract<T: Ord + Clone>(a: &[T], b: &[T], out: &mut Array<T>) -> Result<(), AllocError> {
    subtract_with(a, b, out, Scan::Merge)
}

pub fn subtract_with<T: Ord + Clone>(
    a: &[T],
    b: &[T],
    out: &mut Array<T>,
    scan: Scan,
) -> Result<(), AllocError> {
    reserve(out, a.len())?;
    match scan {
        Scan::Merge => {
            let (mut i, mut j) = (0, 0);
            while i < a.len() {
                if j == b.len() {
                    for x in &a[i..] {
                        push(out, x);
                    }
                    break;
                }
                match a[i].cmp(&b[j]) {
                    Ordering::Less => {
                        push(out, &a[i]);
                        i += 1;
                    }
                    Ordering::Greater => j += 1,
                    Ordering::Equal => {
                        i += 1;
                        j += 1;
                    }
                }
            }
        }
        Scan::BinarySearch => {
            let mut rest = b;
            for x in a {
                let (found, tail) = seek(rest, x);
                rest = tail;
                if !found {
                    push(out, x);
                }
            }
        }
    }
    Ok(())
}

/// Every element of `a` is in `b`.
pub fn is_subset<T: Ord>(a: &[T], b: &[T]) -> bool {
    is_subset_with(a, b, Scan::Merge)
}

pub fn is_subset_with<T: Ord>(a: &[T], b: &[T], scan: Scan) -> bool {
    if a.len() > b.len() {
        return false;
    }
    match scan {
        Scan::Merge => {
            let mut j = 0;
            for x in a {
                while j < b.len() && b[j] < *x {
                    j += 1;
                }
                if j == b.len() || b[j] != *x {
                    return false;
                }
                j += 1;
            }
            true
        }
        Scan::BinarySearch => {
            let mut rest = b;
            for x in a {
                let (found, tail) = seek(rest, x);
                if !found {
                    return false;
                }
                rest = tail;
            }
            true
        }
    }
}

pub fn is_disjoint<T: Ord>(a: &[T], b: &[T]) -> bool {
    is_disjoint_with(a, b, Scan::Merge)
}

pub fn is_disjoint_with<T: Ord>(a: &[T], b: &[T], scan: Scan) -> bool {
    let mut shared = false;
    for_each_common(a, b, scan, |_, _| shared = true);
    !shared
}

fn merge_into<T: Ord + Clone>(
    a: &[T],
    b: &[T],
    out: &mut Array<T>,
    keep_duplicates: bool,
) -> Result<(), AllocError> {
    reserve(out, a.len() + b.len())?;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => {
                push(out, &a[i]);
                i += 1;
            }
            Ordering::Greater => {
                push(out, &b[j]);
                j += 1;
            }
            Ordering::Equal => {
                push(out, &a[i]);
                if keep_duplicates {
                    push(out, &b[j]);
                }
                i += 1;
                j += 1;
            }
        }
    }
    for x in a[i..].iter().chain(&b[j..]) {
        push(out, x);
    }
    Ok(())
}

/// Call `f(x_from_a, x_from_b)` for every element present in both inputs,
/// in ascending order.
fn for_each_common<'a, T: Ord, F>(a: &'a [T], b: &'a [T], scan: Scan, mut f: F)
where
    F: FnMut(&'a T, &'a T),
{
    match scan {
        Scan::Merge => {
            let (mut i, mut j) = (0, 0);
            while i < a.len() && j < b.len() {
                match a[i].cmp(&b[j]) {
                    Ordering::Less => i += 1,
                    Ordering::Greater => j += 1,
                    Ordering::Equal => {
                        f(&a[i], &b[j]);
                        i += 1;
                        j += 1;
                    }
                }
            }
        }
        Scan::BinarySearch => {
            let a_is_shorter = a.len() <= b.len();
            let (short, long) = if a_is_shorter { (a, b) } else { (b, a) };
            let mut rest = long;
            for x in short {
                let start = rest.partition_point(|y| y < x);
                rest = &rest[start..];
                match rest.first() {
                    Some(y) if y == x => {
                        if a_is_shorter {
                            f(x, y);
                        } else {
                            f(y, x);
                        }
                        rest = &rest[1..];
                    }
                    Some(_) => {}
                    None => break,
                }
            }
        }
    }
}

/// Look for `x` in sorted `rest`. Returns whether it was found and the part
/// of `rest` after `x` (or after where it would be).
fn seek<'a, T: Ord>(rest: &'a [T], x: &T) -> (bool, &'a [T]) {
    let start = rest.partition_point(|y| y < x);
    let rest = &rest[start..];
    match rest.first() {
        Some(y) if y == x => (true, &rest[1..]),
        _ => (false, rest),
    }
}

#[inline]
fn reserve<T>(out: &mut Array<T>, extra: usize) -> Result<(), AllocError> {
    let needed = out
        .len()
        .checked_add(extra)
        .ok_or(AllocError::CapacityOverflow)?;
    out.ensure_capacity(needed)
}

// Room was reserved up front, so pushing never has to grow.
#[inline]
fn push<T: Clone>(out: &mut Array<T>, x: &T) {
    let pushed = out.add(x.clone());
    debug_assert!(pushed.is_ok());
}
