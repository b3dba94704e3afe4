//! Pluggable buffer allocation.
//!
//! Every operation that can grow a buffer has an `_in` variant taking an
//! [`Allocator`]. The allocator only decides whether (and how) room for more
//! elements is obtained; it never touches the elements themselves, so a
//! refused request leaves the buffer untouched.

use crate::error::AllocError;
use core::cell::Cell;
use core::mem;

pub trait Allocator {
    /// Make room for at least `capacity` elements in `buf`.
    ///
    /// Must not change the contents or length of `buf`. On error `buf` is
    /// unchanged.
    fn reserve<T>(&self, buf: &mut Vec<T>, capacity: usize) -> Result<(), AllocError>;
}

/// The process allocator, through `Vec::try_reserve_exact`.
#[derive(Copy, Clone, Debug, Default)]
pub struct Global;

impl Allocator for Global {
    #[inline]
    fn reserve<T>(&self, buf: &mut Vec<T>, capacity: usize) -> Result<(), AllocError> {
        let additional = capacity.saturating_sub(buf.len());
        buf.try_reserve_exact(additional)?;
        Ok(())
    }
}

/// Caps the number of bytes that may be reserved through it.
///
/// Useful to bound a pool of containers, and to exercise allocation failure
/// deterministically. Only growth performed through this allocator is charged.
#[derive(Debug)]
pub struct Budget {
    remaining: Cell<usize>,
}

impl Budget {
    pub fn new(bytes: usize) -> Self {
        Self {
            remaining: Cell::new(bytes),
        }
    }

    pub fn remaining(&self) -> usize {
        self.remaining.get()
    }
}

impl Allocator for Budget {
    fn reserve<T>(&self, buf: &mut Vec<T>, capacity: usize) -> Result<(), AllocError> {
        if capacity <= buf.capacity() {
            return Ok(());
        }
        let requested = (capacity - buf.capacity())
            .checked_mul(mem::size_of::<T>())
            .ok_or(AllocError::CapacityOverflow)?;
        let remaining = self.remaining.get();
        if requested > remaining {
            return Err(AllocError::BudgetExhausted {
                requested,
                remaining,
            });
        }
        Global.reserve(buf, capacity)?;
        self.remaining.set(remaining - requested);
        Ok(())
    }
}
