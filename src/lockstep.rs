//! Parallel buffers that follow their keys.
//!
//! Sorting key/value arrays and deleting from a map both move elements of a
//! second buffer whenever a key moves. Algorithms are written once against
//! [`Lockstep`]; `()` stands in when there is nothing to carry along.

pub(crate) trait Lockstep {
    fn swap(&mut self, a: usize, b: usize);
}

impl Lockstep for () {
    #[inline]
    fn swap(&mut self, _a: usize, _b: usize) {}
}

impl<V> Lockstep for [V] {
    #[inline]
    fn swap(&mut self, a: usize, b: usize) {
        <[V]>::swap(self, a, b);
    }
}
