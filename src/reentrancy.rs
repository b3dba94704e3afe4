//! Debug-only single-writer guard.
//!
//! Tables hold one of these and take it for the duration of every mutating
//! call; lookups check it. A lookup or a second mutation that reaches the
//! same table while a mutation is in flight (only possible through unsafe
//! aliasing, e.g. from inside a `TableKey::hash` impl) panics in debug
//! builds. In release builds this compiles to a zero-sized no-op.

#[cfg(debug_assertions)]
use core::sync::atomic::{AtomicBool, Ordering};

/// Per-table writer tracker. Guard mutating entry points with
/// `let _g = self.guard.enter();` and lookups with `self.guard.check();`.
#[derive(Debug)]
pub struct DebugReentrancy {
    #[cfg(debug_assertions)]
    writing: AtomicBool,
}

impl DebugReentrancy {
    /// Const so it can be a field default.
    pub const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            writing: AtomicBool::new(false),
        }
    }

    /// Enter a mutating section. In debug builds, panics if one is already
    /// in progress.
    #[inline]
    pub fn enter(&self) -> ReentrancyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            let was_writing = self.writing.swap(true, Ordering::Acquire);
            assert!(
                !was_writing,
                "reentrancy detected: nested mutation of a table"
            );
            return ReentrancyGuard { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            return ReentrancyGuard {
                _z: core::marker::PhantomData,
            };
        }
    }

    /// Assert no mutation is in progress. No-op in release builds.
    #[inline]
    pub fn check(&self) {
        #[cfg(debug_assertions)]
        assert!(
            !self.writing.load(Ordering::Acquire),
            "reentrancy detected: table read during mutation"
        );
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

// A copy of a table starts with no writer.
impl Clone for DebugReentrancy {
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// RAII guard returned by `DebugReentrancy::enter`.
pub struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: core::marker::PhantomData<&'a ()>,
}

impl<'a> Drop for ReentrancyGuard<'a> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.writing.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::DebugReentrancy;

    #[test]
    fn enter_and_exit_is_ok() {
        let r = DebugReentrancy::new();
        {
            let _g = r.enter();
        }
        r.check();
        let _g = r.enter();
    }

    #[test]
    fn guard_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DebugReentrancy>();
    }

    #[cfg(debug_assertions)]
    #[test]
    fn nested_mutation_panics_in_debug() {
        let r = DebugReentrancy::new();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _g1 = r.enter();
            let _g2 = r.enter();
        }));
        assert!(res.is_err(), "expected nested entry to panic in debug builds");
    }

    #[cfg(debug_assertions)]
    #[test]
    fn read_during_mutation_panics_in_debug() {
        let r = DebugReentrancy::new();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _g = r.enter();
            r.check();
        }));
        assert!(res.is_err(), "expected read during mutation to panic");
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn reentrancy_noop_in_release() {
        let r = DebugReentrancy::new();
        let _g1 = r.enter();
        let _g2 = r.enter();
        r.check();
        let (_g1, _g2) = (_g1, _g2);
    }
}
