//! A test-and-test-and-set spinlock.
//!
//! Every [`crate::node_data::NodeData`] owns one of these instead of a single
//! global lock: readers spin on a relaxed load before attempting the atomic
//! compare-exchange that actually acquires the lock, so an already-held lock
//! does not thrash the cache-coherence fabric with failed CAS traffic the way
//! a bare `compare_exchange`-only loop would.

use std::sync::atomic::Ordering;

use crate::concurrency::atomic::AtomicFlag;
use crate::config::{DEFAULT_SPIN_MAX, DEFAULT_SPIN_MIN};

/// A minimal, allocation-free mutual-exclusion lock for a single small
/// object (a vertex's or edge's neighbor list).
///
/// `Spinlock` never parks the calling thread; contention backs off by
/// spinning with a growing bound (from [`DEFAULT_SPIN_MIN`] up to
/// [`DEFAULT_SPIN_MAX`] tight-spin iterations) and yielding to the scheduler
/// once that bound is reached, rather than spinning forever.
pub struct Spinlock {
    locked: AtomicFlag,
}

impl Spinlock {
    /// Creates a new, unlocked spinlock.
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            locked: AtomicFlag::new(false),
        }
    }

    /// Blocks the calling thread until the lock is acquired.
    ///
    /// Fast path is a single compare-exchange. Under contention, falls back
    /// to a test-and-test-and-set loop: a relaxed read of the flag, bounded
    /// by a spin count that starts at [`DEFAULT_SPIN_MIN`] and doubles up to
    /// [`DEFAULT_SPIN_MIN`]'s ceiling [`DEFAULT_SPIN_MAX`]; once the bound is
    /// reached the thread cooperatively yields to the scheduler instead of
    /// continuing to spin.
    #[inline]
    pub fn lock(&self) {
        if self.try_lock() {
            return;
        }
        self.lock_contended();
    }

    #[cold]
    fn lock_contended(&self) {
        let mut bound = DEFAULT_SPIN_MIN;
        loop {
            let mut spins = 0u32;
            while self.locked.load(Ordering::Relaxed) && spins < bound {
                std::hint::spin_loop();
                spins += 1;
            }
            if self.try_lock() {
                return;
            }
            if bound < DEFAULT_SPIN_MAX {
                bound = bound.saturating_mul(2).min(DEFAULT_SPIN_MAX);
            } else {
                std::thread::yield_now();
            }
        }
    }

    /// Attempts to acquire the lock without blocking.
    ///
    /// Returns `true` if this call acquired the lock.
    #[inline]
    pub fn try_lock(&self) -> bool {
        self.locked.test_and_set(Ordering::Acquire)
    }

    /// Releases the lock.
    ///
    /// # Panics (debug only)
    /// Does not check that the caller actually holds the lock; misuse is a
    /// logic bug in the caller, not something this type can detect cheaply.
    #[inline]
    pub fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }

    /// Runs `f` while holding the lock, releasing it afterwards even if `f`
    /// panics.
    #[inline]
    pub fn with_lock<R>(&self, f: impl FnOnce() -> R) -> R {
        self.lock();
        struct Guard<'a>(&'a Spinlock);
        impl Drop for Guard<'_> {
            fn drop(&mut self) {
                self.0.unlock();
            }
        }
        let _guard = Guard(self);
        f()
    }
}

impl Default for Spinlock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn mutual_exclusion_under_contention() {
        let lock = Arc::new(Spinlock::new());
        let counter = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let lock = Arc::clone(&lock);
                let counter = Arc::clone(&counter);
                scope.spawn(move || {
                    for _ in 0..1000 {
                        lock.with_lock(|| {
                            counter.fetch_add(1, Ordering::Relaxed);
                        });
                    }
                });
            }
        });

        assert_eq!(counter.load(Ordering::Relaxed), 8000);
    }

    #[test]
    fn try_lock_fails_while_held() {
        let lock = Spinlock::new();
        assert!(lock.try_lock());
        assert!(!lock.try_lock());
        lock.unlock();
        assert!(lock.try_lock());
    }
}
