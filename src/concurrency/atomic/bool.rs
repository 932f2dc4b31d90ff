use core::sync::atomic::{AtomicBool, Ordering};

/// A thin wrapper around `AtomicBool` adding the `test_and_set` convenience
/// used throughout the spin-lock and flag-bit code.
#[repr(transparent)]
pub struct AtomicFlag {
    inner: AtomicBool,
}

impl AtomicFlag {
    /// Creates a new flag.
    #[inline(always)]
    pub const fn new(value: bool) -> Self {
        Self {
            inner: AtomicBool::new(value),
        }
    }

    /// Loads the current value.
    #[inline(always)]
    pub fn load(&self, order: Ordering) -> bool {
        self.inner.load(order)
    }

    /// Stores a new value.
    #[inline(always)]
    pub fn store(&self, value: bool, order: Ordering) {
        self.inner.store(value, order);
    }

    /// Swaps the current value, returning the previous value.
    #[inline(always)]
    pub fn swap(&self, value: bool, order: Ordering) -> bool {
        self.inner.swap(value, order)
    }

    /// Stores a value if the current value equals `current`.
    #[inline(always)]
    pub fn compare_exchange(
        &self,
        current: bool,
        new: bool,
        success: Ordering,
        failure: Ordering,
    ) -> Result<bool, bool> {
        self.inner.compare_exchange(current, new, success, failure)
    }

    /// Stores a value if the current value equals `current` (weak version).
    #[inline(always)]
    pub fn compare_exchange_weak(
        &self,
        current: bool,
        new: bool,
        success: Ordering,
        failure: Ordering,
    ) -> Result<bool, bool> {
        self.inner
            .compare_exchange_weak(current, new, success, failure)
    }

    /// Conditionally sets the value to `true` if it is currently `false`.
    ///
    /// Returns `true` if this call performed the transition.
    #[inline]
    pub fn test_and_set(&self, order: Ordering) -> bool {
        self.compare_exchange(false, true, order, Ordering::Relaxed)
            .is_ok()
    }

    /// Unconditionally sets the value to `true`, returning the previous value.
    #[inline]
    pub fn fetch_set(&self, order: Ordering) -> bool {
        self.swap(true, order)
    }
}

unsafe impl Send for AtomicFlag {}
unsafe impl Sync for AtomicFlag {}
