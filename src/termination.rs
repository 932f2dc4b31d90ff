//! Distributed termination detection.
//!
//! A pair of monotonically increasing counters: `started` is bumped before
//! a worker hands off derived work, `finished` is bumped after a handler
//! completes. The system is quiescent exactly when a single consistent
//! observation sees the two counters equal.

use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use crate::concurrency::atomic::AtomicCounter;

/// Distributed started/finished counters with a quiescence wait.
pub struct TerminationDetector {
    started: AtomicCounter,
    finished: AtomicCounter,
}

impl TerminationDetector {
    /// Creates a detector with both counters at zero.
    pub const fn new() -> Self {
        Self {
            started: AtomicCounter::new(0),
            finished: AtomicCounter::new(0),
        }
    }

    /// Records that `n` additional units of work have started.
    ///
    /// Callers must call this **before** enqueuing the derived work so the
    /// invariant `pending_work <= started - finished` always holds.
    #[inline]
    pub fn started(&self, n: usize) {
        self.started.fetch_add(n, Ordering::AcqRel);
    }

    /// Records that `n` units of work have finished.
    ///
    /// Callers must call this **after** their handler completes.
    #[inline]
    pub fn finished(&self, n: usize) {
        self.finished.fetch_add(n, Ordering::AcqRel);
    }

    /// A single consistent snapshot of `(started, finished)`.
    ///
    /// Reads `finished` first and `started` second: since `finished` can
    /// only ever catch up to a previously-observed `started`, reading in
    /// this order means `started >= finished` in the snapshot whenever the
    /// counters are used correctly, so a spurious "finished > started"
    /// never appears.
    #[inline]
    pub fn snapshot(&self) -> (usize, usize) {
        let finished = self.finished.load(Ordering::Acquire);
        let started = self.started.load(Ordering::Acquire);
        (started, finished)
    }

    /// Whether a single consistent observation saw `started == finished`.
    #[inline]
    pub fn has_terminated(&self) -> bool {
        let (started, finished) = self.snapshot();
        started == finished
    }

    /// Polls [`TerminationDetector::has_terminated`] with exponential
    /// backoff between `min_backoff` and `max_backoff`, returning once
    /// quiescence is observed.
    pub fn wait(&self, min_backoff: Duration, max_backoff: Duration) {
        let mut backoff = min_backoff.max(Duration::from_micros(1));
        loop {
            if self.has_terminated() {
                return;
            }
            std::thread::sleep(backoff);
            backoff = (backoff * 2).min(max_backoff);
        }
    }

    /// Like [`TerminationDetector::wait`], but gives up after `timeout` and
    /// returns whether termination was actually observed. Used by tests that
    /// want to assert quiescence is reached promptly rather than block
    /// forever on a bug.
    pub fn wait_timeout(
        &self,
        min_backoff: Duration,
        max_backoff: Duration,
        timeout: Duration,
    ) -> bool {
        let deadline = Instant::now() + timeout;
        let mut backoff = min_backoff.max(Duration::from_micros(1));
        loop {
            if self.has_terminated() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(backoff);
            backoff = (backoff * 2).min(max_backoff);
        }
    }
}

impl Default for TerminationDetector {
    fn default() -> Self {
        Self::new()
    }
}
