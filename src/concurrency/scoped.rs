//! Scoped-thread helpers for running locale workers.
//!
//! Every locale in the engine is modeled as a set of OS threads spawned into
//! a single `std::thread::scope` region; this module centralizes that
//! pattern so callers (the work-queue pacing loop, the generators, the
//! termination detector's test harness) do not each re-derive it.

/// Runs `worker` once per thread in `0..thread_count`, inside a single scoped
/// region, and collects the per-thread results in thread-index order.
///
/// This is the standard fan-out used to bring up a locale's worker pool: each
/// closure receives its own thread-local index and a shared `&T` view of
/// whatever state the locale threads need to read concurrently.
pub fn run_workers<T, W, R>(thread_count: usize, shared: &T, worker: W) -> Vec<R>
where
    T: Sync,
    W: Fn(&T, usize) -> R + Sync,
    R: Send,
{
    assert!(thread_count > 0, "thread_count must be > 0");

    std::thread::scope(|scope| {
        let worker = &worker;
        let handles: Vec<_> = (0..thread_count)
            .map(|tid| scope.spawn(move || worker(shared, tid)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
}
