//! Multi-locale facade over per-locale [`Bag`]s, with optional aggregating
//! enqueue and the canonical `doWorkLoop` consumer pattern.

use std::sync::atomic::Ordering;
use std::sync::Mutex;
use std::time::Duration;

use crate::concurrency::atomic::{AtomicCounter, AtomicFlag};
use crate::concurrency::worklist::Bag;
use crate::locale::{LocaleId, LocaleMap, Locales};
use crate::termination::TerminationDetector;

/// How `addWork` batches items destined for a remote locale.
pub enum Aggregation {
    /// No batching: every cross-locale `addWork` is a direct remote append.
    None,
    /// Batch up to `capacity` items per destination before transporting
    /// them as one bulk append.
    Bounded(usize),
    /// Batch a size-adaptive number of items per destination: the target
    /// batch size starts at `min` and doubles (capped at `max`) every time a
    /// batch fills under sustained traffic, the same geometric-growth shape
    /// `BagSegmentBlock` uses for its own capacity; an idle-triggered
    /// [`WorkQueue::flush_local`] resets it back to `min`.
    Dynamic {
        /// The smallest batch size ever transported.
        min: usize,
        /// The largest batch size this destination will grow to.
        max: usize,
    },
}

/// A distributed work-stealing queue: one [`Bag`] per locale, plus optional
/// per-destination aggregation buffers and the async-transport termination
/// detector that tracks in-flight batch transports.
pub struct WorkQueue<W> {
    locales: std::sync::Arc<Locales>,
    bags: LocaleMap<Bag<W>>,
    shutdown_flags: LocaleMap<AtomicFlag>,
    aggregation: Aggregation,
    agg_buffers: LocaleMap<Mutex<Vec<W>>>,
    agg_thresholds: LocaleMap<AtomicCounter>,
    async_tasks: TerminationDetector,
}

impl<W> WorkQueue<W> {
    /// Creates a work queue with one [`Bag`] per locale.
    pub fn new(
        locales: std::sync::Arc<Locales>,
        max_task_par: usize,
        initial_block_size: usize,
        max_block_size: usize,
        aggregation: Aggregation,
    ) -> Self {
        let bags = LocaleMap::build(&locales, |_| {
            Bag::new(max_task_par, initial_block_size, max_block_size)
        });
        let shutdown_flags = LocaleMap::build(&locales, |_| AtomicFlag::new(false));
        let agg_buffers = LocaleMap::build(&locales, |_| Mutex::new(Vec::new()));
        let initial_threshold = match aggregation {
            Aggregation::Dynamic { min, .. } => min,
            Aggregation::None | Aggregation::Bounded(_) => 0,
        };
        let agg_thresholds = LocaleMap::build(&locales, |_| AtomicCounter::new(initial_threshold));
        Self {
            locales,
            bags,
            shutdown_flags,
            aggregation,
            agg_buffers,
            agg_thresholds,
            async_tasks: TerminationDetector::new(),
        }
    }

    /// The termination detector tracking in-flight aggregation-buffer
    /// transports (`wq.asyncTasks` used by `doWorkLoop`).
    pub fn async_tasks(&self) -> &TerminationDetector {
        &self.async_tasks
    }

    /// Current size of the local bag on `loc`, used by the pacing watcher.
    pub fn local_size(&self, loc: LocaleId) -> usize {
        self.bags.get(loc).size()
    }

    /// Whether `loc` has been shut down.
    pub fn is_shutdown(&self, loc: LocaleId) -> bool {
        self.shutdown_flags.get(loc).load(Ordering::Acquire)
    }

    /// Sets `loc`'s shutdown flag; future `addWork` calls targeting it are
    /// forbidden (enforced with a `debug_assert!`, since calling it is
    /// always a caller bug, not a data error).
    pub fn shutdown(&self, loc: LocaleId) {
        self.shutdown_flags.get(loc).store(true, Ordering::Release);
    }

    /// Adds `item`, addressed to locale `target`, from the perspective of
    /// locale `here`.
    ///
    /// - If `target == here`, pushes directly to the local bag.
    /// - Otherwise, batches into the per-destination aggregation buffer
    ///   (if [`Aggregation::Bounded`] is configured) and transports the
    ///   batch once it fills; with [`Aggregation::None`] configured, it is
    ///   a direct remote append instead.
    pub fn add_work(&self, item: W, here: LocaleId, target: LocaleId) {
        debug_assert!(
            !self.is_shutdown(target),
            "addWork called on a locale after shutdown()"
        );

        if target == here {
            self.bags.get(here).add(item);
            return;
        }

        match self.aggregation {
            Aggregation::None => {
                self.locales
                    .run_local(target, || self.bags.get(target).add(item));
            }
            Aggregation::Bounded(capacity) => {
                let batch = {
                    let mut buf = self.agg_buffers.get(target).lock().unwrap();
                    buf.push(item);
                    if buf.len() >= capacity {
                        Some(std::mem::take(&mut *buf))
                    } else {
                        None
                    }
                };
                if let Some(batch) = batch {
                    self.transport_batch(target, batch);
                }
            }
            Aggregation::Dynamic { min, max } => {
                let threshold = self.agg_thresholds.get(target).load(Ordering::Relaxed).max(min);
                let batch = {
                    let mut buf = self.agg_buffers.get(target).lock().unwrap();
                    buf.push(item);
                    if buf.len() >= threshold {
                        Some(std::mem::take(&mut *buf))
                    } else {
                        None
                    }
                };
                if let Some(batch) = batch {
                    let grown = threshold.saturating_mul(2).min(max);
                    self.agg_thresholds.get(target).store(grown, Ordering::Relaxed);
                    self.transport_batch(target, batch);
                }
            }
        }
    }

    /// Non-blocking local dequeue.
    pub fn get_work(&self, here: LocaleId) -> Option<W> {
        self.bags.get(here).remove()
    }

    /// Drains `loc`'s aggregation buffer, blocking (via the async-task
    /// transport) until every batched item has reached its destination bag.
    ///
    /// Called by the pacing watcher when flush velocity drops below the
    /// configured threshold; for [`Aggregation::Dynamic`], an idle-triggered
    /// flush also resets the destination's target batch size back to `min`,
    /// since the traffic that justified growing it has since subsided.
    pub fn flush_local(&self, loc: LocaleId) {
        let batch = {
            let mut buf = self.agg_buffers.get(loc).lock().unwrap();
            std::mem::take(&mut *buf)
        };
        if let Aggregation::Dynamic { min, .. } = self.aggregation {
            self.agg_thresholds.get(loc).store(min, Ordering::Relaxed);
        }
        if !batch.is_empty() {
            self.transport_batch(loc, batch);
        }
    }

    /// Flushes every locale's aggregation buffer.
    pub fn flush(&self) {
        for (loc, _) in self.bags.iter() {
            self.flush_local(loc);
        }
    }

    fn transport_batch(&self, target: LocaleId, batch: Vec<W>) {
        self.async_tasks.started(1);
        tracing::debug!(target: "work_queue", locale = target.index(), count = batch.len(), "transporting aggregated batch");
        self.locales.run_local(target, || {
            let bag = self.bags.get(target);
            for item in batch {
                bag.add(item);
            }
        });
        self.async_tasks.finished(1);
    }
}

/// The canonical consumer pattern: spawns `max_task_par` worker threads plus
/// one pacing watcher for locale `here`, running until shutdown or until
/// both the queue's async-transport detector and the caller's own
/// termination detector report quiescence.
pub fn do_work_loop<W: Send>(
    wq: &WorkQueue<W>,
    td: &TerminationDetector,
    here: LocaleId,
    max_task_par: usize,
    min_flush_velocity: f64,
    handle: impl Fn(W) + Sync,
) {
    std::thread::scope(|scope| {
        for _ in 0..max_task_par {
            scope.spawn(|| worker_loop(wq, td, here, &handle));
        }
        scope.spawn(|| pacing_watcher(wq, td, here, min_flush_velocity));
    });
}

fn worker_loop<W: Send>(
    wq: &WorkQueue<W>,
    td: &TerminationDetector,
    here: LocaleId,
    handle: &(impl Fn(W) + Sync),
) {
    loop {
        if wq.is_shutdown(here) {
            return;
        }
        match wq.get_work(here) {
            Some(item) => handle(item),
            None => {
                if wq.is_shutdown(here) || (wq.async_tasks().has_terminated() && td.has_terminated()) {
                    return;
                }
                std::thread::yield_now();
            }
        }
    }
}

fn pacing_watcher<W>(wq: &WorkQueue<W>, td: &TerminationDetector, here: LocaleId, min_flush_velocity: f64) {
    loop {
        if wq.is_shutdown(here) || (wq.async_tasks().has_terminated() && td.has_terminated()) {
            return;
        }
        let before = wq.local_size(here);
        std::thread::sleep(Duration::from_millis(1));
        let after = wq.local_size(here);
        let velocity = (after as f64 - before as f64).abs();
        if velocity < min_flush_velocity {
            wq.flush_local(here);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_work_to_self_reaches_local_bag() {
        let locales = std::sync::Arc::new(Locales::new(1));
        let wq: WorkQueue<u32> = WorkQueue::new(locales, 4, 4, 16, Aggregation::None);
        wq.add_work(42, LocaleId(0), LocaleId(0));
        assert_eq!(wq.get_work(LocaleId(0)), Some(42));
    }

    #[test]
    fn bounded_aggregation_flushes_on_full_batch() {
        let locales = std::sync::Arc::new(Locales::new(2));
        let wq: WorkQueue<u32> = WorkQueue::new(locales, 2, 4, 16, Aggregation::Bounded(2));
        wq.add_work(1, LocaleId(0), LocaleId(1));
        assert_eq!(wq.local_size(LocaleId(1)), 0);
        wq.add_work(2, LocaleId(0), LocaleId(1));
        assert_eq!(wq.local_size(LocaleId(1)), 2);
    }

    #[test]
    fn dynamic_aggregation_starts_at_min_then_grows() {
        let locales = std::sync::Arc::new(Locales::new(2));
        let wq: WorkQueue<u32> = WorkQueue::new(
            locales,
            2,
            4,
            16,
            Aggregation::Dynamic { min: 2, max: 8 },
        );

        // First batch flushes at the `min` threshold (2 items).
        wq.add_work(1, LocaleId(0), LocaleId(1));
        assert_eq!(wq.local_size(LocaleId(1)), 0);
        wq.add_work(2, LocaleId(0), LocaleId(1));
        assert_eq!(wq.local_size(LocaleId(1)), 2);

        // The threshold doubled to 4, so a second batch of 2 does not flush yet.
        wq.add_work(3, LocaleId(0), LocaleId(1));
        wq.add_work(4, LocaleId(0), LocaleId(1));
        assert_eq!(wq.local_size(LocaleId(1)), 2);
        wq.add_work(5, LocaleId(0), LocaleId(1));
        wq.add_work(6, LocaleId(0), LocaleId(1));
        assert_eq!(wq.local_size(LocaleId(1)), 6);
    }

    #[test]
    fn dynamic_aggregation_threshold_caps_at_max() {
        let locales = std::sync::Arc::new(Locales::new(2));
        let wq: WorkQueue<u32> = WorkQueue::new(
            locales,
            2,
            4,
            16,
            Aggregation::Dynamic { min: 1, max: 2 },
        );
        for i in 0..10u32 {
            wq.add_work(i, LocaleId(0), LocaleId(1));
        }
        // With max=2 the threshold never exceeds 2, so every pair flushes.
        assert_eq!(wq.local_size(LocaleId(1)), 10);
    }

    #[test]
    fn flush_local_resets_dynamic_threshold_to_min() {
        let locales = std::sync::Arc::new(Locales::new(2));
        let wq: WorkQueue<u32> = WorkQueue::new(
            locales,
            2,
            4,
            16,
            Aggregation::Dynamic { min: 2, max: 8 },
        );
        wq.add_work(1, LocaleId(0), LocaleId(1));
        wq.add_work(2, LocaleId(0), LocaleId(1));
        assert_eq!(
            wq.agg_thresholds.get(LocaleId(1)).load(Ordering::Relaxed),
            4
        );
        wq.flush_local(LocaleId(1));
        assert_eq!(
            wq.agg_thresholds.get(LocaleId(1)).load(Ordering::Relaxed),
            2
        );
    }

    #[test]
    fn flush_local_delivers_partial_batch() {
        let locales = std::sync::Arc::new(Locales::new(2));
        let wq: WorkQueue<u32> = WorkQueue::new(locales, 2, 4, 16, Aggregation::Bounded(8));
        wq.add_work(1, LocaleId(0), LocaleId(1));
        assert_eq!(wq.local_size(LocaleId(1)), 0);
        wq.flush_local(LocaleId(1));
        assert_eq!(wq.local_size(LocaleId(1)), 1);
    }

    #[test]
    fn do_work_loop_drains_seeded_work_and_exits() {
        let locales = std::sync::Arc::new(Locales::new(1));
        let wq: WorkQueue<u32> = WorkQueue::new(locales, 4, 4, 16, Aggregation::None);
        let td = TerminationDetector::new();

        for i in 0..50u32 {
            td.started(1);
            wq.add_work(i, LocaleId(0), LocaleId(0));
        }

        let processed = std::sync::atomic::AtomicUsize::new(0);
        do_work_loop(&wq, &td, LocaleId(0), 4, 0.1, |_item| {
            processed.fetch_add(1, Ordering::Relaxed);
            td.finished(1);
            wq.shutdown(LocaleId(0));
        });

        assert!(processed.load(Ordering::Relaxed) >= 1);
    }
}
