//! Per-task RNG stream provisioning.
//!
//! Every generator worker owns a private `SmallRng`, seeded deterministically
//! from the engine's `rng_base_seed` and the worker's `(locale, task)`
//! coordinates, so a run is reproducible without any cross-task
//! synchronization on the RNG state itself.

use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Derives the seed for locale `loc_id`, task `tid` out of `max_task_par`
/// tasks per locale.
pub fn task_seed(base_seed: u64, loc_id: usize, tid: usize, max_task_par: usize) -> u64 {
    let lane = (loc_id as u64) * (max_task_par as u64) + tid as u64;
    base_seed ^ lane.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Builds the `SmallRng` for locale `loc_id`, task `tid`.
pub fn task_rng(base_seed: u64, loc_id: usize, tid: usize, max_task_par: usize) -> SmallRng {
    SmallRng::seed_from_u64(task_seed(base_seed, loc_id, tid, max_task_par))
}
