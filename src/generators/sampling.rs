//! Prefix-sum probability sampling (`getRandomElement`).

use crate::error::{EngineError, EngineResult};

/// Builds a normalized prefix-sum table `P[0..=n]` from `n` non-negative
/// weights, with `P[0] = 0` and `P[n] = 1` exactly.
pub fn normalized_prefix_sums(weights: &[f64]) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    let mut prefix = Vec::with_capacity(weights.len() + 1);
    prefix.push(0.0);
    let mut acc = 0.0;
    for &w in weights {
        acc += w;
        prefix.push(if total > 0.0 { acc / total } else { 0.0 });
    }
    if let Some(last) = prefix.last_mut() {
        *last = 1.0;
    }
    prefix
}

/// Given a prefix-sum table `P[0..=n]` and a uniform real `r` in
/// `[P[0], P[n]]`, returns the index of the value-domain element whose
/// bucket `[P[i], P[i+1])` contains `r`.
///
/// Implemented as exponential search for the smallest `i` with
/// `P[i] > r`, followed by a linear walk-back — `O(log n)` on average,
/// matching the generators' sampling contract.
pub fn get_random_element(prefix_sums: &[f64], r: f64) -> EngineResult<usize> {
    assert!(prefix_sums.len() >= 2, "prefix_sums must cover at least one element");
    let last = prefix_sums.len() - 1;
    let lo = prefix_sums[0];
    let hi = prefix_sums[last];

    if r < lo || r > hi {
        return Err(EngineError::SamplingFailure { r, lo, hi });
    }

    let mut bound = 1usize;
    while bound < prefix_sums.len() && prefix_sums[bound] <= r {
        bound = bound.saturating_mul(2);
    }
    let search_lo = bound / 2;
    let search_hi = bound.min(last);

    let mut i = search_lo;
    while i <= search_hi && prefix_sums[i] <= r {
        i += 1;
    }

    let element = i.saturating_sub(1).min(last - 1);
    Ok(element)
}
