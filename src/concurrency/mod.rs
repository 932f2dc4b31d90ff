//! Low-level concurrency building blocks: lock-free atomics, cache-line
//! padding, and scoped-thread helpers for spinning up locale workers.

pub mod atomic;
pub mod cache_padded;
pub mod scoped;
pub mod worklist;

pub use cache_padded::CachePadded;
