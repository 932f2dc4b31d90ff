//! Lock-free atomic primitives shared by the spin-lock, destination buffer,
//! work-stealing bag, and termination detector.

/// Atomic flag (`AtomicBool` wrapper) with test-and-set.
pub mod bool;
/// Atomic counter (`AtomicUsize` wrapper).
pub mod usize;

pub use bool::AtomicFlag;
pub use usize::AtomicCounter;
