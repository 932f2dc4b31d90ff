//! The typed error hierarchy returned by every fallible public operation.
//!
//! Internal invariant violations (a Bag block that is nil while its element
//! count says otherwise, for example) are deliberately *not* represented
//! here: those indicate the concurrent data structures have already
//! corrupted their own bookkeeping, and are raised as panics rather than
//! handed back to a caller who cannot do anything useful with them.

use std::fmt;

/// The error type returned by fallible operations across the engine.
#[derive(Debug)]
pub enum EngineError {
    /// A caller-supplied descriptor, id, or argument violated a documented
    /// precondition (out-of-range vertex/edge id, non-integral conversion).
    PreconditionViolation {
        /// Human-readable detail of what was violated.
        detail: String,
    },
    /// An operation would exceed a fixed capacity (the edge/vertex id space,
    /// or a destination buffer that stayed closed across a drain attempt).
    CapacityExceeded {
        /// Human-readable detail of which capacity was exceeded.
        detail: String,
    },
    /// `getRandomElement` was asked to place `r` outside the sampling
    /// table's covered range `[lo, hi]`.
    SamplingFailure {
        /// The value that could not be placed.
        r: f64,
        /// The sampling table's lower bound (normally `0.0`).
        lo: f64,
        /// The sampling table's upper bound (normally `1.0`).
        hi: f64,
    },
    /// Reserved for the out-of-scope binary CSR / CSV readers; nothing in
    /// this crate constructs this variant today.
    Io(std::io::Error),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::PreconditionViolation { detail } => {
                write!(f, "precondition violation: {detail}")
            }
            EngineError::CapacityExceeded { detail } => {
                write!(f, "capacity exceeded: {detail}")
            }
            EngineError::SamplingFailure { r, lo, hi } => {
                write!(f, "sampling failure: r={r} outside [{lo}, {hi}]")
            }
            EngineError::Io(err) => write!(f, "i/o error: {err}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Io(err)
    }
}

/// Convenience alias used throughout the crate's public APIs.
pub type EngineResult<T> = Result<T, EngineError>;

/// Builds a [`EngineError::PreconditionViolation`] from a `format!`-style message.
pub(crate) fn precondition(detail: impl Into<String>) -> EngineError {
    EngineError::PreconditionViolation {
        detail: detail.into(),
    }
}

/// Builds a [`EngineError::CapacityExceeded`] from a `format!`-style message.
pub(crate) fn capacity_exceeded(detail: impl Into<String>) -> EngineError {
    EngineError::CapacityExceeded {
        detail: detail.into(),
    }
}
