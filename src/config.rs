//! Engine-wide tunables.
//!
//! A single serde-backed config struct with documented defaults, rather
//! than scattering tunable constants through the modules that use them.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Destination-buffer capacity default: `2^20` entries.
pub const DEFAULT_DEST_BUFFER_CAPACITY: usize = 1 << 20;
/// Work-queue initial block size default.
pub const DEFAULT_BAG_INITIAL_BLOCK_SIZE: usize = 1024;
/// Work-queue max block size default: `2^20`.
pub const DEFAULT_BAG_MAX_BLOCK_SIZE: usize = 1 << 20;
/// Minimum tight-spin count default.
pub const DEFAULT_SPIN_MIN: u32 = 8;
/// Maximum tight-spin count default.
pub const DEFAULT_SPIN_MAX: u32 = 1024;
/// Minimum flush velocity default, in items/ms.
pub const DEFAULT_MIN_FLUSH_VELOCITY: f64 = 0.1;
/// Deterministic default RNG seed, used so tests are reproducible.
pub const DEFAULT_RNG_BASE_SEED: u64 = 0x5EED_5EED_5EED_5EED;

/// Engine-wide configuration.
///
/// Constructed via [`EngineConfig::default`], or loaded from JSON with
/// [`EngineConfig::from_json_str`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// DestinationBuffer capacity.
    pub dest_buffer_capacity: usize,
    /// BagSegmentBlock starting capacity.
    pub bag_initial_block_size: usize,
    /// BagSegmentBlock capacity ceiling.
    pub bag_max_block_size: usize,
    /// Minimum tight-spin iterations before yielding.
    pub spin_min: u32,
    /// Maximum tight-spin iterations before yielding.
    pub spin_max: u32,
    /// Items/ms threshold below which the pacing watcher flushes.
    pub min_flush_velocity: f64,
    /// Number of locales to simulate in-process.
    pub locale_count: usize,
    /// Worker threads per locale.
    pub max_task_par: usize,
    /// Base seed for per-task RNG streams.
    pub rng_base_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let parallelism = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1)
            .max(1);

        Self {
            dest_buffer_capacity: DEFAULT_DEST_BUFFER_CAPACITY,
            bag_initial_block_size: DEFAULT_BAG_INITIAL_BLOCK_SIZE,
            bag_max_block_size: DEFAULT_BAG_MAX_BLOCK_SIZE,
            spin_min: DEFAULT_SPIN_MIN,
            spin_max: DEFAULT_SPIN_MAX,
            min_flush_velocity: DEFAULT_MIN_FLUSH_VELOCITY,
            locale_count: 1,
            max_task_par: parallelism,
            rng_base_seed: DEFAULT_RNG_BASE_SEED,
        }
    }
}

impl EngineConfig {
    /// Loads a config from a JSON string, leaving unspecified fields at
    /// their defaults.
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::PreconditionViolation {
            detail: format!("invalid engine config JSON: {e}"),
        })
    }

    /// Starts from [`EngineConfig::default`] and overrides each field whose
    /// `HYPERLOOM_<FIELD_NAME>` environment variable (upper-cased) is set,
    /// e.g. `HYPERLOOM_DEST_BUFFER_CAPACITY=65536`.
    ///
    /// An unset variable leaves the default untouched; a set-but-unparseable
    /// one is reported as a precondition violation naming the offending
    /// variable, rather than silently falling back to the default.
    pub fn from_env() -> EngineResult<Self> {
        let mut cfg = Self::default();
        macro_rules! override_field {
            ($field:ident, $var:literal) => {
                if let Ok(raw) = std::env::var($var) {
                    cfg.$field = raw.parse().map_err(|_| EngineError::PreconditionViolation {
                        detail: format!("{}={raw:?} is not a valid value", $var),
                    })?;
                }
            };
        }
        override_field!(dest_buffer_capacity, "HYPERLOOM_DEST_BUFFER_CAPACITY");
        override_field!(bag_initial_block_size, "HYPERLOOM_BAG_INITIAL_BLOCK_SIZE");
        override_field!(bag_max_block_size, "HYPERLOOM_BAG_MAX_BLOCK_SIZE");
        override_field!(spin_min, "HYPERLOOM_SPIN_MIN");
        override_field!(spin_max, "HYPERLOOM_SPIN_MAX");
        override_field!(min_flush_velocity, "HYPERLOOM_MIN_FLUSH_VELOCITY");
        override_field!(locale_count, "HYPERLOOM_LOCALE_COUNT");
        override_field!(max_task_par, "HYPERLOOM_MAX_TASK_PAR");
        override_field!(rng_base_seed, "HYPERLOOM_RNG_BASE_SEED");
        Ok(cfg)
    }

    /// Validates the configuration, returning a descriptive error for any
    /// field that would make the engine's invariants unsatisfiable.
    pub fn validate(&self) -> EngineResult<()> {
        if self.dest_buffer_capacity == 0 {
            return Err(EngineError::PreconditionViolation {
                detail: "dest_buffer_capacity must be > 0".into(),
            });
        }
        if self.bag_initial_block_size == 0 || self.bag_initial_block_size > self.bag_max_block_size
        {
            return Err(EngineError::PreconditionViolation {
                detail: "bag_initial_block_size must be > 0 and <= bag_max_block_size".into(),
            });
        }
        if self.spin_min == 0 || self.spin_min > self.spin_max {
            return Err(EngineError::PreconditionViolation {
                detail: "spin_min must be > 0 and <= spin_max".into(),
            });
        }
        if self.locale_count == 0 {
            return Err(EngineError::PreconditionViolation {
                detail: "locale_count must be > 0".into(),
            });
        }
        if self.max_task_par == 0 {
            return Err(EngineError::PreconditionViolation {
                detail: "max_task_par must be > 0".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.dest_buffer_capacity, 1 << 20);
        assert_eq!(cfg.bag_initial_block_size, 1024);
        assert_eq!(cfg.bag_max_block_size, 1 << 20);
        assert_eq!(cfg.spin_min, 8);
        assert_eq!(cfg.spin_max, 1024);
        assert!((cfg.min_flush_velocity - 0.1).abs() < f64::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn from_json_str_overrides_selected_fields() {
        let cfg = EngineConfig::from_json_str(r#"{"dest_buffer_capacity": 16}"#).unwrap();
        assert_eq!(cfg.dest_buffer_capacity, 16);
        assert_eq!(cfg.bag_initial_block_size, 1024);
    }

    #[test]
    fn validate_rejects_zero_capacity() {
        let mut cfg = EngineConfig::default();
        cfg.dest_buffer_capacity = 0;
        assert!(cfg.validate().is_err());
    }

    // Environment variables are process-global, so these two tests serialize
    // on a lock to avoid racing each other under `cargo test`'s default
    // multithreaded runner.
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn from_env_overrides_only_set_variables() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("HYPERLOOM_DEST_BUFFER_CAPACITY", "64");
        std::env::remove_var("HYPERLOOM_SPIN_MIN");

        let cfg = EngineConfig::from_env().unwrap();
        assert_eq!(cfg.dest_buffer_capacity, 64);
        assert_eq!(cfg.spin_min, DEFAULT_SPIN_MIN);

        std::env::remove_var("HYPERLOOM_DEST_BUFFER_CAPACITY");
    }

    #[test]
    fn from_env_rejects_unparseable_value() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("HYPERLOOM_SPIN_MIN", "not-a-number");
        assert!(EngineConfig::from_env().is_err());
        std::env::remove_var("HYPERLOOM_SPIN_MIN");
    }
}
