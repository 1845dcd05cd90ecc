//! Scheduler configuration
//!
//! Compile-time defaults with optional environment variable overrides,
//! matching the rest of the crate's `from_env()` convention.

use std::time::Duration;

use asyncrt_core::env::{env_get, env_get_bool};

use crate::error::ConfigError;

const DEFAULT_NUM_WORKERS: usize = 4;
const DEFAULT_LOCAL_QUEUE_CAPACITY: usize = 256;
const DEFAULT_GLOBAL_QUEUE_CAPACITY: usize = 4096;
const DEFAULT_IDLE_SPINS: u32 = 64;
const DEFAULT_PARK_TIMEOUT_MS: u64 = 10;
const DEFAULT_TICK_SIZE_MS: u64 = 10;
const DEFAULT_DEBUG_LOGGING: bool = false;

/// Builder for the scheduler's tunable parameters.
///
/// Use [`SchedulerConfig::from_env`] to start from compile-time defaults
/// with environment overrides applied, or [`SchedulerConfig::new`] for
/// defaults only (useful in tests, where environment leakage is
/// undesirable).
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Number of worker threads in the pool.
    pub num_workers: usize,
    /// Per-worker local queue capacity before jobs spill to the global queue.
    pub local_queue_capacity: usize,
    /// Global queue capacity before further pushes block on resize.
    pub global_queue_capacity: usize,
    /// Spin iterations an idle worker performs before parking.
    pub idle_spins: u32,
    /// Timeout a parked worker waits before re-checking for work.
    pub park_timeout: Duration,
    /// Timing wheel tick granularity.
    pub tick_size: Duration,
    /// Bucket counts for each hierarchy level of the timing wheel, innermost first.
    pub wheel_sizes: Vec<usize>,
    /// Enable `eprintln!`-based diagnostics (see the `debug-logging` feature).
    pub debug_logging: bool,
}

impl SchedulerConfig {
    /// Defaults only, ignoring environment variables.
    pub fn new() -> Self {
        SchedulerConfig {
            num_workers: DEFAULT_NUM_WORKERS,
            local_queue_capacity: DEFAULT_LOCAL_QUEUE_CAPACITY,
            global_queue_capacity: DEFAULT_GLOBAL_QUEUE_CAPACITY,
            idle_spins: DEFAULT_IDLE_SPINS,
            park_timeout: Duration::from_millis(DEFAULT_PARK_TIMEOUT_MS),
            tick_size: Duration::from_millis(DEFAULT_TICK_SIZE_MS),
            wheel_sizes: vec![64, 64, 60, 24],
            debug_logging: DEFAULT_DEBUG_LOGGING,
        }
    }

    /// Defaults with environment overrides applied.
    ///
    /// Recognized variables (all optional):
    /// - `ASYNCRT_NUM_WORKERS`
    /// - `ASYNCRT_LOCAL_QUEUE_CAPACITY`
    /// - `ASYNCRT_GLOBAL_QUEUE_CAPACITY`
    /// - `ASYNCRT_IDLE_SPINS`
    /// - `ASYNCRT_PARK_TIMEOUT_MS`
    /// - `ASYNCRT_TICK_SIZE_MS`
    /// - `ASYNCRT_DEBUG` (0/1/true/false/yes/no/on/off)
    pub fn from_env() -> Self {
        let defaults = Self::new();
        SchedulerConfig {
            num_workers: env_get("ASYNCRT_NUM_WORKERS", defaults.num_workers),
            local_queue_capacity: env_get(
                "ASYNCRT_LOCAL_QUEUE_CAPACITY",
                defaults.local_queue_capacity,
            ),
            global_queue_capacity: env_get(
                "ASYNCRT_GLOBAL_QUEUE_CAPACITY",
                defaults.global_queue_capacity,
            ),
            idle_spins: env_get("ASYNCRT_IDLE_SPINS", defaults.idle_spins),
            park_timeout: Duration::from_millis(env_get(
                "ASYNCRT_PARK_TIMEOUT_MS",
                DEFAULT_PARK_TIMEOUT_MS,
            )),
            tick_size: Duration::from_millis(env_get(
                "ASYNCRT_TICK_SIZE_MS",
                DEFAULT_TICK_SIZE_MS,
            )),
            debug_logging: env_get_bool("ASYNCRT_DEBUG", defaults.debug_logging),
            ..defaults
        }
    }

    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn local_queue_capacity(mut self, cap: usize) -> Self {
        self.local_queue_capacity = cap;
        self
    }

    pub fn global_queue_capacity(mut self, cap: usize) -> Self {
        self.global_queue_capacity = cap;
        self
    }

    pub fn idle_spins(mut self, spins: u32) -> Self {
        self.idle_spins = spins;
        self
    }

    pub fn park_timeout(mut self, d: Duration) -> Self {
        self.park_timeout = d;
        self
    }

    pub fn tick_size(mut self, d: Duration) -> Self {
        self.tick_size = d;
        self
    }

    pub fn wheel_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.wheel_sizes = sizes;
        self
    }

    pub fn debug_logging(mut self, enable: bool) -> Self {
        self.debug_logging = enable;
        self
    }

    /// Validate the configuration, surfacing the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_workers == 0 {
            return Err(ConfigError::InvalidValue("num_workers must be > 0"));
        }
        if self.num_workers > 1024 {
            return Err(ConfigError::InvalidValue("num_workers must be <= 1024"));
        }
        if self.local_queue_capacity == 0 {
            return Err(ConfigError::InvalidValue("local_queue_capacity must be > 0"));
        }
        if self.global_queue_capacity == 0 {
            return Err(ConfigError::InvalidValue("global_queue_capacity must be > 0"));
        }
        if self.tick_size.is_zero() {
            return Err(ConfigError::InvalidValue("tick_size must be > 0"));
        }
        if self.wheel_sizes.is_empty() {
            return Err(ConfigError::InvalidValue("wheel_sizes must have at least one level"));
        }
        if self.wheel_sizes.iter().any(|&n| n == 0) {
            return Err(ConfigError::InvalidValue("wheel_sizes entries must be > 0"));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SchedulerConfig::new().validate().is_ok());
    }

    #[test]
    fn builder_overrides_fields() {
        let config = SchedulerConfig::new()
            .num_workers(8)
            .park_timeout(Duration::from_millis(5));
        assert_eq!(config.num_workers, 8);
        assert_eq!(config.park_timeout, Duration::from_millis(5));
    }

    #[test]
    fn zero_workers_is_invalid() {
        let config = SchedulerConfig::new().num_workers(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_wheel_sizes_is_invalid() {
        let config = SchedulerConfig::new().wheel_sizes(vec![]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn from_env_respects_override() {
        std::env::set_var("ASYNCRT_NUM_WORKERS", "6");
        let config = SchedulerConfig::from_env();
        assert_eq!(config.num_workers, 6);
        std::env::remove_var("ASYNCRT_NUM_WORKERS");
    }
}
