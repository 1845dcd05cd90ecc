//! Runtime-level errors: scheduler construction and configuration

use std::fmt;

/// Errors returned while constructing or configuring a [`crate::scheduler::Scheduler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that can occur spawning the worker pool itself.
#[derive(Debug)]
pub enum SpawnError {
    ThreadSpawnFailed(std::io::Error),
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnError::ThreadSpawnFailed(e) => write!(f, "failed to spawn worker thread: {e}"),
        }
    }
}

impl std::error::Error for SpawnError {}

/// Errors that can occur building a [`crate::scheduler::Scheduler`].
#[derive(Debug)]
pub enum SchedulerError {
    Config(ConfigError),
    Spawn(SpawnError),
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerError::Config(e) => write!(f, "{e}"),
            SchedulerError::Spawn(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SchedulerError {}

impl From<ConfigError> for SchedulerError {
    fn from(e: ConfigError) -> Self {
        SchedulerError::Config(e)
    }
}

impl From<SpawnError> for SchedulerError {
    fn from(e: SpawnError) -> Self {
        SchedulerError::Spawn(e)
    }
}
