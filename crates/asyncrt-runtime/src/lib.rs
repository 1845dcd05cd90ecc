//! # asyncrt-runtime
//!
//! The driving half of the asyncrt task runtime: a fixed work-stealing
//! worker pool, a hierarchical timing wheel, and poll sources that bridge
//! timers and file I/O back onto the worker pool's job queue. Everything
//! here is wired together by [`scheduler::Scheduler`], which is the only
//! type `asyncrt` (the user-facing `Task` API) depends on.
//!
//! ## Modules
//!
//! - `config` - `SchedulerConfig`, the tunable knobs for a scheduler
//! - `queue` - `JobQueue`, the per-worker + global work-stealing queue set
//! - `worker` - `WorkerPool`, the fixed pool of job-draining threads
//! - `timing_wheel` - `HierarchicalTimingWheel`, the cascaded timer structure
//! - `poll` - `PollSource`, the interface the poll thread drives
//! - `timer_source` - `TimerPollSource`, a timing wheel exposed as a poll source
//! - `io_source` - `IOPollSource`, the background-thread read backend
//! - `scheduler` - `Scheduler`, tying all of the above into a `JobSink`
//! - `error` - configuration and spawn error types

pub mod config;
pub mod error;
pub mod io_source;
pub mod poll;
pub mod queue;
pub mod scheduler;
pub mod timer_source;
pub mod timing_wheel;
pub mod worker;

pub use config::SchedulerConfig;
pub use error::{ConfigError, SchedulerError, SpawnError};
pub use io_source::{IOPollSource, IOReadRequest};
pub use poll::PollSource;
pub use queue::JobQueue;
pub use scheduler::Scheduler;
pub use timer_source::TimerPollSource;
pub use timing_wheel::HierarchicalTimingWheel;
pub use worker::WorkerPool;
