//! # asyncrt-core
//!
//! Core types for the asyncrt task runtime.
//!
//! This crate is platform-agnostic: it defines the single-assignment cell
//! family, the job/scheduling-context vocabulary that ties cells to a
//! scheduler, and the error taxonomy. The worker pool, job queue, timing
//! wheel and poll sources that actually drive jobs live in `asyncrt-runtime`;
//! the user-facing `Task` combinators live in `asyncrt`.
//!
//! ## Modules
//!
//! - `spinlock` - internal short-critical-section mutual exclusion
//! - `context` - `SchedulingContext`, the worker-affinity hint
//! - `job` - the `Job` closure type and `JobSink` queuing trait
//! - `error` - the `{Rejected, IOError}` error taxonomy
//! - `cell` - `WriteOnceCell`, `TrackingOnceCell`, `WhenAnyCell`, `WhenAllCell`
//! - `env` - environment-variable parsing helpers shared by configuration layers

pub mod cell;
pub mod context;
pub mod env;
pub mod error;
pub mod job;
pub mod spinlock;

pub use cell::{Cell, TrackingOnceCell, WhenAllCell, WhenAnyCell, WriteOnceCell};
pub use context::SchedulingContext;
pub use error::{Error, Result};
pub use job::{Job, JobSink};
pub use spinlock::SpinLock;
