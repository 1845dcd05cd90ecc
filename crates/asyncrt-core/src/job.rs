//! Job: an executable unit queued onto the scheduler
//!
//! A job is a one-shot callable that takes the `SchedulingContext` it was
//! queued under and runs to completion — jobs are never suspended
//! mid-execution. `JobSink` is the narrow interface cells need to hand a
//! continuation to *something* that can run it later; `asyncrt-runtime`'s
//! `Scheduler` is the concrete implementation, but keeping the trait here
//! lets `asyncrt-core` stay platform- and scheduler-agnostic.

use crate::context::SchedulingContext;

/// A boxed, move-only unit of work.
pub type Job = Box<dyn FnOnce(SchedulingContext) + Send>;

/// Anything that can accept jobs for later execution.
///
/// Cells hold a `Arc<dyn JobSink>` rather than a concrete scheduler type so
/// that the cell family has no dependency on the worker pool, job queue or
/// poll sources that live in `asyncrt-runtime`.
pub trait JobSink: Send + Sync {
    /// Queue a single job under the given scheduling context.
    fn queue(&self, ctx: SchedulingContext, job: Job);
}
