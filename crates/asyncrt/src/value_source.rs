//! `TaskValueSource<T, E>`: mint tasks resolved by an external `complete()` call
//!
//! Modeled on .NET's `TaskCompletionSource` — a producer calls
//! [`TaskValueSource::complete`] or [`TaskValueSource::error`] once, and
//! every `Task` minted from [`TaskValueSource::create`] (there can be many)
//! resolves at that point. Safe because `Task` never exposes a write path
//! into the shared cell.

use std::sync::Arc;

use asyncrt_core::cell::WriteOnceCell;
use asyncrt_core::context::SchedulingContext;
use asyncrt_core::job::JobSink;

use crate::task::Task;

pub struct TaskValueSource<T, E> {
    cell: Arc<WriteOnceCell<T, E>>,
    sink: Arc<dyn JobSink>,
}

impl<T, E> TaskValueSource<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub fn new(sink: Arc<dyn JobSink>) -> Self {
        let cell = Arc::new(WriteOnceCell::new(Arc::clone(&sink)));
        TaskValueSource { cell, sink }
    }

    /// Resolve every task minted from this source with `value`. No-op if
    /// already resolved.
    pub fn complete(&self, value: T) {
        self.cell.write(SchedulingContext::empty(), value);
    }

    /// Resolve every task minted from this source with `value`, under the
    /// given scheduling context (preserves worker affinity when completing
    /// from inside a running job).
    pub fn complete_in(&self, ctx: SchedulingContext, value: T) {
        self.cell.write(ctx, value);
    }

    /// Resolve every task minted from this source with `err`. No-op if
    /// already resolved.
    pub fn error(&self, err: E) {
        self.cell.error(SchedulingContext::empty(), err);
    }

    /// Mint a new `Task` tracking this source's cell.
    pub fn create(&self) -> Task<T, E> {
        Task::from_cell(Arc::clone(&self.sink), Arc::clone(&self.cell) as Arc<dyn asyncrt_core::cell::Cell<T, E>>)
    }
}
