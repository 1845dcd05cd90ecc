//! `Task<T, E>`: the user-facing handle over a cell
//!
//! A `Task` is a thin wrapper around `Arc<dyn Cell<T, E>>` that prevents
//! direct writes to the underlying cell — only the source that created it
//! (a closure passed to [`Task::new`], a [`crate::value_source::TaskValueSource`],
//! a combinator) can resolve it. Multiple `Task`s can share the same cell
//! safely because nothing outside this module can write to one.

use std::sync::Arc;

use asyncrt_core::cell::{Cell, TrackingOnceCell, WhenAllCell, WhenAnyCell, WriteOnceCell};
use asyncrt_core::context::SchedulingContext;
use asyncrt_core::job::JobSink;
use asyncrt_core::spinlock::SpinLock;

/// A value that is already resolved, exposed through the `Cell` interface
/// so it can be handed to a [`TrackingOnceCell`] without a real computation
/// behind it — used by `bind` to short-circuit on an upstream error without
/// running the bind function. The result lives behind a `SpinLock` purely
/// so the type doesn't need to demand `T: Sync, E: Sync` from callers.
struct ImmediateCell<T, E> {
    sink: Arc<dyn JobSink>,
    result: SpinLock<Result<T, E>>,
}

impl<T, E> Cell<T, E> for ImmediateCell<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn read(&self) -> Option<Result<T, E>> {
        Some(self.result.lock().clone())
    }

    fn await_cell(&self, callback: asyncrt_core::cell::Callback<T, E>) {
        let result = self.result.lock().clone();
        self.sink
            .queue(SchedulingContext::empty(), Box::new(move |ctx| callback(ctx, result)));
    }

    fn block(&self) -> Result<T, E> {
        self.result.lock().clone()
    }
}

/// An awaitable unit of asynchronous work.
pub struct Task<T, E> {
    pub(crate) cell: Arc<dyn Cell<T, E>>,
    pub(crate) sink: Arc<dyn JobSink>,
}

impl<T, E> Clone for Task<T, E> {
    fn clone(&self) -> Self {
        Task {
            cell: Arc::clone(&self.cell),
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<T, E> Task<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Queue `func` on `sink` and produce a `Task` resolved by its result.
    pub fn new<F>(sink: Arc<dyn JobSink>, func: F) -> Task<T, E>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        let cell = Arc::new(WriteOnceCell::<T, E>::new(Arc::clone(&sink)));
        let cell_for_job = Arc::clone(&cell);
        sink.queue(
            SchedulingContext::empty(),
            Box::new(move |ctx| {
                match func() {
                    Ok(value) => cell_for_job.write(ctx, value),
                    Err(err) => cell_for_job.error(ctx, err),
                };
            }),
        );

        Task { cell, sink }
    }

    pub(crate) fn from_cell(sink: Arc<dyn JobSink>, cell: Arc<dyn Cell<T, E>>) -> Self {
        Task { cell, sink }
    }

    /// Chain a continuation that produces another `Task`. The returned
    /// task resolves once `func`'s task does; an error on `self` short
    /// circuits without running `func`.
    pub fn bind<G, F>(self, func: F) -> Task<G, E>
    where
        G: Clone + Send + 'static,
        F: FnOnce(T) -> Task<G, E> + Send + 'static,
    {
        let tracking_cell = Arc::new(TrackingOnceCell::<G, E>::new());
        let tracking_cell_for_job = Arc::clone(&tracking_cell);
        let sink = Arc::clone(&self.sink);

        self.cell.await_cell(Box::new(move |_ctx, result| match result {
            Ok(value) => {
                let next = func(value);
                tracking_cell_for_job.track(Box::new(next.cell));
            }
            Err(err) => {
                tracking_cell_for_job.track(Box::new(ImmediateCell {
                    sink: Arc::clone(&sink),
                    result: SpinLock::new(Err(err)),
                }));
            }
        }));

        Task::from_cell(self.sink, tracking_cell)
    }

    /// Transform a successful result with `func`; errors pass through.
    pub fn map<G, F>(self, func: F) -> Task<G, E>
    where
        G: Clone + Send + 'static,
        F: FnOnce(T) -> G + Send + 'static,
    {
        let cell = Arc::new(WriteOnceCell::<G, E>::new(Arc::clone(&self.sink)));
        let cell_for_job = Arc::clone(&cell);

        self.cell.await_cell(Box::new(move |ctx, result| {
            match result {
                Ok(value) => cell_for_job.write(ctx, func(value)),
                Err(err) => cell_for_job.error(ctx, err),
            };
        }));

        Task::from_cell(self.sink, cell)
    }

    /// Block the calling thread until this task resolves.
    pub fn block(&self) -> Result<T, E> {
        self.cell.block()
    }

    /// A non-blocking snapshot of this task's result, if resolved.
    pub fn peek(&self) -> Option<Result<T, E>> {
        self.cell.read()
    }

    /// Resolve with whichever of `tasks` succeeds first; only errors once
    /// every task has errored.
    pub fn when_any(sink: Arc<dyn JobSink>, tasks: Vec<Task<T, E>>) -> Task<T, E> {
        let total = tasks.len();
        let any_cell = Arc::new(WhenAnyCell::<T, E>::new(Arc::clone(&sink), total));

        for task in tasks {
            let any_cell = Arc::clone(&any_cell);
            task.cell
                .await_cell(Box::new(move |ctx, result| any_cell.input_ready(ctx, result)));
        }

        Task::from_cell(sink, any_cell)
    }

    /// Resolve once every one of `tasks` has succeeded, producing their
    /// values in input order; resolves with the first error seen otherwise.
    pub fn when_all(sink: Arc<dyn JobSink>, tasks: Vec<Task<T, E>>) -> Task<Vec<T>, E> {
        let total = tasks.len();
        let all_cell = Arc::new(WhenAllCell::<T, E>::new(Arc::clone(&sink), total));

        for (index, task) in tasks.into_iter().enumerate() {
            let all_cell = Arc::clone(&all_cell);
            task.cell
                .await_cell(Box::new(move |ctx, result| all_cell.input_ready(ctx, index, result)));
        }

        Task::from_cell(sink, all_cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct InlineSink;

    impl JobSink for InlineSink {
        fn queue(&self, ctx: SchedulingContext, job: asyncrt_core::job::Job) {
            job(ctx);
        }
    }

    fn sink() -> Arc<dyn JobSink> {
        Arc::new(InlineSink)
    }

    #[test]
    fn new_task_resolves_with_function_result() {
        let task: Task<i32, &'static str> = Task::new(sink(), || Ok(5));
        assert_eq!(task.block(), Ok(5));
    }

    #[test]
    fn map_transforms_success() {
        let task: Task<i32, &'static str> = Task::new(sink(), || Ok(5));
        let mapped = task.map(|v| v * 2);
        assert_eq!(mapped.block(), Ok(10));
    }

    #[test]
    fn map_passes_through_error() {
        let task: Task<i32, &'static str> = Task::new(sink(), || Err("boom"));
        let mapped = task.map(|v| v * 2);
        assert_eq!(mapped.block(), Err("boom"));
    }

    #[test]
    fn map_identity_law() {
        let task: Task<i32, &'static str> = Task::new(sink(), || Ok(7));
        let mapped = task.map(|v| v);
        assert_eq!(mapped.block(), Ok(7));
    }

    #[test]
    fn map_composition_law() {
        let a: Task<i32, &'static str> = Task::new(sink(), || Ok(3));
        let b: Task<i32, &'static str> = Task::new(sink(), || Ok(3));
        let composed_then = a.map(|v| v + 1).map(|v| v * 2);
        let single = b.map(|v| (v + 1) * 2);
        assert_eq!(composed_then.block(), single.block());
    }

    #[test]
    fn bind_chains_to_downstream_task() {
        let task: Task<i32, &'static str> = Task::new(sink(), || Ok(2));
        let chained = task.bind(|v| Task::new(sink(), move || Ok(v * 10)));
        assert_eq!(chained.block(), Ok(20));
    }

    #[test]
    fn bind_short_circuits_on_error() {
        let ran = Arc::new(AtomicUsize::new(0));
        let ran2 = Arc::clone(&ran);
        let task: Task<i32, &'static str> = Task::new(sink(), || Err("nope"));
        let chained = task.bind(move |v| {
            ran2.store(1, Ordering::SeqCst);
            Task::new(sink(), move || Ok(v))
        });
        assert_eq!(chained.block(), Err("nope"));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn bind_left_identity_law() {
        let value = 4;
        let f = |v: i32| Task::<i32, &'static str>::new(sink(), move || Ok(v + 1));
        let via_bind = Task::new(sink(), move || Ok(value)).bind(f);
        let direct = f(value);
        assert_eq!(via_bind.block(), direct.block());
    }

    #[test]
    fn when_any_resolves_with_first_success() {
        let tasks = vec![
            Task::<i32, &'static str>::new(sink(), || Ok(1)),
            Task::new(sink(), || Ok(2)),
        ];
        let any = Task::when_any(sink(), tasks);
        assert!(matches!(any.block(), Ok(1) | Ok(2)));
    }

    #[test]
    fn when_any_errors_only_if_all_inputs_error() {
        let tasks = vec![
            Task::<i32, &'static str>::new(sink(), || Err("a")),
            Task::new(sink(), || Err("b")),
        ];
        let any = Task::when_any(sink(), tasks);
        assert!(any.block().is_err());
    }

    #[test]
    fn when_all_collects_values_in_order() {
        let tasks = vec![
            Task::<i32, &'static str>::new(sink(), || Ok(1)),
            Task::new(sink(), || Ok(2)),
            Task::new(sink(), || Ok(3)),
        ];
        let all = Task::when_all(sink(), tasks);
        assert_eq!(all.block(), Ok(vec![1, 2, 3]));
    }

    #[test]
    fn when_all_resolves_with_first_error() {
        let tasks = vec![
            Task::<i32, &'static str>::new(sink(), || Ok(1)),
            Task::new(sink(), || Err("bad")),
        ];
        let all = Task::when_all(sink(), tasks);
        assert_eq!(all.block(), Err("bad"));
    }

    #[test]
    fn peek_before_resolution_is_none_after_is_some() {
        let task: Task<i32, &'static str> = Task::new(sink(), || Ok(9));
        assert_eq!(task.peek(), Some(Ok(9)));
    }
}
