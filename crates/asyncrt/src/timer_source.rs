//! `TaskTimerSource`: mints a `Task` that resolves after a delay

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use asyncrt_core::job::JobSink;
use asyncrt_runtime::TimerPollSource;

use crate::task::Task;
use crate::value_source::TaskValueSource;

/// Produces delay tasks backed by a shared [`TimerPollSource`].
///
/// `E` is the error type of the tasks it mints — timers themselves never
/// fail, but the type has to agree with whatever else a caller composes
/// the resulting task with.
pub struct TaskTimerSource<E> {
    sink: Arc<dyn JobSink>,
    timer_source: Arc<TimerPollSource>,
    _error: PhantomData<fn() -> E>,
}

impl<E> TaskTimerSource<E>
where
    E: Clone + Send + 'static,
{
    pub fn new(sink: Arc<dyn JobSink>, timer_source: Arc<TimerPollSource>) -> Self {
        TaskTimerSource {
            sink,
            timer_source,
            _error: PhantomData,
        }
    }

    /// A task that resolves with `()` once `duration` has elapsed.
    pub fn after(&self, duration: Duration) -> Task<(), E> {
        let value_source: TaskValueSource<(), E> = TaskValueSource::new(Arc::clone(&self.sink));
        let task = value_source.create();

        self.timer_source
            .schedule_once(duration, Box::new(move |ctx| value_source.complete_in(ctx, ())));

        task
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asyncrt_runtime::{Scheduler, SchedulerConfig};
    use std::time::Instant;

    #[test]
    fn after_resolves_once_duration_elapses() {
        let scheduler = Arc::new(
            Scheduler::new(
                SchedulerConfig::new()
                    .num_workers(1)
                    .tick_size(Duration::from_millis(5))
                    .wheel_sizes(vec![64, 64]),
            )
            .expect("scheduler starts"),
        );
        let timer_source = scheduler.timer_source_shared();
        let sink: Arc<dyn JobSink> = Arc::clone(&scheduler) as Arc<dyn JobSink>;

        let source = TaskTimerSource::<&'static str>::new(sink, timer_source);
        let started = Instant::now();
        let task = source.after(Duration::from_millis(30));

        assert_eq!(task.block(), Ok(()));
        assert!(started.elapsed() >= Duration::from_millis(25));
    }
}
