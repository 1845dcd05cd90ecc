//! Timer poll source: a [`HierarchicalTimingWheel`] wrapped as a [`PollSource`]

use std::sync::Arc;
use std::time::Duration;

use asyncrt_core::job::Job;
use asyncrt_core::spinlock::SpinLock;

use crate::poll::PollSource;
use crate::timing_wheel::HierarchicalTimingWheel;

/// Schedules jobs to run after a delay, by way of a hierarchical timing
/// wheel advanced once per [`poll`](PollSource::poll) call.
///
/// The wheel measures delay relative to its own last `advance()` call, so
/// scheduling accuracy is bounded by how promptly the poll thread calls
/// `poll()` — at worst one `poll_frequency()` interval of drift, which is
/// why `poll_frequency` here is pinned to the wheel's tick size.
pub struct TimerPollSource {
    wheel: SpinLock<HierarchicalTimingWheel<Job>>,
    tick_size: Duration,
}

impl TimerPollSource {
    pub fn new(tick_size: Duration, wheel_sizes: &[usize]) -> Self {
        TimerPollSource {
            wheel: SpinLock::new(HierarchicalTimingWheel::new(tick_size, wheel_sizes)),
            tick_size,
        }
    }

    /// Run `job` once `delay` has elapsed.
    pub fn schedule_once(&self, delay: Duration, job: Job) {
        self.wheel.lock().schedule(delay, job);
    }

    /// Run `job` every `period`, rescheduling itself on each firing.
    ///
    /// Internal bookkeeping primitive — `TaskTimerSource` only exposes
    /// one-shot delays, since periodic tasks are not part of the public
    /// `Task` surface.
    pub fn schedule_periodic(self: &Arc<Self>, period: Duration, job: Arc<dyn Fn() + Send + Sync>) {
        let source = Arc::clone(self);
        let job_for_reschedule = Arc::clone(&job);
        self.schedule_once(
            period,
            Box::new(move |_ctx| {
                job();
                source.schedule_periodic(period, job_for_reschedule);
            }),
        );
    }
}

impl PollSource for TimerPollSource {
    fn poll(&self) -> Vec<Job> {
        self.wheel.lock().advance()
    }

    fn poll_frequency(&self) -> Duration {
        self.tick_size
    }
}
