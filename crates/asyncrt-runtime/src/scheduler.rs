//! Scheduler: ties the worker pool, job queue, timing wheel and I/O poll
//! source together into a single `JobSink`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use asyncrt_core::context::SchedulingContext;
use asyncrt_core::job::{Job, JobSink};

use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::io_source::IOPollSource;
use crate::poll::PollSource;
use crate::queue::JobQueue;
use crate::timer_source::TimerPollSource;
use crate::worker::WorkerPool;

/// The runtime's coordinating type: a fixed worker pool draining a shared
/// job queue, plus a poll thread driving the timer wheel and I/O backend.
///
/// `Scheduler` implements `JobSink`, which is the only interface
/// `asyncrt-core`'s cells need to queue continuations — they never see the
/// worker pool, job queue or poll sources directly.
pub struct Scheduler {
    queue: Arc<JobQueue>,
    workers: Option<WorkerPool>,
    poll_handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    timer_source: Arc<TimerPollSource>,
    io_source: Arc<IOPollSource>,
}

impl Scheduler {
    /// Build and start a scheduler from `config`: spawns the worker pool
    /// and the poll thread immediately.
    pub fn new(config: SchedulerConfig) -> Result<Self, SchedulerError> {
        config.validate()?;

        let queue = Arc::new(JobQueue::new(
            config.num_workers,
            config.local_queue_capacity,
            config.global_queue_capacity,
        ));
        let shutdown = Arc::new(AtomicBool::new(false));

        let workers = WorkerPool::start(
            Arc::clone(&queue),
            config.num_workers,
            config.idle_spins,
            config.park_timeout,
            Arc::clone(&shutdown),
            config.debug_logging,
        )?;

        let timer_source = Arc::new(TimerPollSource::new(config.tick_size, &config.wheel_sizes));
        let io_source = Arc::new(IOPollSource::new());

        let poll_handle = spawn_poll_thread(
            Arc::clone(&queue),
            Arc::clone(&shutdown),
            vec![
                Arc::clone(&timer_source) as Arc<dyn PollSource>,
                Arc::clone(&io_source) as Arc<dyn PollSource>,
            ],
            config.debug_logging,
        );

        Ok(Scheduler {
            queue,
            workers: Some(workers),
            poll_handle: Some(poll_handle),
            shutdown,
            timer_source,
            io_source,
        })
    }

    /// Convenience constructor using [`SchedulerConfig::from_env`].
    pub fn from_env() -> Result<Self, SchedulerError> {
        Self::new(SchedulerConfig::from_env())
    }

    /// Number of worker threads backing this scheduler.
    pub fn num_workers(&self) -> usize {
        self.queue.capacity()
    }

    /// Run `job` after `delay`, via the timer poll source.
    pub fn schedule_timer(&self, delay: Duration, job: Job) {
        self.timer_source.schedule_once(delay, job);
    }

    /// Access the I/O poll source to queue a read.
    pub fn io_source(&self) -> &Arc<IOPollSource> {
        &self.io_source
    }

    /// A shared handle to the timer poll source, for adapters that need to
    /// schedule delays outside the scheduler's own `schedule_timer`.
    pub fn timer_source_shared(&self) -> Arc<TimerPollSource> {
        Arc::clone(&self.timer_source)
    }

    /// A shared handle to the I/O poll source, for adapters that need to
    /// queue reads outside the scheduler's own `io_source`.
    pub fn io_source_shared(&self) -> Arc<IOPollSource> {
        Arc::clone(&self.io_source)
    }

    /// Total jobs currently queued (local + global), for diagnostics.
    pub fn pending_jobs(&self) -> usize {
        self.queue.len()
    }

    /// Signal shutdown and block until the worker pool and poll thread exit.
    pub fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        self.queue.wake_all();
        if let Some(workers) = self.workers.take() {
            workers.join();
        }
        if let Some(handle) = self.poll_handle.take() {
            let _ = handle.join();
        }
    }
}

impl JobSink for Scheduler {
    fn queue(&self, ctx: SchedulingContext, job: Job) {
        self.queue.push(job, ctx.worker_id());
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_poll_thread(
    queue: Arc<JobQueue>,
    shutdown: Arc<AtomicBool>,
    sources: Vec<Arc<dyn PollSource>>,
    debug_logging: bool,
) -> JoinHandle<()> {
    std::thread::Builder::new()
        .name("asyncrt-poll".to_string())
        .spawn(move || {
            let mut next_due: Vec<Instant> = sources.iter().map(|_| Instant::now()).collect();
            let sleep_floor = sources
                .iter()
                .map(|s| s.poll_frequency())
                .min()
                .unwrap_or(Duration::from_millis(5))
                .min(Duration::from_millis(5));

            if debug_logging {
                eprintln!("[asyncrt-poll] started with {} source(s)", sources.len());
            }

            while !shutdown.load(Ordering::Acquire) {
                let now = Instant::now();
                for (i, source) in sources.iter().enumerate() {
                    if now >= next_due[i] {
                        for job in source.poll() {
                            queue.push(job, None);
                        }
                        next_due[i] = now + source.poll_frequency();
                    }
                }
                std::thread::sleep(sleep_floor);
            }

            if debug_logging {
                eprintln!("[asyncrt-poll] shutdown signaled, exiting");
            }
        })
        .expect("failed to spawn poll thread")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    #[test]
    fn queued_job_runs_on_a_worker() {
        let mut scheduler = Scheduler::new(SchedulerConfig::new().num_workers(2)).expect("scheduler starts");
        let counter = Arc::new(AtomicUsize::new(0));
        let counter2 = Arc::clone(&counter);
        scheduler.queue(
            SchedulingContext::empty(),
            Box::new(move |_ctx| {
                counter2.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let deadline = Instant::now() + Duration::from_secs(2);
        while counter.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        scheduler.shutdown();
    }

    #[test]
    fn timer_fires_after_delay() {
        let mut scheduler = Scheduler::new(
            SchedulerConfig::new()
                .num_workers(1)
                .tick_size(Duration::from_millis(5))
                .wheel_sizes(vec![64, 64]),
        )
        .expect("scheduler starts");

        let fired_at = Arc::new(Mutex::new(None));
        let fired_at2 = Arc::clone(&fired_at);
        let started = Instant::now();
        scheduler.schedule_timer(
            Duration::from_millis(30),
            Box::new(move |_ctx| {
                *fired_at2.lock().unwrap() = Some(Instant::now());
            }),
        );

        let deadline = started + Duration::from_secs(2);
        while fired_at.lock().unwrap().is_none() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        let fired_at = fired_at.lock().unwrap().expect("timer fired");
        assert!(fired_at.duration_since(started) >= Duration::from_millis(25));
        scheduler.shutdown();
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = Scheduler::new(SchedulerConfig::new().num_workers(0));
        assert!(result.is_err());
    }
}
