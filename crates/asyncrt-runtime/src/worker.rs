//! Worker pool: a fixed set of OS threads draining the shared [`JobQueue`]
//!
//! Workers never park on I/O themselves — a separate poll thread (see
//! `crate::scheduler`) resolves I/O and timer completions and pushes their
//! continuations back onto this same queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use asyncrt_core::context::SchedulingContext;

use crate::queue::JobQueue;

thread_local! {
    static CURRENT_WORKER_ID: std::cell::Cell<usize> = const { std::cell::Cell::new(usize::MAX) };
}

/// The worker id of the calling thread, or `None` off the worker pool
/// (e.g. the thread that called `block()` on a `Task`).
pub fn current_worker_id() -> Option<usize> {
    let id = CURRENT_WORKER_ID.with(|cell| cell.get());
    (id != usize::MAX).then_some(id)
}

/// A fixed pool of worker threads, each running [`worker_loop`] against a
/// shared [`JobQueue`].
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    num_workers: usize,
}

impl WorkerPool {
    /// Spawn `num_workers` threads draining `queue` until `shutdown` is set.
    pub fn start(
        queue: Arc<JobQueue>,
        num_workers: usize,
        idle_spins: u32,
        park_timeout: std::time::Duration,
        shutdown: Arc<AtomicBool>,
        debug_logging: bool,
    ) -> Result<Self, crate::error::SpawnError> {
        let mut handles = Vec::with_capacity(num_workers);
        for worker_id in 0..num_workers {
            let queue = Arc::clone(&queue);
            let shutdown = Arc::clone(&shutdown);
            let handle = thread::Builder::new()
                .name(format!("asyncrt-worker-{worker_id}"))
                .spawn(move || worker_loop(worker_id, queue, idle_spins, park_timeout, shutdown, debug_logging))
                .map_err(crate::error::SpawnError::ThreadSpawnFailed)?;
            handles.push(handle);
        }
        Ok(WorkerPool { handles, num_workers })
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Block until every worker thread has exited.
    pub fn join(self) {
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}

fn worker_loop(
    worker_id: usize,
    queue: Arc<JobQueue>,
    idle_spins: u32,
    park_timeout: std::time::Duration,
    shutdown: Arc<AtomicBool>,
    debug_logging: bool,
) {
    CURRENT_WORKER_ID.with(|cell| cell.set(worker_id));
    let ctx = SchedulingContext::worker(worker_id);

    if debug_logging {
        eprintln!("[asyncrt-worker-{worker_id}] started");
    }

    loop {
        if let Some(job) = queue.pop(worker_id) {
            job(ctx);
            continue;
        }

        if shutdown.load(Ordering::Acquire) {
            if debug_logging {
                eprintln!("[asyncrt-worker-{worker_id}] shutdown signaled, exiting");
            }
            return;
        }

        let mut spins = 0u32;
        let mut found = false;
        while spins < idle_spins {
            if let Some(job) = queue.pop(worker_id) {
                job(ctx);
                found = true;
                break;
            }
            std::hint::spin_loop();
            spins += 1;
        }
        if found {
            continue;
        }

        if shutdown.load(Ordering::Acquire) {
            return;
        }
        queue.park(park_timeout);
    }
}
