//! Work-stealing job queue: per-worker local queues plus a shared global
//! queue, each backed by a growable ring buffer, with single-job stealing
//! between workers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use asyncrt_core::job::Job;
use asyncrt_core::spinlock::SpinLock;

/// The backing array plus head/tail indices for a ring-buffer queue.
/// `head == tail` means empty; one slot is always kept unused so `head ==
/// tail` is unambiguous (the classic ring-buffer "full" convention).
struct RingStorage {
    buf: Vec<Option<Job>>,
    head: usize,
    tail: usize,
}

impl RingStorage {
    fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        RingStorage {
            buf: (0..capacity).map(|_| None).collect(),
            head: 0,
            tail: 0,
        }
    }

    fn is_full(&self) -> bool {
        (self.tail + 1) % self.buf.len() == self.head
    }

    /// Double the backing array, re-laying elements contiguous from index 0.
    fn grow(&mut self) {
        let old_cap = self.buf.len();
        let new_cap = old_cap * 2;
        let mut new_buf: Vec<Option<Job>> = (0..new_cap).map(|_| None).collect();

        let mut count = 0;
        let mut i = self.head;
        while i != self.tail {
            new_buf[count] = self.buf[i].take();
            count += 1;
            i = (i + 1) % old_cap;
        }

        self.buf = new_buf;
        self.head = 0;
        self.tail = count;
    }

    fn push_back(&mut self, job: Job) {
        if self.is_full() {
            self.grow();
        }
        let cap = self.buf.len();
        self.buf[self.tail] = Some(job);
        self.tail = (self.tail + 1) % cap;
    }

    fn pop_front(&mut self) -> Option<Job> {
        if self.head == self.tail {
            return None;
        }
        let cap = self.buf.len();
        let job = self.buf[self.head].take();
        self.head = (self.head + 1) % cap;
        job
    }
}

/// Bytes enough to keep `size` off the spinlock's cache line, avoiding
/// false sharing between a thief's size probe and the owner's enqueue.
#[repr(align(64))]
struct SizeCounter(AtomicUsize);

/// A FIFO queue over a growable ring buffer: a spinlock-guarded backing
/// array plus a relaxed-order atomic size counter. `size` is advisory —
/// a `true` count can be stale by the time a `dequeue` follows it, but a
/// zero is never reported while an enqueued element is guaranteed visible.
struct RingQueue {
    storage: SpinLock<RingStorage>,
    size: SizeCounter,
}

impl RingQueue {
    fn new(capacity: usize) -> Self {
        RingQueue {
            storage: SpinLock::new(RingStorage::new(capacity)),
            size: SizeCounter(AtomicUsize::new(0)),
        }
    }

    fn enqueue(&self, job: Job) {
        let mut storage = self.storage.lock();
        storage.push_back(job);
        self.size.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Fast-path size probe skips the lock entirely when empty; a
    /// concurrent thief may still race the lock acquisition, so the
    /// locked re-check inside `pop_front` is what actually decides.
    fn dequeue(&self) -> Option<Job> {
        if self.size.0.load(Ordering::Relaxed) == 0 {
            return None;
        }
        let mut storage = self.storage.lock();
        let job = storage.pop_front();
        if job.is_some() {
            self.size.0.fetch_sub(1, Ordering::Relaxed);
        }
        job
    }

    fn len(&self) -> usize {
        self.size.0.load(Ordering::Relaxed)
    }
}

/// The queue shared by every worker, with blocking pop for idle parking.
/// Parking is decoupled from the ring buffer's own spinlock — a separate
/// `Mutex`/`Condvar` pair exists purely to let an idle worker block.
struct GlobalQueue {
    ring: RingQueue,
    park_lock: Mutex<()>,
    condvar: Condvar,
}

impl GlobalQueue {
    fn new(capacity: usize) -> Self {
        GlobalQueue {
            ring: RingQueue::new(capacity),
            park_lock: Mutex::new(()),
            condvar: Condvar::new(),
        }
    }

    fn push(&self, job: Job) {
        self.ring.enqueue(job);
        self.condvar.notify_one();
    }

    fn pop(&self) -> Option<Job> {
        self.ring.dequeue()
    }

    fn park(&self, timeout: Duration) {
        let guard = self.park_lock.lock().unwrap();
        if self.ring.len() == 0 {
            let _ = self.condvar.wait_timeout(guard, timeout);
        }
    }

    fn wake_all(&self) {
        self.condvar.notify_all();
    }

    fn len(&self) -> usize {
        self.ring.len()
    }
}

/// Every pop checks the global queue once per this many local pops, so a
/// worker with a steady stream of local work can't starve the global queue.
const GLOBAL_CHECK_INTERVAL: u32 = 61;

/// The full work-stealing queue set: one local queue per worker plus a
/// shared global queue, wired together with stealing.
pub struct JobQueue {
    local: Vec<RingQueue>,
    global: GlobalQueue,
    counters: Vec<AtomicUsize>,
    rng: Vec<AtomicUsize>,
}

impl JobQueue {
    /// Build a queue set sized for `num_workers` workers. `local_capacity`
    /// and `global_capacity` are initial ring-buffer sizes — both queues
    /// grow on demand rather than rejecting pushes once full.
    pub fn new(num_workers: usize, local_capacity: usize, global_capacity: usize) -> Self {
        JobQueue {
            local: (0..num_workers).map(|_| RingQueue::new(local_capacity)).collect(),
            global: GlobalQueue::new(global_capacity),
            counters: (0..num_workers).map(|_| AtomicUsize::new(0)).collect(),
            rng: (0..num_workers)
                .map(|i| AtomicUsize::new(i.wrapping_mul(2654435761) + 1))
                .collect(),
        }
    }

    /// Number of worker-local queues this set was built for.
    pub fn capacity(&self) -> usize {
        self.local.len()
    }

    /// Push a job, preferring `hint`'s local queue and falling back to the
    /// global queue when there's no hint.
    pub fn push(&self, job: Job, hint: Option<usize>) {
        if let Some(worker) = hint {
            if worker < self.local.len() {
                self.local[worker].enqueue(job);
                self.global.wake_all();
                return;
            }
        }
        self.global.push(job);
    }

    /// Pop the next job for `worker_id`: local queue first (periodically
    /// deferring to the global queue to avoid starving it), then the
    /// global queue, then stealing a single job from a peer.
    pub fn pop(&self, worker_id: usize) -> Option<Job> {
        if worker_id >= self.local.len() {
            return self.global.pop();
        }

        let count = self.counters[worker_id].fetch_add(1, Ordering::Relaxed) as u32;
        if count % GLOBAL_CHECK_INTERVAL == 0 {
            if let Some(job) = self.global.pop() {
                return Some(job);
            }
        }

        if let Some(job) = self.local[worker_id].dequeue() {
            return Some(job);
        }
        if let Some(job) = self.global.pop() {
            return Some(job);
        }
        self.steal(worker_id)
    }

    fn random_victim(&self, worker_id: usize) -> usize {
        let num = self.local.len();
        if num <= 1 {
            return worker_id;
        }
        let rng = &self.rng[worker_id];
        let old = rng.load(Ordering::Relaxed);
        let new = old.wrapping_mul(1103515245).wrapping_add(12345);
        rng.store(new, Ordering::Relaxed);
        new % num
    }

    /// Sweep every other worker exactly once, circularly from a random
    /// starting index, stealing a single job (one `dequeue`) from the
    /// first peer that has one.
    fn steal(&self, worker_id: usize) -> Option<Job> {
        let num = self.local.len();
        if num <= 1 {
            return None;
        }

        let mut idx = self.random_victim(worker_id);
        let mut checked = 0;
        while checked < num - 1 {
            if idx != worker_id {
                if let Some(job) = self.local[idx].dequeue() {
                    return Some(job);
                }
                checked += 1;
            }
            idx = (idx + 1) % num;
        }
        None
    }

    /// Park the calling worker until woken or `timeout` elapses.
    pub fn park(&self, timeout: Duration) {
        self.global.park(timeout);
    }

    /// Wake every parked worker, used on shutdown and after a burst push.
    pub fn wake_all(&self) {
        self.global.wake_all();
    }

    /// Total queued jobs across every local queue and the global queue.
    /// Advisory only, like the underlying ring buffers' own `size`.
    pub fn len(&self) -> usize {
        self.local.iter().map(RingQueue::len).sum::<usize>() + self.global.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asyncrt_core::context::SchedulingContext;
    use std::sync::atomic::AtomicUsize as AU;
    use std::sync::Arc;

    fn marker(id: usize, sink: Arc<AU>) -> Job {
        Box::new(move |_ctx: SchedulingContext| {
            sink.store(id, Ordering::SeqCst);
        })
    }

    #[test]
    fn push_without_hint_goes_to_global() {
        let q = JobQueue::new(2, 4, 16);
        let seen = Arc::new(AU::new(0));
        q.push(marker(7, Arc::clone(&seen)), None);
        assert_eq!(q.len(), 1);
        let job = q.pop(0).expect("job present");
        job(SchedulingContext::empty());
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn push_with_hint_prefers_local() {
        let q = JobQueue::new(2, 4, 16);
        let seen = Arc::new(AU::new(0));
        q.push(marker(1, Arc::clone(&seen)), Some(1));
        let job = q.pop(1).expect("job present on hinted worker");
        job(SchedulingContext::empty());
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn local_queue_grows_past_its_initial_capacity() {
        let q = JobQueue::new(1, 2, 16);
        let seen = Arc::new(AU::new(0));
        for i in 0..50 {
            q.push(marker(i, Arc::clone(&seen)), Some(0));
        }
        assert_eq!(q.len(), 50);

        for expected in 0..50 {
            let job = q.pop(0).expect("job present");
            job(SchedulingContext::empty());
            assert_eq!(seen.load(Ordering::SeqCst), expected);
        }
        assert!(q.pop(0).is_none());
    }

    #[test]
    fn idle_worker_steals_a_single_job_from_peer() {
        let q = JobQueue::new(2, 64, 16);
        let seen = Arc::new(AU::new(0));
        for i in 0..10 {
            q.push(marker(i, Arc::clone(&seen)), Some(0));
        }
        let stolen = q.pop(1);
        assert!(stolen.is_some());
        // Only one job should have moved — the rest stay put for worker 0.
        assert_eq!(q.len(), 9);
    }

    #[test]
    fn steal_sweeps_every_peer_not_just_the_first_few() {
        let q = JobQueue::new(6, 4, 16);
        let seen = Arc::new(AU::new(0));
        // Only the last peer (index 5) has work; a capped sweep of the
        // first few peers would never reach it.
        q.push(marker(42, Arc::clone(&seen)), Some(5));
        let stolen = q.pop(0);
        assert!(stolen.is_some());
    }

    #[test]
    fn empty_queue_pop_returns_none() {
        let q = JobQueue::new(2, 4, 16);
        assert!(q.pop(0).is_none());
    }
}
