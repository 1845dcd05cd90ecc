//! I/O poll source: a background-thread read backend exposed as a [`PollSource`]
//!
//! Real asynchronous file I/O (io_uring, POSIX AIO, IOCP) is platform
//! specific and deliberately out of scope here — only the shape of the
//! completion contract matters: a request goes in, and some time later a
//! job carrying its result comes out of `poll()`. The default backend
//! below satisfies that contract portably by handing each request to a
//! dedicated OS thread that performs a blocking read and publishes its
//! result to a lock-free completion queue; no worker-pool job body ever
//! blocks on I/O.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_queue::SegQueue;

use asyncrt_core::context::SchedulingContext;
use asyncrt_core::error::{Error, IOErrorKind, Result};
use asyncrt_core::job::Job;
use asyncrt_core::spinlock::SpinLock;

use crate::poll::PollSource;

/// A read request: a fixed-size buffer at a given file offset.
///
/// The buffer is allocated up front and filled in place once the read
/// completes; [`IOReadRequest::copy_buffer`] hands the caller an owned
/// snapshot rather than a reference into the shared buffer.
#[derive(Clone)]
pub struct IOReadRequest {
    buffer: Arc<SpinLock<Vec<u8>>>,
    nbytes: usize,
    offset: u64,
}

impl std::fmt::Debug for IOReadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IOReadRequest")
            .field("buffer", &*self.buffer.lock())
            .field("nbytes", &self.nbytes)
            .field("offset", &self.offset)
            .finish()
    }
}

impl PartialEq for IOReadRequest {
    fn eq(&self, other: &Self) -> bool {
        *self.buffer.lock() == *other.buffer.lock()
            && self.nbytes == other.nbytes
            && self.offset == other.offset
    }
}

impl IOReadRequest {
    pub fn new(nbytes: usize, offset: u64) -> Self {
        IOReadRequest {
            buffer: Arc::new(SpinLock::new(vec![0u8; nbytes])),
            nbytes,
            offset,
        }
    }

    pub fn size(&self) -> usize {
        self.nbytes
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// An owned copy of the buffer's current contents.
    pub fn copy_buffer(&self) -> Vec<u8> {
        self.buffer.lock().clone()
    }

    fn fill(&self, bytes: &[u8]) {
        let mut buf = self.buffer.lock();
        let n = bytes.len().min(buf.len());
        buf[..n].copy_from_slice(&bytes[..n]);
    }
}

/// Default I/O backend: one dedicated thread per in-flight read, a
/// completion queue drained by [`poll`](PollSource::poll).
pub struct IOPollSource {
    completions: Arc<SegQueue<Job>>,
    poll_frequency: Duration,
}

impl IOPollSource {
    pub fn new() -> Self {
        IOPollSource {
            completions: Arc::new(SegQueue::new()),
            poll_frequency: Duration::from_millis(5),
        }
    }

    pub fn with_poll_frequency(poll_frequency: Duration) -> Self {
        IOPollSource {
            completions: Arc::new(SegQueue::new()),
            poll_frequency,
        }
    }

    /// Queue a read of `request.size()` bytes at `request.offset()` from
    /// `path`. `callback` runs (via the scheduler, once `poll()` observes
    /// completion) with the filled request on success.
    pub fn queue_read<F>(&self, path: PathBuf, request: IOReadRequest, callback: F)
    where
        F: FnOnce(SchedulingContext, Result<IOReadRequest>) + Send + 'static,
    {
        let completions = Arc::clone(&self.completions);
        std::thread::spawn(move || {
            let result = read_exact_at(&path, &request);
            completions.push(Box::new(move |ctx| callback(ctx, result)) as Job);
        });
    }
}

fn read_exact_at(path: &PathBuf, request: &IOReadRequest) -> Result<IOReadRequest> {
    let mut file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::IOError(IOErrorKind::NotFound)
        } else {
            Error::IOError(IOErrorKind::Other)
        }
    })?;
    file.seek(SeekFrom::Start(request.offset()))?;
    let mut bytes = vec![0u8; request.size()];
    file.read_exact(&mut bytes)?;
    request.fill(&bytes);
    Ok(request.clone())
}

impl Default for IOPollSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PollSource for IOPollSource {
    fn poll(&self) -> Vec<Job> {
        let mut jobs = Vec::new();
        while let Some(job) = self.completions.pop() {
            jobs.push(job);
        }
        jobs
    }

    fn poll_frequency(&self) -> Duration {
        self.poll_frequency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Instant;

    #[test]
    fn queued_read_completes_and_fills_buffer() {
        let mut path = std::env::temp_dir();
        path.push(format!("asyncrt-io-source-test-{:?}", std::thread::current().id()));
        std::fs::write(&path, b"hello world").unwrap();

        let source = IOPollSource::new();
        let request = IOReadRequest::new(5, 0);
        let done = Arc::new(AtomicBool::new(false));
        let done2 = Arc::clone(&done);

        source.queue_read(path.clone(), request, move |_ctx, result| {
            let request = result.expect("read succeeds");
            assert_eq!(request.copy_buffer(), b"hello");
            done2.store(true, Ordering::SeqCst);
        });

        let deadline = Instant::now() + Duration::from_secs(2);
        let mut jobs = Vec::new();
        while jobs.is_empty() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
            jobs = source.poll();
        }
        for job in jobs {
            job(SchedulingContext::empty());
        }

        assert!(done.load(Ordering::SeqCst));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn read_of_missing_file_reports_not_found() {
        let source = IOPollSource::new();
        let request = IOReadRequest::new(4, 0);
        let seen_error = Arc::new(AtomicBool::new(false));
        let seen_error2 = Arc::clone(&seen_error);

        source.queue_read(PathBuf::from("/no/such/asyncrt-test-file"), request, move |_ctx, result| {
            assert_eq!(result, Err(Error::IOError(IOErrorKind::NotFound)));
            seen_error2.store(true, Ordering::SeqCst);
        });

        let deadline = Instant::now() + Duration::from_secs(2);
        let mut jobs = Vec::new();
        while jobs.is_empty() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
            jobs = source.poll();
        }
        for job in jobs {
            job(SchedulingContext::empty());
        }
        assert!(seen_error.load(Ordering::SeqCst));
    }

    #[test]
    fn poll_without_completions_returns_empty() {
        let source = IOPollSource::new();
        assert!(source.poll().is_empty());
    }
}
