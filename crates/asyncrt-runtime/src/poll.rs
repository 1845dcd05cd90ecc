//! `PollSource`: the interface the scheduler's poll thread drives
//!
//! A poll source represents some external completion mechanism — a timer
//! wheel, a background I/O thread — that can't push directly onto the job
//! queue itself without knowing about the scheduler. Instead the poll
//! thread periodically asks each source for any jobs it has ready and
//! queues them.

use std::time::Duration;

use asyncrt_core::job::Job;

/// Something the scheduler's poll thread checks periodically for ready work.
pub trait PollSource: Send + Sync {
    /// Collect and return every job that has become ready since the last
    /// call. Must not block.
    fn poll(&self) -> Vec<Job>;

    /// How often the poll thread should call [`poll`](Self::poll) on this source.
    fn poll_frequency(&self) -> Duration;
}
