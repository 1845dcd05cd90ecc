//! `TaskIOSource`: mints a `Task` resolved by a background file read

use std::path::PathBuf;
use std::sync::Arc;

use asyncrt_core::error::Error;
use asyncrt_core::job::JobSink;
use asyncrt_runtime::{IOPollSource, IOReadRequest};

use crate::task::Task;
use crate::value_source::TaskValueSource;

/// Produces read tasks backed by a shared [`IOPollSource`].
pub struct TaskIOSource {
    sink: Arc<dyn JobSink>,
    io_source: Arc<IOPollSource>,
}

impl TaskIOSource {
    pub fn new(sink: Arc<dyn JobSink>, io_source: Arc<IOPollSource>) -> Self {
        TaskIOSource { sink, io_source }
    }

    /// A task that resolves with `request` filled from `path`, or an
    /// `Error::IOError` if the read fails.
    pub fn read(&self, path: PathBuf, request: IOReadRequest) -> Task<IOReadRequest, Error> {
        let value_source: TaskValueSource<IOReadRequest, Error> = TaskValueSource::new(Arc::clone(&self.sink));
        let task = value_source.create();

        self.io_source.queue_read(path, request, move |ctx, result| match result {
            Ok(filled) => value_source.complete_in(ctx, filled),
            Err(err) => value_source.error(err),
        });

        task
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asyncrt_runtime::{Scheduler, SchedulerConfig};

    #[test]
    fn read_resolves_with_file_contents() {
        let scheduler = Arc::new(Scheduler::new(SchedulerConfig::new().num_workers(1)).expect("scheduler starts"));
        let io_source = scheduler.io_source_shared();
        let sink: Arc<dyn JobSink> = Arc::clone(&scheduler) as Arc<dyn JobSink>;

        let mut path = std::env::temp_dir();
        path.push(format!("asyncrt-task-io-source-test-{:?}", std::thread::current().id()));
        std::fs::write(&path, b"payload").unwrap();

        let source = TaskIOSource::new(sink, io_source);
        let task = source.read(path.clone(), IOReadRequest::new(7, 0));

        let resolved = task.block().expect("read succeeds");
        assert_eq!(resolved.copy_buffer(), b"payload");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn read_of_missing_file_resolves_with_error() {
        let scheduler = Arc::new(Scheduler::new(SchedulerConfig::new().num_workers(1)).expect("scheduler starts"));
        let io_source = scheduler.io_source_shared();
        let sink: Arc<dyn JobSink> = Arc::clone(&scheduler) as Arc<dyn JobSink>;

        let source = TaskIOSource::new(sink, io_source);
        let task = source.read(PathBuf::from("/no/such/asyncrt-task-io-test"), IOReadRequest::new(4, 0));

        assert!(task.block().is_err());
    }
}
