//! `TrackingOnceCell<T, E>` — adopts another cell's result after the fact
//!
//! `bind`'s continuation doesn't produce its downstream `Task` until it
//! actually runs, so the cell representing that downstream result has to
//! exist *before* anything is known about it. `TrackingOnceCell` buffers
//! callers (`await_cell`/`block`) until [`TrackingOnceCell::track`] hands it
//! the real cell to delegate to, then forwards everything from then on.
//! `track` may only be called once; a second call returns `false` rather
//! than silently replacing the delegate.

use std::sync::{Condvar, Mutex};

use super::{Callback, Cell};

enum State<T, E> {
    Untracked(Vec<Callback<T, E>>),
    Tracked(Box<dyn Cell<T, E>>),
}

/// A cell that forwards to another cell once [`track`](Self::track) is
/// called.
pub struct TrackingOnceCell<T, E> {
    state: Mutex<State<T, E>>,
    condvar: Condvar,
}

impl<T, E> TrackingOnceCell<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Create a cell with nothing to delegate to yet.
    pub fn new() -> Self {
        TrackingOnceCell {
            state: Mutex::new(State::Untracked(Vec::new())),
            condvar: Condvar::new(),
        }
    }

    /// Adopt `target` as the cell to delegate to. Flushes every callback
    /// buffered by `await_cell` onto it and wakes any blocked callers.
    /// Returns `false` if already tracking.
    pub fn track(&self, target: Box<dyn Cell<T, E>>) -> bool {
        let buffered = {
            let mut guard = self.state.lock().unwrap();
            match &*guard {
                State::Tracked(_) => return false,
                State::Untracked(_) => {
                    let previous = std::mem::replace(&mut *guard, State::Tracked(target));
                    match previous {
                        State::Untracked(callbacks) => callbacks,
                        State::Tracked(_) => unreachable!(),
                    }
                }
            }
        };
        self.condvar.notify_all();

        let guard = self.state.lock().unwrap();
        if let State::Tracked(target) = &*guard {
            for callback in buffered {
                target.await_cell(callback);
            }
        }
        true
    }
}

impl<T, E> Default for TrackingOnceCell<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Cell<T, E> for TrackingOnceCell<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn read(&self) -> Option<Result<T, E>> {
        match &*self.state.lock().unwrap() {
            State::Tracked(target) => target.read(),
            State::Untracked(_) => None,
        }
    }

    fn await_cell(&self, callback: Callback<T, E>) {
        let mut guard = self.state.lock().unwrap();
        match &mut *guard {
            State::Tracked(target) => target.await_cell(callback),
            State::Untracked(callbacks) => callbacks.push(callback),
        }
    }

    fn block(&self) -> Result<T, E> {
        let mut guard = self.state.lock().unwrap();
        loop {
            match &*guard {
                State::Tracked(target) => return target.block(),
                State::Untracked(_) => guard = self.condvar.wait(guard).unwrap(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::WriteOnceCell;
    use crate::context::SchedulingContext;
    use crate::job::JobSink;
    use std::sync::Arc;

    struct InlineSink;

    impl JobSink for InlineSink {
        fn queue(&self, ctx: SchedulingContext, job: crate::job::Job) {
            job(ctx);
        }
    }

    #[test]
    fn read_before_track_is_none() {
        let cell: TrackingOnceCell<i32, &'static str> = TrackingOnceCell::new();
        assert_eq!(cell.read(), None);
    }

    #[test]
    fn track_delegates_reads() {
        let cell: TrackingOnceCell<i32, &'static str> = TrackingOnceCell::new();
        let inner: WriteOnceCell<i32, &'static str> = WriteOnceCell::new(Arc::new(InlineSink));
        inner.write(SchedulingContext::empty(), 11);
        assert!(cell.track(Box::new(inner)));
        assert_eq!(cell.read(), Some(Ok(11)));
    }

    #[test]
    fn second_track_is_rejected() {
        let cell: TrackingOnceCell<i32, &'static str> = TrackingOnceCell::new();
        let first: WriteOnceCell<i32, &'static str> = WriteOnceCell::new(Arc::new(InlineSink));
        first.write(SchedulingContext::empty(), 1);
        let second: WriteOnceCell<i32, &'static str> = WriteOnceCell::new(Arc::new(InlineSink));
        second.write(SchedulingContext::empty(), 2);

        assert!(cell.track(Box::new(first)));
        assert!(!cell.track(Box::new(second)));
        assert_eq!(cell.read(), Some(Ok(1)));
    }

    #[test]
    fn await_before_track_flushes_on_track() {
        let cell: TrackingOnceCell<i32, &'static str> = TrackingOnceCell::new();
        let seen = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let seen2 = Arc::clone(&seen);
        cell.await_cell(Box::new(move |_, result| {
            assert_eq!(result, Ok(3));
            seen2.store(1, std::sync::atomic::Ordering::SeqCst);
        }));

        let inner: WriteOnceCell<i32, &'static str> = WriteOnceCell::new(Arc::new(InlineSink));
        inner.write(SchedulingContext::empty(), 3);
        cell.track(Box::new(inner));

        assert_eq!(seen.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn block_waits_for_track_then_fill() {
        let cell = Arc::new(TrackingOnceCell::<i32, &'static str>::new());
        let writer = Arc::clone(&cell);
        let handle = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            let inner: WriteOnceCell<i32, &'static str> = WriteOnceCell::new(Arc::new(InlineSink));
            inner.write(SchedulingContext::empty(), 99);
            writer.track(Box::new(inner));
        });
        assert_eq!(cell.block(), Ok(99));
        handle.join().unwrap();
    }
}
