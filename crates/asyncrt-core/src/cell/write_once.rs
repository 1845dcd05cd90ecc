//! `WriteOnceCell<T, E>` — the base single-assignment cell

use std::sync::{Arc, Condvar, Mutex};

use super::{Callback, Cell};
use crate::context::SchedulingContext;
use crate::job::JobSink;

enum State<T, E> {
    Empty(Vec<Callback<T, E>>),
    Filled(Result<T, E>),
}

/// A cell that is written exactly once, either via [`WriteOnceCell::write`]
/// or [`WriteOnceCell::error`]. Any further write is a no-op — the first
/// one wins, matching the "single assignment" law the whole cell family is
/// built on.
pub struct WriteOnceCell<T, E> {
    state: Mutex<State<T, E>>,
    condvar: Condvar,
    sink: Arc<dyn JobSink>,
}

impl<T, E> WriteOnceCell<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Create an empty cell that dispatches callbacks through `sink`.
    pub fn new(sink: Arc<dyn JobSink>) -> Self {
        WriteOnceCell {
            state: Mutex::new(State::Empty(Vec::new())),
            condvar: Condvar::new(),
            sink,
        }
    }

    /// Fill the cell with a success value. Returns `false` if already filled.
    pub fn write(&self, ctx: SchedulingContext, value: T) -> bool {
        self.resolve(ctx, Ok(value))
    }

    /// Fill the cell with an error. Returns `false` if already filled.
    pub fn error(&self, ctx: SchedulingContext, err: E) -> bool {
        self.resolve(ctx, Err(err))
    }

    fn resolve(&self, ctx: SchedulingContext, result: Result<T, E>) -> bool {
        let callbacks = {
            let mut guard = self.state.lock().unwrap();
            match &*guard {
                State::Filled(_) => return false,
                State::Empty(_) => {
                    let previous = std::mem::replace(&mut *guard, State::Filled(result.clone()));
                    match previous {
                        State::Empty(callbacks) => callbacks,
                        State::Filled(_) => unreachable!(),
                    }
                }
            }
        };
        self.condvar.notify_all();

        for callback in callbacks {
            let result = result.clone();
            self.sink.queue(ctx, Box::new(move |ctx| callback(ctx, result)));
        }
        true
    }
}

impl<T, E> Cell<T, E> for WriteOnceCell<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn read(&self) -> Option<Result<T, E>> {
        match &*self.state.lock().unwrap() {
            State::Filled(result) => Some(result.clone()),
            State::Empty(_) => None,
        }
    }

    fn await_cell(&self, callback: Callback<T, E>) {
        let mut guard = self.state.lock().unwrap();
        match &mut *guard {
            State::Filled(result) => {
                let result = result.clone();
                drop(guard);
                self.sink
                    .queue(SchedulingContext::empty(), Box::new(move |ctx| callback(ctx, result)));
            }
            State::Empty(callbacks) => callbacks.push(callback),
        }
    }

    fn block(&self) -> Result<T, E> {
        let mut guard = self.state.lock().unwrap();
        loop {
            match &*guard {
                State::Filled(result) => return result.clone(),
                State::Empty(_) => guard = self.condvar.wait(guard).unwrap(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct InlineSink;

    impl JobSink for InlineSink {
        fn queue(&self, ctx: SchedulingContext, job: crate::job::Job) {
            job(ctx);
        }
    }

    #[test]
    fn read_before_write_is_none() {
        let cell: WriteOnceCell<i32, &'static str> = WriteOnceCell::new(Arc::new(InlineSink));
        assert_eq!(cell.read(), None);
    }

    #[test]
    fn write_then_read() {
        let cell: WriteOnceCell<i32, &'static str> = WriteOnceCell::new(Arc::new(InlineSink));
        cell.write(SchedulingContext::empty(), 7);
        assert_eq!(cell.read(), Some(Ok(7)));
    }

    #[test]
    fn second_write_is_ignored() {
        let cell: WriteOnceCell<i32, &'static str> = WriteOnceCell::new(Arc::new(InlineSink));
        assert!(cell.write(SchedulingContext::empty(), 1));
        assert!(!cell.write(SchedulingContext::empty(), 2));
        assert_eq!(cell.read(), Some(Ok(1)));
    }

    #[test]
    fn error_after_write_is_ignored() {
        let cell: WriteOnceCell<i32, &'static str> = WriteOnceCell::new(Arc::new(InlineSink));
        assert!(cell.write(SchedulingContext::empty(), 1));
        assert!(!cell.error(SchedulingContext::empty(), "boom"));
        assert_eq!(cell.read(), Some(Ok(1)));
    }

    #[test]
    fn await_after_fill_dispatches_immediately() {
        let cell: WriteOnceCell<i32, &'static str> = WriteOnceCell::new(Arc::new(InlineSink));
        cell.write(SchedulingContext::empty(), 9);

        let seen = Arc::new(AtomicUsize::new(0));
        let seen2 = Arc::clone(&seen);
        cell.await_cell(Box::new(move |_, result| {
            assert_eq!(result, Ok(9));
            seen2.store(1, Ordering::SeqCst);
        }));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn await_before_fill_is_queued_on_write() {
        let cell: WriteOnceCell<i32, &'static str> = WriteOnceCell::new(Arc::new(InlineSink));
        let seen = Arc::new(AtomicUsize::new(0));
        let seen2 = Arc::clone(&seen);
        cell.await_cell(Box::new(move |_, result| {
            assert_eq!(result, Ok(5));
            seen2.store(1, Ordering::SeqCst);
        }));
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        cell.write(SchedulingContext::empty(), 5);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn block_returns_once_filled_from_another_thread() {
        let cell = Arc::new(WriteOnceCell::<i32, &'static str>::new(Arc::new(InlineSink)));
        let writer = Arc::clone(&cell);
        let handle = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            writer.write(SchedulingContext::empty(), 42);
        });
        assert_eq!(cell.block(), Ok(42));
        handle.join().unwrap();
    }
}
