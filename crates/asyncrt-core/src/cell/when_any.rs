//! `WhenAnyCell<T, E>` — resolves with the first input to succeed

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{Callback, Cell, WriteOnceCell};
use crate::context::SchedulingContext;
use crate::job::JobSink;

/// Publishes the first successful input it sees; only publishes an error
/// once every input has errored.
pub struct WhenAnyCell<T, E> {
    slot: WriteOnceCell<T, E>,
    total: usize,
    errored: AtomicUsize,
}

impl<T, E> WhenAnyCell<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Create a cell awaiting `total` inputs, each reported via
    /// [`WhenAnyCell::input_ready`].
    pub fn new(sink: Arc<dyn JobSink>, total: usize) -> Self {
        WhenAnyCell {
            slot: WriteOnceCell::new(sink),
            total,
            errored: AtomicUsize::new(0),
        }
    }

    /// Report that one of the tracked inputs has resolved. Call this once
    /// per input, in any order, from any thread.
    pub fn input_ready(&self, ctx: SchedulingContext, result: Result<T, E>) {
        match result {
            Ok(value) => {
                self.slot.write(ctx, value);
            }
            Err(err) => {
                let errored = self.errored.fetch_add(1, Ordering::AcqRel) + 1;
                if errored >= self.total {
                    self.slot.error(ctx, err);
                }
            }
        }
    }
}

impl<T, E> Cell<T, E> for WhenAnyCell<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn read(&self) -> Option<Result<T, E>> {
        self.slot.read()
    }

    fn await_cell(&self, callback: Callback<T, E>) {
        self.slot.await_cell(callback);
    }

    fn block(&self) -> Result<T, E> {
        self.slot.block()
    }
}
