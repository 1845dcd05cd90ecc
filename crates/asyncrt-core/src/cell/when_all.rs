//! `WhenAllCell<T, E>` — resolves once every tracked input has succeeded

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{Callback, Cell, WriteOnceCell};
use crate::context::SchedulingContext;
use crate::job::JobSink;
use crate::spinlock::SpinLock;

/// Publishes `Vec<T>` in input order once every tracked input has
/// succeeded; publishes the first error it sees and ignores the rest.
pub struct WhenAllCell<T, E> {
    slot: WriteOnceCell<Vec<T>, E>,
    values: Vec<SpinLock<Option<T>>>,
    resolved: AtomicUsize,
    total: usize,
}

impl<T, E> WhenAllCell<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Create a cell awaiting `total` inputs, each reported via
    /// [`WhenAllCell::input_ready`] with its original index.
    pub fn new(sink: Arc<dyn JobSink>, total: usize) -> Self {
        WhenAllCell {
            slot: WriteOnceCell::new(sink),
            values: (0..total).map(|_| SpinLock::new(None)).collect(),
            resolved: AtomicUsize::new(0),
            total,
        }
    }

    /// Report that the input at `index` has resolved. Each index must be
    /// reported exactly once.
    pub fn input_ready(&self, ctx: SchedulingContext, index: usize, result: Result<T, E>) {
        match result {
            Ok(value) => {
                *self.values[index].lock() = Some(value);
                let resolved = self.resolved.fetch_add(1, Ordering::AcqRel) + 1;
                if resolved >= self.total {
                    let collected = self
                        .values
                        .iter()
                        .map(|slot| slot.lock().clone().expect("all inputs resolved"))
                        .collect();
                    self.slot.write(ctx, collected);
                }
            }
            Err(err) => {
                self.slot.error(ctx, err);
            }
        }
    }
}

impl<T, E> Cell<Vec<T>, E> for WhenAllCell<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn read(&self) -> Option<Result<Vec<T>, E>> {
        self.slot.read()
    }

    fn await_cell(&self, callback: Callback<Vec<T>, E>) {
        self.slot.await_cell(callback);
    }

    fn block(&self) -> Result<Vec<T>, E> {
        self.slot.block()
    }
}
