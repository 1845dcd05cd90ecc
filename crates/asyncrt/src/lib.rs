//! # asyncrt
//!
//! User-facing task combinators over the asyncrt runtime: `Task<T, E>`
//! supports `map`, `bind`, `when_any` and `when_all`, and three adapters
//! mint tasks from the scheduler's own producers.
//!
//! ```ignore
//! use std::sync::Arc;
//! use asyncrt_runtime::{Scheduler, SchedulerConfig};
//! use asyncrt::task::Task;
//!
//! let scheduler = Arc::new(Scheduler::new(SchedulerConfig::from_env())?);
//! let sink: Arc<dyn asyncrt_core::job::JobSink> = scheduler.clone();
//! let task = Task::<i32, asyncrt_core::error::Error>::new(sink, || Ok(41)).map(|v| v + 1);
//! assert_eq!(task.block(), Ok(42));
//! ```
//!
//! ## Modules
//!
//! - `task` - `Task<T, E>` and its combinators
//! - `value_source` - `TaskValueSource<T, E>`, a completion-source adapter
//! - `timer_source` - `TaskTimerSource`, mints delay tasks
//! - `io_source` - `TaskIOSource`, mints file-read tasks

pub mod io_source;
pub mod task;
pub mod timer_source;
pub mod value_source;

pub use io_source::TaskIOSource;
pub use task::Task;
pub use timer_source::TaskTimerSource;
pub use value_source::TaskValueSource;
