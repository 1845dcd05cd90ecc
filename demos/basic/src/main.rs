//! Basic asyncrt example
//!
//! Demonstrates spawning tasks, chaining them with `map`/`bind`, and
//! racing/joining with `when_any`/`when_all`.

use std::sync::Arc;
use std::time::Duration;

use asyncrt::{Task, TaskTimerSource};
use asyncrt_core::error::Error;
use asyncrt_core::job::JobSink;
use asyncrt_runtime::{Scheduler, SchedulerConfig};

fn main() {
    println!("=== asyncrt Basic Example ===\n");

    let scheduler = Arc::new(
        Scheduler::new(SchedulerConfig::new().num_workers(4)).expect("scheduler starts"),
    );
    let sink: Arc<dyn JobSink> = Arc::clone(&scheduler) as Arc<dyn JobSink>;

    println!("Spawning a task and mapping its result...");
    let doubled = Task::<i32, Error>::new(Arc::clone(&sink), || Ok(21)).map(|v| v * 2);
    println!("map result: {:?}", doubled.block());

    println!("\nChaining a task with bind...");
    let bind_sink = Arc::clone(&sink);
    let chained = Task::<i32, Error>::new(Arc::clone(&sink), || Ok(10))
        .bind(move |v| Task::new(bind_sink.clone(), move || Ok(v + 1)));
    println!("bind result: {:?}", chained.block());

    println!("\nRacing three delayed tasks with when_any...");
    let timers: TaskTimerSource<Error> =
        TaskTimerSource::new(Arc::clone(&sink), scheduler.timer_source_shared());
    let racers = vec![
        timers.after(Duration::from_millis(30)).map(|_| 1),
        timers.after(Duration::from_millis(10)).map(|_| 2),
        timers.after(Duration::from_millis(50)).map(|_| 3),
    ];
    let winner = Task::when_any(Arc::clone(&sink), racers);
    println!("when_any winner: {:?}", winner.block());

    println!("\nJoining three delayed tasks with when_all...");
    let joiners = vec![
        timers.after(Duration::from_millis(5)).map(|_| 1),
        timers.after(Duration::from_millis(15)).map(|_| 2),
        timers.after(Duration::from_millis(25)).map(|_| 3),
    ];
    let all = Task::when_all(Arc::clone(&sink), joiners);
    println!("when_all results: {:?}", all.block());

    println!("\n=== Example Complete ===");
}
