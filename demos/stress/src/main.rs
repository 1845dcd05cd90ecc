//! Stress test - many timer tasks
//!
//! Schedules a large number of short-delay tasks, each incrementing a
//! shared counter, and measures throughput of the worker pool and the
//! timing wheel together.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use asyncrt::{Task, TaskTimerSource};
use asyncrt_core::error::Error;
use asyncrt_core::job::JobSink;
use asyncrt_runtime::{Scheduler, SchedulerConfig};

fn main() {
    println!("=== asyncrt Stress Test ===\n");

    let num_tasks: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(10_000);

    println!("Scheduling {} delayed tasks...", num_tasks);

    let scheduler = Arc::new(
        Scheduler::new(
            SchedulerConfig::new()
                .num_workers(8)
                .tick_size(Duration::from_millis(1))
                .wheel_sizes(vec![256, 256]),
        )
        .expect("scheduler starts"),
    );
    let sink: Arc<dyn JobSink> = Arc::clone(&scheduler) as Arc<dyn JobSink>;
    let timers: TaskTimerSource<Error> =
        TaskTimerSource::new(Arc::clone(&sink), scheduler.timer_source_shared());

    let completed = Arc::new(AtomicU64::new(0));
    let start = Instant::now();

    let mut tasks = Vec::with_capacity(num_tasks);
    for i in 0..num_tasks {
        let completed = Arc::clone(&completed);
        let delay = Duration::from_millis((i % 50) as u64);
        let task = timers.after(delay).map(move |_| {
            completed.fetch_add(1, Ordering::Relaxed);
        });
        tasks.push(task);

        if (i + 1) % 1000 == 0 {
            print!("\rScheduled: {}/{}", i + 1, num_tasks);
        }
    }

    let schedule_time = start.elapsed();
    println!("\n\nSchedule time: {:?}", schedule_time);

    println!("\nWaiting for completion...");
    let joined: Task<Vec<()>, Error> = Task::when_all(Arc::clone(&sink), tasks);
    let result = joined.block();

    let total_time = start.elapsed();
    let done = completed.load(Ordering::Relaxed) as usize;

    println!("\n=== Results ===");
    println!("Total tasks:   {}", num_tasks);
    println!("Completed:     {}", done);
    println!("All resolved:  {}", result.is_ok());
    println!("Schedule time: {:?}", schedule_time);
    println!("Total time:    {:?}", total_time);
    println!(
        "Throughput:    {:.0} tasks/sec",
        num_tasks as f64 / total_time.as_secs_f64()
    );

    println!("\n=== Stress Test Complete ===");
}
