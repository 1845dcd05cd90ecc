//! Hierarchical timing wheel
//!
//! Each wheel in the hierarchy can be held entirely within a single bucket
//! of the wheel above it: wheel `k`'s `ticks_per_bucket` equals the total
//! tick span of every wheel below it. Scheduling walks outward from the
//! innermost wheel until it finds one whose span covers the requested
//! delay; advancing drains the innermost wheel's completed buckets and,
//! whenever it wraps, cascades the next bucket of the wheel above down
//! into it.

use std::time::{Duration, Instant};

/// One timer, tagged with its extra offset into the bucket it's stored in.
///
/// The offset exists purely for book-keeping: as a timer cascades down
/// through the hierarchy it needs to know how many ticks past its current
/// bucket boundary it's still scheduled for.
struct TimerEntry<T> {
    tick_offset_into_bucket: u64,
    timer: T,
}

struct Wheel<T> {
    num_buckets: usize,
    ticks_per_bucket: u64,
    curr_bucket_index: usize,
    buckets: Vec<Vec<TimerEntry<T>>>,
}

/// A cascaded timing wheel. `T` is the payload carried per scheduled
/// timer — typically a continuation to run once the delay elapses.
pub struct HierarchicalTimingWheel<T> {
    tick_size: Duration,
    last_advancement_time: Instant,
    wheels: Vec<Wheel<T>>,
}

impl<T> HierarchicalTimingWheel<T> {
    /// Build a wheel hierarchy with the given tick size and per-level
    /// bucket counts, innermost (finest-grained) level first.
    pub fn new(tick_size: Duration, wheel_sizes: &[usize]) -> Self {
        let mut wheels = Vec::with_capacity(wheel_sizes.len());
        let mut total_ticks_in_last_wheel: u64 = 1;
        for &num_buckets in wheel_sizes {
            wheels.push(Wheel {
                num_buckets,
                ticks_per_bucket: total_ticks_in_last_wheel,
                curr_bucket_index: 0,
                buckets: (0..num_buckets).map(|_| Vec::new()).collect(),
            });
            total_ticks_in_last_wheel *= num_buckets as u64;
        }

        HierarchicalTimingWheel {
            tick_size,
            last_advancement_time: Instant::now(),
            wheels,
        }
    }

    /// Schedule `timer` to fire after `duration_from_last_advancement`,
    /// measured from the last call to [`advance`](Self::advance) (or
    /// construction, if `advance` hasn't run yet).
    pub fn schedule(&mut self, duration_from_last_advancement: Duration, timer: T) {
        let ticks_to_fit = (duration_from_last_advancement.as_nanos() / self.tick_size.as_nanos().max(1)) as u64;
        let (wheel_idx, ticks_left) = self.determine_timer_wheel(ticks_to_fit);

        let wheel = &mut self.wheels[wheel_idx];
        let timer_bucket_index =
            (wheel.curr_bucket_index + (ticks_left / wheel.ticks_per_bucket) as usize) % wheel.num_buckets;
        let tick_offset_into_bucket = ticks_left % wheel.ticks_per_bucket;
        wheel.buckets[timer_bucket_index].push(TimerEntry {
            tick_offset_into_bucket,
            timer,
        });
    }

    /// Drain every bucket whose deadline has passed since the last
    /// advancement, returning their timers. A no-op (empty result) if less
    /// than one tick has elapsed.
    pub fn advance(&mut self) -> Vec<T> {
        let now = Instant::now();
        if now.duration_since(self.last_advancement_time) < self.tick_size {
            return Vec::new();
        }

        let mut resolved = Vec::new();
        let start = self.wheels[0].curr_bucket_index;
        let end = self.determine_new_bottom_wheel_index(now);

        for raw_index in start..end {
            let lowest = &mut self.wheels[0];
            let i = raw_index % lowest.num_buckets;
            for entry in lowest.buckets[i].drain(..) {
                resolved.push(entry.timer);
            }
            lowest.curr_bucket_index = (lowest.curr_bucket_index + 1) % lowest.num_buckets;
            if lowest.curr_bucket_index == 0 {
                self.load_timers_from_wheel(1);
            }
        }

        self.last_advancement_time = now;
        resolved
    }

    fn load_timers_from_wheel(&mut self, wheel_num: usize) {
        if wheel_num == self.wheels.len() || wheel_num == 0 {
            return;
        }

        let (below, above) = {
            let (left, right) = self.wheels.split_at_mut(wheel_num);
            (&mut left[wheel_num - 1], &mut right[0])
        };

        let i = above.curr_bucket_index;
        for entry in above.buckets[i].drain(..) {
            let bucket_index =
                (below.curr_bucket_index + (entry.tick_offset_into_bucket / below.ticks_per_bucket) as usize)
                    % below.num_buckets;
            let new_offset = entry.tick_offset_into_bucket - bucket_index as u64 * below.ticks_per_bucket;
            below.buckets[bucket_index].push(TimerEntry {
                tick_offset_into_bucket: new_offset,
                timer: entry.timer,
            });
        }

        above.curr_bucket_index = (above.curr_bucket_index + 1) % above.num_buckets;
        if above.curr_bucket_index == 0 {
            self.load_timers_from_wheel(wheel_num + 1);
        }
    }

    fn determine_timer_wheel(&self, ticks_since_last_advancement: u64) -> (usize, u64) {
        let mut ticks_to_fit = ticks_since_last_advancement;
        let mut curr_wheel = 0;

        let can_fit = |wheels: &[Wheel<T>], wheel: usize, ticks_to_fit: u64| -> bool {
            if wheel == wheels.len() - 1 {
                return true;
            }
            let w = &wheels[wheel];
            w.curr_bucket_index + ((ticks_to_fit / w.ticks_per_bucket) as usize) < w.num_buckets
        };

        while !can_fit(&self.wheels, curr_wheel, ticks_to_fit) {
            let w = &self.wheels[curr_wheel];
            ticks_to_fit -= w.num_buckets as u64 * w.ticks_per_bucket;
            curr_wheel += 1;
        }

        (curr_wheel, ticks_to_fit)
    }

    fn determine_new_bottom_wheel_index(&self, now: Instant) -> usize {
        let lowest = &self.wheels[0];
        let elapsed_ticks =
            (now.duration_since(self.last_advancement_time).as_nanos() / self.tick_size.as_nanos().max(1)) as usize;
        lowest.curr_bucket_index + elapsed_ticks
    }
}
