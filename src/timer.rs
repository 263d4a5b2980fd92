use std::{
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

/// Per-worker timing for one run.
///
/// Slots `0..producers` belong to producers and `producers..` to consumers.
/// Each slot is only ever written by the worker that owns it, so the
/// per-slot locks are uncontended.
#[derive(Debug)]
pub struct Timer {
    /// Number of producer slots.
    pub(crate) producers: usize,

    /// Timer creation timestamp.
    pub(crate) init_timestamp: Instant,

    /// Set by [`Timer::finalize`] once every worker has been joined.
    pub(crate) completion_timestamp: Mutex<Option<Instant>>,

    /// Duration of each unit of work, indexed as `work_times[slot][unit]`.
    /// A unit is one produced matrix or one pairing search.
    pub(crate) work_times: Vec<Mutex<Vec<Duration>>>,
}

impl Timer {
    #[inline]
    pub fn new(producers: usize, consumers: usize) -> Self {
        Self {
            producers,
            init_timestamp: Instant::now(),
            completion_timestamp: Mutex::new(None),
            work_times: (0..producers + consumers)
                .map(|_| Mutex::new(Vec::new()))
                .collect(),
        }
    }

    #[inline]
    pub fn num_workers(&self) -> usize {
        self.work_times.len()
    }

    /// Slot index of producer `id`.
    #[inline]
    pub fn producer_slot(&self, id: usize) -> usize {
        id
    }

    /// Slot index of consumer `id`.
    #[inline]
    pub fn consumer_slot(&self, id: usize) -> usize {
        self.producers + id
    }

    /// Starts timing one unit of work. The duration is recorded when the
    /// returned span is dropped.
    #[inline]
    pub fn start(&self, slot: usize) -> WorkSpan<'_> {
        assert!(slot < self.num_workers(), "Timer slot out of bounds");
        WorkSpan {
            timer: self,
            slot,
            started: Instant::now(),
        }
    }

    fn record(&self, slot: usize, duration: Duration) {
        self.work_times[slot]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
    }

    /// Records the completion timestamp. Call after every worker has been joined.
    #[inline]
    pub fn finalize(&self) {
        *self
            .completion_timestamp
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    }

    /// Copies out everything recorded so far.
    pub fn get_timing_stats(&self) -> TimingStats {
        let completion = *self
            .completion_timestamp
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let completion_timestamp = completion.unwrap_or_else(Instant::now);

        TimingStats {
            producers: self.producers,
            init_timestamp: self.init_timestamp,
            completion_timestamp,
            work_times_per_worker: self
                .work_times
                .iter()
                .map(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
                .collect(),
        }
    }
}

/// One unit of work in progress; see [`Timer::start`].
#[must_use = "the span records its duration when dropped"]
pub struct WorkSpan<'a> {
    timer: &'a Timer,
    slot: usize,
    started: Instant,
}

impl Drop for WorkSpan<'_> {
    fn drop(&mut self) {
        self.timer.record(self.slot, self.started.elapsed());
    }
}

/// Timing statistics of a finished run.
#[derive(Debug, Clone)]
pub struct TimingStats {
    /// Number of producer slots; the rest are consumers.
    pub producers: usize,
    pub init_timestamp: Instant,
    pub completion_timestamp: Instant,
    /// Work durations organized by \[slot\]\[unit\]
    pub work_times_per_worker: Vec<Vec<Duration>>,
}

impl TimingStats {
    /// Total runtime from timer creation to completion.
    #[inline]
    pub fn total_runtime(&self) -> Duration {
        self.completion_timestamp
            .saturating_duration_since(self.init_timestamp)
    }

    #[inline]
    pub fn worker_total_work_time(&self, slot: usize) -> Option<Duration> {
        let times = self.work_times_per_worker.get(slot)?;
        Some(times.iter().sum())
    }

    #[inline]
    pub fn worker_unit_count(&self, slot: usize) -> usize {
        self.work_times_per_worker
            .get(slot)
            .map(|times| times.len())
            .unwrap_or(0)
    }

    #[inline]
    pub fn worker_average_work_time(&self, slot: usize) -> Option<Duration> {
        let times = self.work_times_per_worker.get(slot)?;
        if times.is_empty() {
            return None;
        }
        let total: Duration = times.iter().sum();
        Some(total / times.len() as u32)
    }

    fn worker_label(&self, slot: usize) -> String {
        if slot < self.producers {
            format!("Producer {}", slot)
        } else {
            format!("Consumer {}", slot - self.producers)
        }
    }

    /// Prints one column per worker with its unit count, total and average
    /// work time, and the share of the run spent working.
    pub fn plot(&self) {
        let num_workers = self.work_times_per_worker.len();
        if num_workers == 0 {
            println!("No timing data available to plot.");
            return;
        }

        let total_runtime = self.total_runtime();

        println!("\nWORKER TIME TABLE");
        println!("Time format: milliseconds (ms) with microsecond precision");
        println!("Total Runtime: {:.3} ms", duration_to_ms(total_runtime));
        println!("{}", "=".repeat(12 + num_workers * 13));

        print!("{:<12}", "");
        for slot in 0..num_workers {
            print!(" {:<12}", self.worker_label(slot));
        }
        println!();

        print!("{}", "-".repeat(12));
        for _ in 0..num_workers {
            print!(" {}", "-".repeat(12));
        }
        println!();

        print!("{:<12}", "Units");
        for slot in 0..num_workers {
            print!(" {:<12}", self.worker_unit_count(slot));
        }
        println!();

        print!("{:<12}", "Total Work");
        for slot in 0..num_workers {
            match self.worker_total_work_time(slot) {
                Some(total) => print!(" {:<12.3}", duration_to_ms(total)),
                None => print!(" {:<12}", "-"),
            }
        }
        println!();

        print!("{:<12}", "Avg / Unit");
        for slot in 0..num_workers {
            match self.worker_average_work_time(slot) {
                Some(avg) => print!(" {:<12.3}", duration_to_ms(avg)),
                None => print!(" {:<12}", "-"),
            }
        }
        println!();

        print!("{:<12}", "Work Ratio%");
        for slot in 0..num_workers {
            match self.worker_total_work_time(slot) {
                Some(work) if total_runtime.as_nanos() > 0 => {
                    let ratio = work.as_nanos() as f64 / total_runtime.as_nanos() as f64;
                    print!(" {:<12.1}", ratio * 100.0);
                }
                Some(_) => print!(" {:<12}", "0.0"),
                None => print!(" {:<12}", "-"),
            }
        }
        println!();

        println!("{}", "=".repeat(12 + num_workers * 13));
    }
}

/// Convert Duration to milliseconds as f64
#[inline]
fn duration_to_ms(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}
