//! Producer workers: fill the buffer until the global quota is met.

use crate::{buffer::SharedBuffer, matrix::MatrixSource, stats::ProdConsStats};

#[cfg(feature = "profiler")]
use crate::timer::Timer;

/// One producer thread's worth of work.
///
/// Every producer decides on its own when to stop: the buffer's produced
/// counter is the single source of truth for the quota, so no producer
/// coordinates with another.
pub struct Producer<'a> {
    shared: &'a SharedBuffer,
    source: &'a dyn MatrixSource,

    #[cfg(feature = "profiler")]
    timer: Option<(&'a Timer, usize)>,
}

impl<'a> Producer<'a> {
    pub fn new(shared: &'a SharedBuffer, source: &'a dyn MatrixSource) -> Self {
        Producer {
            shared,
            source,
            #[cfg(feature = "profiler")]
            timer: None,
        }
    }

    /// Records the duration of every produced matrix in `timer` at `slot`.
    #[cfg(feature = "profiler")]
    pub fn with_timer(mut self, timer: &'a Timer, slot: usize) -> Self {
        self.timer = Some((timer, slot));
        self
    }

    /// Produces until the quota is reached, then retires.
    ///
    /// The quota is checked before waiting for space and again after every
    /// wake-up, since another producer may have met it in the meantime.
    pub fn run(self) -> ProdConsStats {
        let _retirement = Retirement(self.shared);
        let mut stats = ProdConsStats::default();

        loop {
            let mut buffer = self.shared.lock();
            if self.shared.quota_reached(&buffer) {
                break;
            }

            buffer = self.shared.wait_for_space(buffer);
            if self.shared.quota_reached(&buffer) {
                break;
            }

            #[cfg(feature = "profiler")]
            let _span = self.timer.map(|(timer, slot)| timer.start(slot));

            let matrix = self.source.generate();
            stats.record(&matrix);
            log::trace!(
                "producing {}x{} matrix ({} buffered)",
                matrix.rows(),
                matrix.cols(),
                buffer.len() + 1
            );
            self.shared.put(&mut buffer, matrix);
        }

        log::debug!(
            "producer finished after {} matrices (sum {})",
            stats.matrices,
            stats.sum
        );
        stats
    }
}

/// Announces the producer's retirement when dropped, on return or unwind.
struct Retirement<'a>(&'a SharedBuffer);

impl Drop for Retirement<'_> {
    fn drop(&mut self) {
        self.0.producer_finished();
    }
}

/// Runs a producer to completion and returns its statistics.
pub fn produce(shared: &SharedBuffer, source: &dyn MatrixSource) -> ProdConsStats {
    Producer::new(shared, source).run()
}
