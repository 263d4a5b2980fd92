//! Consumer workers: draw a base matrix, then draw candidates one at a time
//! until one can be multiplied with it.

use std::sync::MutexGuard;

use crate::{
    buffer::{BoundedBuffer, SharedBuffer},
    matrix::Matrix,
    sink::PairSink,
    stats::ProdConsStats,
};

#[cfg(feature = "profiler")]
use crate::timer::Timer;

/// One consumer thread's worth of work.
///
/// ## States
///
/// ```text
/// AWAIT_BASE -> SEARCHING -> PAIRED    -> AWAIT_BASE
///                         -> ABANDONED -> AWAIT_BASE -> TERMINATED
/// ```
///
/// The lock is held from taking the base until the search ends, except
/// while blocked waiting for a candidate. `TERMINATED` is only entered from
/// `AWAIT_BASE`, when the buffer is drained.
pub struct Consumer<'a> {
    shared: &'a SharedBuffer,
    sink: &'a dyn PairSink,

    #[cfg(feature = "profiler")]
    timer: Option<(&'a Timer, usize)>,
}

impl<'a> Consumer<'a> {
    pub fn new(shared: &'a SharedBuffer, sink: &'a dyn PairSink) -> Self {
        Consumer {
            shared,
            sink,
            #[cfg(feature = "profiler")]
            timer: None,
        }
    }

    /// Records the duration of every pairing search in `timer` at `slot`.
    #[cfg(feature = "profiler")]
    pub fn with_timer(mut self, timer: &'a Timer, slot: usize) -> Self {
        self.timer = Some((timer, slot));
        self
    }

    /// Consumes until the buffer is drained and every producer has retired.
    pub fn run(self) -> ProdConsStats {
        let mut stats = ProdConsStats::default();

        loop {
            let buffer = self.shared.lock();
            if self.shared.is_drained(&buffer) {
                // pass termination on to anyone still waiting
                self.shared.broadcast_drained();
                break;
            }

            let (buffer, base) = self.shared.take(buffer);
            let Some(base) = base else {
                continue;
            };
            stats.record(&base);

            #[cfg(feature = "profiler")]
            let _span = self.timer.map(|(timer, slot)| timer.start(slot));

            let (buffer, pair) = self.find_partner(buffer, &base, &mut stats);
            match pair {
                Some((candidate, product)) => {
                    stats.multiplied += 1;
                    self.sink.report(&base, &candidate, &product);
                }
                None => log::trace!(
                    "buffer drained, discarding unpaired {}x{} base",
                    base.rows(),
                    base.cols()
                ),
            }
            drop(buffer);
        }

        log::debug!(
            "consumer finished after {} matrices, {} multiplied (sum {})",
            stats.matrices,
            stats.multiplied,
            stats.sum
        );
        stats
    }

    /// Draws candidates until one multiplies with `base`.
    ///
    /// Incompatible candidates are released before the next draw. Returns the
    /// candidate and product, or `None` if the buffer drained first.
    fn find_partner(
        &self,
        mut buffer: MutexGuard<'a, BoundedBuffer>,
        base: &Matrix,
        stats: &mut ProdConsStats,
    ) -> (MutexGuard<'a, BoundedBuffer>, Option<(Matrix, Matrix)>) {
        loop {
            let (guard, candidate) = self.shared.take(buffer);
            buffer = guard;

            let Some(candidate) = candidate else {
                return (buffer, None);
            };
            stats.record(&candidate);

            match base.multiply(&candidate) {
                Some(product) => return (buffer, Some((candidate, product))),
                None => log::trace!(
                    "{}x{} cannot multiply {}x{}, discarding candidate",
                    base.rows(),
                    base.cols(),
                    candidate.rows(),
                    candidate.cols()
                ),
            }
        }
    }
}

/// Runs a consumer to completion and returns its statistics.
pub fn consume(shared: &SharedBuffer, sink: &dyn PairSink) -> ProdConsStats {
    Consumer::new(shared, sink).run()
}
