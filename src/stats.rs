//! Per-worker statistics and their aggregation.

use std::ops::AddAssign;

use crate::matrix::Matrix;

/// What one worker did over its lifetime.
///
/// Created zeroed when the worker starts, touched only by that worker, and
/// returned to the coordinator when the worker finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProdConsStats {
    /// Matrices produced (producers) or removed from the buffer (consumers).
    pub matrices: usize,
    /// Successful multiplications. Always 0 for producers.
    pub multiplied: usize,
    /// Sum of every element of every matrix handled.
    pub sum: i64,
}

impl ProdConsStats {
    /// Counts `matrix` as handled.
    #[inline]
    pub fn record(&mut self, matrix: &Matrix) {
        self.matrices += 1;
        self.sum += matrix.sum();
    }
}

impl AddAssign for ProdConsStats {
    fn add_assign(&mut self, rhs: Self) {
        self.matrices += rhs.matrices;
        self.multiplied += rhs.multiplied;
        self.sum += rhs.sum;
    }
}

impl std::iter::Sum for ProdConsStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(ProdConsStats::default(), |mut total, stats| {
            total += stats;
            total
        })
    }
}

/// Aggregated statistics of one complete run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Totals over every producer that ran.
    pub produced: ProdConsStats,
    /// Totals over every consumer that ran.
    pub consumed: ProdConsStats,
    /// Producers whose statistics were collected.
    pub producers: usize,
    /// Consumers whose statistics were collected.
    pub consumers: usize,

    #[cfg(feature = "profiler")]
    pub timing: Option<crate::timer::TimingStats>,
}

impl RunSummary {
    /// Everything produced was consumed: same count and same element sum.
    pub fn is_balanced(&self) -> bool {
        self.produced.matrices == self.consumed.matrices && self.produced.sum == self.consumed.sum
    }

    #[inline]
    pub fn multiplied(&self) -> usize {
        self.consumed.multiplied
    }
}
