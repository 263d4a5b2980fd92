//! The bounded buffer shared by every producer and consumer.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::matrix::Matrix;

/// A fixed-capacity FIFO ring of matrices plus the production counters.
///
/// `BoundedBuffer` does no locking and never blocks. It is only reachable
/// through the guard handed out by [`SharedBuffer::lock`], so every read and
/// write of the ring, the produced counter and the producers-finished counter
/// happens under one lock.
///
/// ## Invariants
///
/// - `0 <= len <= capacity`
/// - `len` grows only in [`insert`](Self::insert) and shrinks only in [`remove`](Self::remove)
/// - `produced` and `producers_finished` never decrease
#[derive(Debug)]
pub struct BoundedBuffer {
    /// Ring storage. A slot is `Some` exactly when it holds a live matrix.
    slots: Vec<Option<Matrix>>,

    /// Next slot to fill.
    fill: usize,

    /// Next slot to drain.
    drain: usize,

    /// Matrices currently held.
    len: usize,

    /// Matrices ever inserted.
    produced: usize,

    /// Producers that have permanently stopped producing.
    producers_finished: usize,

    /// Largest `len` ever observed.
    peak: usize,
}

impl BoundedBuffer {
    /// Creates an empty buffer holding at most `capacity` matrices.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "buffer capacity must be greater than 0");

        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        BoundedBuffer {
            slots,
            fill: 0,
            drain: 0,
            len: 0,
            produced: 0,
            producers_finished: 0,
            peak: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Total matrices ever inserted.
    #[inline]
    pub fn produced(&self) -> usize {
        self.produced
    }

    #[inline]
    pub fn producers_finished(&self) -> usize {
        self.producers_finished
    }

    /// Stores `matrix` at the fill position and counts it as produced.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is full. Callers wait for space first.
    pub fn insert(&mut self, matrix: Matrix) {
        assert!(!self.is_full(), "insert into a full buffer");

        let previous = self.slots[self.fill].replace(matrix);
        assert!(previous.is_none(), "fill slot {} still occupied", self.fill);

        self.fill = (self.fill + 1) % self.capacity();
        self.len += 1;
        self.produced += 1;
        self.peak = self.peak.max(self.len);
    }

    /// Takes the oldest matrix, or `None` if the buffer is empty. Never blocks.
    pub fn remove(&mut self) -> Option<Matrix> {
        if self.is_empty() {
            return None;
        }

        let matrix = self.slots[self.drain].take();
        assert!(matrix.is_some(), "drain slot {} is empty", self.drain);

        self.drain = (self.drain + 1) % self.capacity();
        self.len -= 1;
        matrix
    }

    pub(crate) fn mark_producer_finished(&mut self) {
        self.producers_finished += 1;
    }

    pub fn snapshot(&self) -> BufferSnapshot {
        BufferSnapshot {
            len: self.len,
            capacity: self.capacity(),
            produced: self.produced,
            producers_finished: self.producers_finished,
            peak: self.peak,
        }
    }
}

/// A point-in-time copy of a buffer's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSnapshot {
    pub len: usize,
    pub capacity: usize,
    pub produced: usize,
    pub producers_finished: usize,
    /// High-water mark of `len`.
    pub peak: usize,
}

/// The monitor around a [`BoundedBuffer`]: one lock and two conditions.
///
/// ## Synchronization Protocol
///
/// - Producers wait on `space_available` while the buffer is full and the
///   quota is not yet reached.
/// - Consumers wait on `data_available` while the buffer is empty and not
///   every producer has finished.
/// - Every insert wakes one consumer, every removal wakes one producer, and
///   every producer retirement wakes everyone so waiters re-check the
///   termination predicate.
///
/// A single `SharedBuffer` is created per run and shared by reference with
/// every worker; independent instances never interact.
#[derive(Debug)]
pub struct SharedBuffer {
    state: Mutex<BoundedBuffer>,
    space_available: Condvar,
    data_available: Condvar,

    /// Matrices to produce in total across all producers.
    quota: usize,

    /// Producers that will eventually retire.
    producers: usize,
}

impl SharedBuffer {
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize, quota: usize, producers: usize) -> Self {
        SharedBuffer {
            state: Mutex::new(BoundedBuffer::with_capacity(capacity)),
            space_available: Condvar::new(),
            data_available: Condvar::new(),
            quota,
            producers,
        }
    }

    #[inline]
    pub fn quota(&self) -> usize {
        self.quota
    }

    #[inline]
    pub fn producers(&self) -> usize {
        self.producers
    }

    /// Acquires the buffer lock.
    ///
    /// A poisoned lock is recovered: every mutation of the buffer completes
    /// before anything that can panic runs, so the state is still consistent.
    pub fn lock(&self) -> MutexGuard<'_, BoundedBuffer> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True once the global production quota has been met.
    #[inline]
    pub fn quota_reached(&self, buffer: &BoundedBuffer) -> bool {
        buffer.produced() >= self.quota
    }

    /// True once nothing will ever be removed again: the buffer is empty and
    /// every producer has retired.
    #[inline]
    pub fn is_drained(&self, buffer: &BoundedBuffer) -> bool {
        buffer.is_empty() && buffer.producers_finished() == self.producers
    }

    /// Blocks until the buffer has room or the quota has been reached.
    pub(crate) fn wait_for_space<'a>(
        &'a self,
        guard: MutexGuard<'a, BoundedBuffer>,
    ) -> MutexGuard<'a, BoundedBuffer> {
        self.space_available
            .wait_while(guard, |buffer| {
                buffer.is_full() && !self.quota_reached(buffer)
            })
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until the buffer holds a matrix or is drained for good.
    pub(crate) fn wait_for_data<'a>(
        &'a self,
        guard: MutexGuard<'a, BoundedBuffer>,
    ) -> MutexGuard<'a, BoundedBuffer> {
        self.data_available
            .wait_while(guard, |buffer| {
                buffer.is_empty() && !self.is_drained(buffer)
            })
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits for data and takes the next matrix, waking one producer.
    ///
    /// Returns the guard alongside `None` only when the buffer is drained.
    pub(crate) fn take<'a>(
        &'a self,
        guard: MutexGuard<'a, BoundedBuffer>,
    ) -> (MutexGuard<'a, BoundedBuffer>, Option<Matrix>) {
        let mut guard = self.wait_for_data(guard);
        let matrix = guard.remove();
        if matrix.is_some() {
            self.space_available.notify_one();
        }
        (guard, matrix)
    }

    /// Inserts under an already-held lock and wakes one consumer.
    pub(crate) fn put(&self, buffer: &mut BoundedBuffer, matrix: Matrix) {
        buffer.insert(matrix);
        self.data_available.notify_one();
    }

    /// Passes the termination signal on to every consumer still waiting.
    pub(crate) fn broadcast_drained(&self) {
        self.data_available.notify_all();
    }

    /// Records that one producer has permanently stopped producing.
    ///
    /// Called exactly once per producer, including producers the coordinator
    /// failed to start.
    pub fn producer_finished(&self) {
        let mut buffer = self.lock();
        buffer.mark_producer_finished();
        debug_assert!(buffer.producers_finished() <= self.producers);
        log::trace!(
            "producer retired ({}/{})",
            buffer.producers_finished(),
            self.producers
        );
        self.data_available.notify_all();
        self.space_available.notify_all();
    }

    pub fn snapshot(&self) -> BufferSnapshot {
        self.lock().snapshot()
    }
}
