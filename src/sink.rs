//! Where consumers report successful multiplications.

use std::{
    io::{self, Write},
    sync::{Mutex, PoisonError},
};

use crate::matrix::Matrix;

/// Receives every successfully multiplied pair.
///
/// Called from consumer threads, possibly concurrently.
pub trait PairSink: Send + Sync {
    fn report(&self, left: &Matrix, right: &Matrix, product: &Matrix);
}

/// Writes each pair as `left`, `X`, `right`, `=`, `product`, then a blank line.
pub struct WriterSink<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(out: W) -> Self {
        WriterSink {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl WriterSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

/// Renders one pair in the fixed three-block layout.
pub fn write_pair<W: Write + ?Sized>(
    out: &mut W,
    left: &Matrix,
    right: &Matrix,
    product: &Matrix,
) -> io::Result<()> {
    write!(out, "{}", left)?;
    writeln!(out, "    X")?;
    write!(out, "{}", right)?;
    writeln!(out, "    =")?;
    write!(out, "{}", product)?;
    writeln!(out)?;
    out.flush()
}

impl<W: Write + Send> PairSink for WriterSink<W> {
    fn report(&self, left: &Matrix, right: &Matrix, product: &Matrix) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = write_pair(&mut *out, left, right, product) {
            log::warn!("failed to write multiplication result: {}", e);
        }
    }
}

/// Discards every pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PairSink for NullSink {
    fn report(&self, _left: &Matrix, _right: &Matrix, _product: &Matrix) {}
}
