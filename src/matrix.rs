//! Matrices handed from producers to consumers.
//!
//! A [`Matrix`] is deliberately not `Clone`: exactly one owner holds it at any
//! time, and moving it into or out of the buffer is the ownership hand-off.
//! Releasing a matrix is dropping it.

use std::fmt::{self, Display};

use rand::Rng;

/// Largest row or column count drawn in [`MatrixMode::Random`].
pub const MAX_RANDOM_DIM: usize = 4;

/// Largest side accepted for [`MatrixMode::Square`].
pub const MAX_SQUARE_DIM: usize = 256;

/// Largest element value produced by [`Matrix::random`]. Elements are drawn from `1..=MAX_ELEMENT`.
pub const MAX_ELEMENT: i64 = 10;

/// Shape selector for generated matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatrixMode {
    /// Rows and columns are each drawn from `1..=MAX_RANDOM_DIM`.
    #[default]
    Random,
    /// Every matrix is `n × n`.
    Square(usize),
}

impl MatrixMode {
    /// Maps the numeric mode selector: `0` is random shapes, `n > 0` is `n × n`.
    pub fn from_selector(selector: usize) -> Self {
        match selector {
            0 => MatrixMode::Random,
            n => MatrixMode::Square(n),
        }
    }

    /// The numeric selector this mode was built from.
    pub fn selector(self) -> usize {
        match self {
            MatrixMode::Random => 0,
            MatrixMode::Square(n) => n,
        }
    }
}

/// A dense row-major matrix of integers.
#[derive(Debug, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<i64>,
}

impl Matrix {
    /// Builds a matrix from row-major data.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero, `rows * cols` overflows, or
    /// `data.len() != rows * cols`.
    pub fn new(rows: usize, cols: usize, data: Vec<i64>) -> Self {
        assert!(rows > 0 && cols > 0, "matrix dimensions must be non-zero");
        let len = rows.checked_mul(cols);
        assert!(len.is_some(), "{}x{} matrix is too large", rows, cols);
        assert_eq!(
            Some(data.len()),
            len,
            "expected {}x{}={} elements",
            rows,
            cols,
            rows.wrapping_mul(cols)
        );
        Matrix { rows, cols, data }
    }

    /// A `rows × cols` matrix with every element set to `value`.
    pub fn filled(rows: usize, cols: usize, value: i64) -> Self {
        Self::new(rows, cols, vec![value; rows * cols])
    }

    /// Draws a matrix whose shape follows `mode` and whose elements are in `1..=MAX_ELEMENT`.
    ///
    /// # Panics
    ///
    /// Panics on `Square(0)` or a square side above [`MAX_SQUARE_DIM`];
    /// [`Config::validate`](crate::Config::validate) rejects both.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, mode: MatrixMode) -> Self {
        let (rows, cols) = match mode {
            MatrixMode::Random => (
                rng.gen_range(1..=MAX_RANDOM_DIM),
                rng.gen_range(1..=MAX_RANDOM_DIM),
            ),
            MatrixMode::Square(n) => {
                assert!(
                    (1..=MAX_SQUARE_DIM).contains(&n),
                    "square size {} outside 1..={}",
                    n,
                    MAX_SQUARE_DIM
                );
                (n, n)
            }
        };
        let data = (0..rows * cols)
            .map(|_| rng.gen_range(1..=MAX_ELEMENT))
            .collect();
        Self::new(rows, cols, data)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> i64 {
        debug_assert!(
            row < self.rows && col < self.cols,
            "index ({}, {}) out of bounds for {}x{} matrix",
            row,
            col,
            self.rows,
            self.cols
        );
        self.data[row * self.cols + col]
    }

    /// Sum of every element.
    pub fn sum(&self) -> i64 {
        self.data.iter().sum()
    }

    /// Whether `self × rhs` is defined.
    #[inline]
    pub fn can_multiply(&self, rhs: &Matrix) -> bool {
        self.cols == rhs.rows
    }

    /// Computes `self × rhs`, or `None` when `self.cols() != rhs.rows()`.
    ///
    /// The product is `self.rows() × rhs.cols()`. Uses i-k-j loop order so the
    /// inner loop walks both `rhs` and the output row contiguously.
    pub fn multiply(&self, rhs: &Matrix) -> Option<Matrix> {
        if !self.can_multiply(rhs) {
            return None;
        }

        let (m, k, n) = (self.rows, self.cols, rhs.cols);
        let mut out = vec![0i64; m * n];
        for i in 0..m {
            for p in 0..k {
                let a_ip = self.data[i * k + p];
                for j in 0..n {
                    out[i * n + j] += a_ip * rhs.data[p * n + j];
                }
            }
        }

        Some(Matrix::new(m, n, out))
    }
}

impl Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.data.chunks(self.cols) {
            write!(f, "|")?;
            for value in row {
                write!(f, " {:>3} ", value)?;
            }
            writeln!(f, "|")?;
        }
        Ok(())
    }
}

/// Where producers get their matrices from.
///
/// Implementations are called concurrently from every producer thread.
pub trait MatrixSource: Send + Sync {
    fn generate(&self) -> Matrix;
}

/// Random matrices drawn from each calling thread's own RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomMatrices {
    mode: MatrixMode,
}

impl RandomMatrices {
    pub fn new(mode: MatrixMode) -> Self {
        RandomMatrices { mode }
    }

    pub fn mode(&self) -> MatrixMode {
        self.mode
    }
}

impl MatrixSource for RandomMatrices {
    fn generate(&self) -> Matrix {
        Matrix::random(&mut rand::thread_rng(), self.mode)
    }
}
