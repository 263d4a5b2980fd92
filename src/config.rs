//! Run parameters and their defaults.

use crate::{
    error::ConfigError,
    matrix::{MAX_SQUARE_DIM, MatrixMode},
};

/// Producer/consumer pairs started by default.
pub const DEFAULT_WORKERS: usize = 1;
/// Default bounded buffer capacity.
pub const DEFAULT_BUFFER_SIZE: usize = 200;
/// Default number of matrices produced per run.
pub const DEFAULT_MATRICES: usize = 1200;

/// Run parameters, fixed before any worker starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Number of producers, and separately of consumers.
    pub workers: usize,
    /// Capacity of the bounded buffer.
    pub buffer_size: usize,
    /// Matrices produced in total across all producers.
    pub matrices: usize,
    /// Shape of generated matrices.
    pub mode: MatrixMode,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            workers: DEFAULT_WORKERS,
            buffer_size: DEFAULT_BUFFER_SIZE,
            matrices: DEFAULT_MATRICES,
            mode: MatrixMode::Random,
        }
    }
}

impl Config {
    /// Zero workers or zero matrices are valid and make for an empty run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_size == 0 {
            return Err(ConfigError::ZeroBufferSize);
        }
        match self.mode {
            MatrixMode::Square(0) => return Err(ConfigError::EmptySquare),
            MatrixMode::Square(n) if n > MAX_SQUARE_DIM => {
                return Err(ConfigError::SquareTooLarge);
            }
            _ => {}
        }
        Ok(())
    }
}
