//! Errors reported by configuration checks and runs.

use std::fmt;

/// A configuration that cannot be run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    ZeroBufferSize,
    EmptySquare,
    /// Square side above [`MAX_SQUARE_DIM`](crate::matrix::MAX_SQUARE_DIM).
    SquareTooLarge,
}

impl ConfigError {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigError::ZeroBufferSize => "bounded buffer size must be at least 1",
            ConfigError::EmptySquare => "square matrix mode needs a size of at least 1",
            ConfigError::SquareTooLarge => "square matrix mode size exceeds the maximum of 256",
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for ConfigError {}

/// Why a run could not take place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunError {
    InvalidConfig(ConfigError),
    /// Not a single consumer thread could be started, so producers were never started either.
    NoConsumers,
    /// Worker threads panicked; their statistics are missing from the run.
    WorkerPanicked { producers: usize, consumers: usize },
    /// The producers that ran retired without meeting the quota.
    QuotaMissed { produced: usize, quota: usize },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::InvalidConfig(e) => write!(f, "invalid configuration: {}", e),
            RunError::NoConsumers => f.write_str("no consumer thread could be started"),
            RunError::WorkerPanicked {
                producers,
                consumers,
            } => write!(
                f,
                "{} producer(s) and {} consumer(s) panicked",
                producers, consumers
            ),
            RunError::QuotaMissed { produced, quota } => {
                write!(f, "produced {} of {} matrices", produced, quota)
            }
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::InvalidConfig(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        RunError::InvalidConfig(e)
    }
}

pub type RunResult<T> = Result<T, RunError>;
