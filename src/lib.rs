//! # pcmatrix - Producer/Consumer Matrix Pairing
//!
//! A fixed pool of producer threads generates random matrices into one shared
//! bounded buffer; an equally sized pool of consumer threads drains it, holding
//! one "base" matrix and drawing candidates one at a time until one can be
//! multiplied with it.
//!
//! ## Key Guarantees
//!
//! - **Conservation**: every produced matrix is removed exactly once, so the
//!   producers' and consumers' matrix counts and element sums match
//! - **Bounded**: the buffer never holds more than its capacity
//! - **Termination**: all workers return once the quota has been produced and
//!   the buffer drained, for any worker count, capacity and quota
//! - **Move-only hand-off**: a [`Matrix`] is owned by exactly one buffer slot or
//!   worker at a time and released exactly once
//!
//! ## Usage Pattern
//!
//! ```rust,no_run
//! use pcmatrix::{Config, MatrixMode, RandomMatrices, WriterSink};
//!
//! let config = Config {
//!     workers: 2,
//!     buffer_size: 10,
//!     matrices: 100,
//!     mode: MatrixMode::Random,
//! };
//!
//! let source = RandomMatrices::new(config.mode);
//! let sink = WriterSink::stdout();
//! let summary = pcmatrix::run(&config, &source, &sink).expect("run failed");
//!
//! assert!(summary.is_balanced());
//! println!("multiplied {} pairs", summary.multiplied());
//! ```
//!
//! Workers can also be driven directly against a [`SharedBuffer`]:
//!
//! ```rust,no_run
//! use pcmatrix::{consume, produce, NullSink, RandomMatrices, SharedBuffer};
//! use std::sync::Arc;
//! use std::thread;
//!
//! // capacity 4, quota 20, one producer
//! let shared = Arc::new(SharedBuffer::new(4, 20, 1));
//!
//! let buf = Arc::clone(&shared);
//! let producer = thread::spawn(move || produce(&buf, &RandomMatrices::default()));
//! let buf = Arc::clone(&shared);
//! let consumer = thread::spawn(move || consume(&buf, &NullSink));
//!
//! let produced = producer.join().unwrap();
//! let consumed = consumer.join().unwrap();
//! assert_eq!(produced.sum, consumed.sum);
//! ```
//!
//! ## Thread Safety
//!
//! - One mutex guards the ring, the produced counter and the producers-finished counter
//! - Producers wait on "space available", consumers on "data available"
//! - Every wait re-checks its condition on wake-up, so spurious wake-ups are harmless
//! - Termination is a single predicate: buffer empty and every producer retired


pub mod buffer;
pub mod config;
pub mod consumer;
pub mod coordinator;
pub mod error;
pub mod matrix;
pub mod producer;
pub mod sink;
pub mod stats;
#[cfg(feature = "profiler")]
pub mod timer;

pub use buffer::{BoundedBuffer, BufferSnapshot, SharedBuffer};
pub use config::Config;
pub use consumer::{Consumer, consume};
pub use coordinator::run;
pub use error::{ConfigError, RunError, RunResult};
pub use matrix::{Matrix, MatrixMode, MatrixSource, RandomMatrices};
pub use producer::{Producer, produce};
pub use sink::{NullSink, PairSink, WriterSink};
pub use stats::{ProdConsStats, RunSummary};
#[cfg(feature = "profiler")]
pub use timer::{Timer, TimingStats};
