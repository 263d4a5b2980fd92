use anyhow::{Context, bail};
use clap::Parser;
use env_logger::Env;
use pcmatrix::{
    Config, MatrixMode, RandomMatrices, WriterSink,
    config::{DEFAULT_BUFFER_SIZE, DEFAULT_MATRICES, DEFAULT_WORKERS},
};

/// Produce random matrices in parallel and consume them in multipliable pairs.
#[derive(Parser, Debug)]
#[command(name = "pcmatrix", version, about)]
struct Cli {
    /// Number of producer threads, and of consumer threads
    workers: Option<usize>,

    /// Capacity of the shared bounded buffer
    buffer_size: Option<usize>,

    /// Total number of matrices to produce
    matrices: Option<usize>,

    /// Matrix shape: 0 for random shapes, n for n x n
    mode: Option<usize>,
}

impl Cli {
    fn uses_defaults(&self) -> bool {
        self.workers.is_none()
            && self.buffer_size.is_none()
            && self.matrices.is_none()
            && self.mode.is_none()
    }

    fn config(&self) -> Config {
        Config {
            workers: self.workers.unwrap_or(DEFAULT_WORKERS),
            buffer_size: self.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE),
            matrices: self.matrices.unwrap_or(DEFAULT_MATRICES),
            mode: MatrixMode::from_selector(self.mode.unwrap_or(0)),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = cli.config();

    println!(
        "{}: worker_threads={} bounded_buffer_size={} matrices={} matrix_mode={}",
        if cli.uses_defaults() { "USING DEFAULTS" } else { "USING" },
        config.workers,
        config.buffer_size,
        config.matrices,
        config.mode.selector()
    );
    println!(
        "Producing {} matrices in mode {}.",
        config.matrices,
        config.mode.selector()
    );
    println!("Using a shared buffer of size={}", config.buffer_size);
    println!("With {} producer and consumer thread(s).", config.workers);
    println!();

    let source = RandomMatrices::new(config.mode);
    let sink = WriterSink::stdout();
    let summary = pcmatrix::run(&config, &source, &sink).context("run failed")?;

    println!(
        "Sum of Matrix elements --> Produced={} = Consumed={}",
        summary.produced.sum, summary.consumed.sum
    );
    println!(
        "Matrices produced={} consumed={} multiplied={}",
        summary.produced.matrices,
        summary.consumed.matrices,
        summary.multiplied()
    );

    #[cfg(feature = "profiler")]
    if let Some(timing) = &summary.timing {
        timing.plot();
    }

    if !summary.is_balanced() {
        bail!(
            "produced and consumed totals differ ({} producer(s) and {} consumer(s) reported)",
            summary.producers,
            summary.consumers
        );
    }

    Ok(())
}
