//! Starts the workers of one run, joins them and aggregates their statistics.

use std::{io, thread};

use crate::{
    buffer::SharedBuffer,
    config::Config,
    consumer::Consumer,
    error::{RunError, RunResult},
    matrix::MatrixSource,
    producer::Producer,
    sink::PairSink,
    stats::RunSummary,
};

#[cfg(feature = "profiler")]
use crate::timer::Timer;

/// Runs `config.workers` producers and as many consumers around one shared
/// buffer until `config.matrices` matrices have been produced and drained.
///
/// Consumers are started first. A worker thread that fails to start is
/// logged and left out; a producer that never started is retired on its
/// behalf so consumers can still terminate. If no consumer starts at all,
/// no producer is started and [`RunError::NoConsumers`] is returned.
///
/// A worker that panics fails the run with [`RunError::WorkerPanicked`]
/// once every other worker has been joined. If the producers that did run
/// retire short of the quota, the run fails with [`RunError::QuotaMissed`].
pub fn run(
    config: &Config,
    source: &dyn MatrixSource,
    sink: &dyn PairSink,
) -> RunResult<RunSummary> {
    run_gated(config, source, sink, &|_, _| Ok(()))
}

/// Which pool a worker thread belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Producer,
    Consumer,
}

/// [`run`], with `gate` consulted before each worker thread is spawned. An
/// error from `gate` is handled exactly like a failed spawn.
pub(crate) fn run_gated(
    config: &Config,
    source: &dyn MatrixSource,
    sink: &dyn PairSink,
    gate: &dyn Fn(Role, usize) -> io::Result<()>,
) -> RunResult<RunSummary> {
    config.validate()?;

    let shared = SharedBuffer::new(config.buffer_size, config.matrices, config.workers);

    #[cfg(feature = "profiler")]
    let timer = Timer::new(config.workers, config.workers);

    log::debug!(
        "starting {} producer/consumer pair(s), buffer size {}, {} matrices, mode {}",
        config.workers,
        config.buffer_size,
        config.matrices,
        config.mode.selector()
    );

    #[allow(unused_mut)]
    let mut summary = thread::scope(|scope| -> RunResult<RunSummary> {
        let shared = &shared;
        #[cfg(feature = "profiler")]
        let timer = &timer;

        let mut consumers = Vec::with_capacity(config.workers);
        for id in 0..config.workers {
            let consumer = Consumer::new(shared, sink);
            #[cfg(feature = "profiler")]
            let consumer = consumer.with_timer(timer, timer.consumer_slot(id));

            let spawned = gate(Role::Consumer, id).and_then(|()| {
                thread::Builder::new()
                    .name(format!("consumer-{}", id))
                    .spawn_scoped(scope, move || consumer.run())
            });
            match spawned {
                Ok(handle) => {
                    log::debug!("started consumer {}", id);
                    consumers.push(handle);
                }
                Err(e) => log::error!("failed to start consumer {}: {}", id, e),
            }
        }

        if consumers.is_empty() && config.workers > 0 {
            return Err(RunError::NoConsumers);
        }

        let mut producers = Vec::with_capacity(config.workers);
        for id in 0..config.workers {
            let producer = Producer::new(shared, source);
            #[cfg(feature = "profiler")]
            let producer = producer.with_timer(timer, timer.producer_slot(id));

            let spawned = gate(Role::Producer, id).and_then(|()| {
                thread::Builder::new()
                    .name(format!("producer-{}", id))
                    .spawn_scoped(scope, move || producer.run())
            });
            match spawned {
                Ok(handle) => {
                    log::debug!("started producer {}", id);
                    producers.push(handle);
                }
                Err(e) => {
                    log::error!("failed to start producer {}: {}", id, e);
                    shared.producer_finished();
                }
            }
        }

        let mut summary = RunSummary::default();
        let (mut producers_panicked, mut consumers_panicked) = (0, 0);
        for handle in producers {
            let name = handle.thread().name().unwrap_or("producer").to_owned();
            match handle.join() {
                Ok(stats) => {
                    summary.produced += stats;
                    summary.producers += 1;
                }
                Err(_) => {
                    log::error!("{} panicked, its statistics are lost", name);
                    producers_panicked += 1;
                }
            }
        }
        for handle in consumers {
            let name = handle.thread().name().unwrap_or("consumer").to_owned();
            match handle.join() {
                Ok(stats) => {
                    summary.consumed += stats;
                    summary.consumers += 1;
                }
                Err(_) => {
                    log::error!("{} panicked, its statistics are lost", name);
                    consumers_panicked += 1;
                }
            }
        }

        if producers_panicked > 0 || consumers_panicked > 0 {
            return Err(RunError::WorkerPanicked {
                producers: producers_panicked,
                consumers: consumers_panicked,
            });
        }
        check_quota(config, &summary)?;

        Ok(summary)
    })?;

    #[cfg(feature = "profiler")]
    {
        timer.finalize();
        summary.timing = Some(timer.get_timing_stats());
    }

    let snapshot = shared.snapshot();
    log::debug!(
        "run complete: produced {} (sum {}), consumed {} (sum {}), multiplied {}, buffer peak {}/{}",
        summary.produced.matrices,
        summary.produced.sum,
        summary.consumed.matrices,
        summary.consumed.sum,
        summary.multiplied(),
        snapshot.peak,
        snapshot.capacity
    );

    Ok(summary)
}

/// Every run with workers must produce exactly the configured quota, even
/// when some producers never started.
pub(crate) fn check_quota(config: &Config, summary: &RunSummary) -> RunResult<()> {
    if config.workers > 0 && summary.produced.matrices != config.matrices {
        return Err(RunError::QuotaMissed {
            produced: summary.produced.matrices,
            quota: config.matrices,
        });
    }
    Ok(())
}
