//! Scoped worker pool for independent experiments.
//!
//! Seeds go onto a crossbeam job queue; each worker pulls one, runs both
//! controllers over its own channel realization and sends the logs back
//! tagged with the submission index. Nothing is shared between workers
//! except the read-only link model and the stop flag.
//!
//! Setting the stop flag lets in-flight experiments finish but drops the
//! queued ones. A batch that lost any experiment is reported as
//! [`BatchOutcome::Cancelled`] and carries no results.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use anyhow::Context;
use bayesla_core::metrics::LogSummary;
use bayesla_core::{ExperimentParams, ExperimentResult, LinkModel, PolicyKind, SimulationConfig, run_experiment};
use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::{debug, info};

/// Number of workers when none is requested.
pub fn default_workers() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Result of a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every experiment finished. Results are in submission order.
    Complete(Vec<ExperimentResult>),
    /// The stop flag was raised before the queue drained.
    Cancelled { finished: usize, total: usize },
}

/// Dispatches the seeds of one [`SimulationConfig`] over a worker pool.
pub struct Runner<'a> {
    config: &'a SimulationConfig,
    model: &'a LinkModel,
    workers: usize,
}

impl<'a> Runner<'a> {
    pub fn new(config: &'a SimulationConfig, model: &'a LinkModel, workers: usize) -> Self {
        Self {
            config,
            model,
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run the whole batch. Blocks until every worker has exited.
    pub fn run(&self, stop: &AtomicBool) -> anyhow::Result<BatchOutcome> {
        let seeds: Vec<u64> = self.config.seeds().collect();
        let total = seeds.len();
        let workers = self.workers.min(total).max(1);

        let (job_tx, job_rx) = unbounded::<(usize, u64)>();
        for job in seeds.into_iter().enumerate() {
            job_tx
                .send(job)
                .map_err(|e| anyhow::anyhow!("Failed to queue experiment: {}", e))?;
        }
        drop(job_tx);

        info!(
            experiments = total,
            workers,
            ttis = self.config.nrof_ttis(),
            "dispatching batch"
        );

        let (done_tx, done_rx) = unbounded::<(usize, ExperimentResult)>();
        let params = &self.config.experiment;
        let model = self.model;

        let slots = thread::scope(|s| -> anyhow::Result<Vec<Option<ExperimentResult>>> {
            for id in 0..workers {
                let job_rx = job_rx.clone();
                let done_tx = done_tx.clone();
                thread::Builder::new()
                    .name(format!("bayesla-worker-{id}"))
                    .spawn_scoped(s, move || worker(job_rx, done_tx, params, model, stop))
                    .with_context(|| format!("failed to spawn worker {id}"))?;
            }
            drop(done_tx);

            let mut slots: Vec<Option<ExperimentResult>> = (0..total).map(|_| None).collect();
            let mut finished = 0usize;
            for (index, result) in done_rx.iter() {
                finished += 1;
                debug!(index, seed = result.seed, finished, total, "experiment collected");
                slots[index] = Some(result);
            }
            Ok(slots)
        })?;

        let finished = slots.iter().filter(|s| s.is_some()).count();
        match slots.into_iter().collect::<Option<Vec<_>>>() {
            Some(results) => Ok(BatchOutcome::Complete(results)),
            None => Ok(BatchOutcome::Cancelled { finished, total }),
        }
    }
}

fn worker(
    job_rx: Receiver<(usize, u64)>,
    done_tx: Sender<(usize, ExperimentResult)>,
    params: &ExperimentParams,
    model: &LinkModel,
    stop: &AtomicBool,
) {
    while !stop.load(Ordering::Relaxed) {
        let Ok((index, seed)) = job_rx.recv() else {
            break;
        };
        let result = run_experiment(seed, params, model);
        if done_tx.send((index, result)).is_err() {
            break;
        }
    }
}

/// Pooled per-policy statistics over a finished batch.
pub fn summarize(results: &[ExperimentResult], nrof_rates: usize) -> Vec<(PolicyKind, LogSummary)> {
    PolicyKind::ALL
        .iter()
        .map(|&kind| {
            let parts: Vec<LogSummary> = results
                .iter()
                .map(|r| r.log(kind).summary(nrof_rates))
                .collect();
            (kind, LogSummary::merge(nrof_rates, &parts))
        })
        .collect()
}

/// Emit one `info!` line per policy.
pub fn log_summary(summary: &[(PolicyKind, LogSummary)]) {
    for (kind, s) in summary {
        info!(
            policy = %kind,
            ttis = s.nrof_ttis,
            bler = s.bler,
            mean_throughput = s.mean_throughput,
            modal_mcs = ?s.modal_mcs(),
            "batch summary"
        );
    }
}
