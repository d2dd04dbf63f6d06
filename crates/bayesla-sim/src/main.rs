//! bayesla-sim
//!
//! Runs batches of OLLA vs BayesLA link-adaptation experiments over a
//! simulated Rayleigh fading channel and writes the per-TTI logs as JSON.
//!
//! - `--config` reads a TOML parameter file; every field is optional
//! - `--dataset` loads an offline AWGN BLER table, `--synthetic` builds one
//! - Ctrl-C stops the batch; no partial archive is written

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, bail};
use bayesla_core::config::SimulationConfigInput;
use bayesla_core::{AwgnTable, LinkModel, SimulationConfig};
use bayesla_sim::{BatchOutcome, ResultsArchive, Runner, default_workers, log_summary, summarize};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Link-adaptation experiment runner.
#[derive(Parser, Debug)]
#[command(name = "bayesla-sim", about = "OLLA vs BayesLA link-adaptation experiments")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a batch of experiments.
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// TOML parameter file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Offline AWGN BLER table (JSON with `snr_vs_per` and `snr_range_dB`).
    #[arg(long, required_unless_present = "synthetic", conflicts_with = "synthetic")]
    dataset: Option<PathBuf>,

    /// Use the built-in logistic BLER table instead of a dataset.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Where to write the results archive.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Worker threads (default: available parallelism).
    #[arg(long)]
    workers: Option<usize>,

    /// Override `nrof_experiments`.
    #[arg(long)]
    experiments: Option<usize>,

    /// Override `nrof_ttis`.
    #[arg(long)]
    ttis: Option<usize>,

    /// Override `avg_snr_db`.
    #[arg(long = "snr-db", allow_hyphen_values = true)]
    snr_db: Option<f64>,

    /// Override `first_seed`.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args),
    }
}

fn load_config(args: &RunArgs) -> anyhow::Result<SimulationConfig> {
    let mut input = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            SimulationConfigInput::from_toml_str(&raw)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => SimulationConfigInput::default(),
    };

    // CLI overrides go through the same validation as the file.
    let sim = &mut input.simulation;
    if args.experiments.is_some() {
        sim.nrof_experiments = args.experiments;
    }
    if args.ttis.is_some() {
        sim.nrof_ttis = args.ttis;
    }
    if args.snr_db.is_some() {
        sim.avg_snr_db = args.snr_db;
    }
    if args.seed.is_some() {
        sim.first_seed = args.seed;
    }

    input.resolve().context("invalid simulation parameters")
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;

    let (table, source) = match &args.dataset {
        Some(path) => (
            AwgnTable::load(path)
                .with_context(|| format!("failed to load dataset {}", path.display()))?,
            path.display().to_string(),
        ),
        None => (
            AwgnTable::logistic_default(&config.catalog)
                .context("failed to build synthetic BLER table")?,
            "synthetic".to_string(),
        ),
    };
    let model = LinkModel::new(table, config.catalog.clone(), config.cqi_bler_threshold)
        .context("dataset does not fit the MCS catalog")?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || {
            tracing::info!("stop requested, finishing in-flight experiments");
            stop.store(true, Ordering::Relaxed);
        })
        .context("failed to install Ctrl-C handler")?;
    }

    tracing::info!(
        dataset = %source,
        snr_bins = model.table().nrof_bins(),
        mcs = model.nrof_rates(),
        avg_snr_db = config.experiment.channel.avg_snr_db,
        norm_doppler = config.experiment.channel.norm_doppler,
        target_bler = config.target_bler(),
        "bayesla-sim starting"
    );

    let runner = Runner::new(&config, &model, args.workers.unwrap_or_else(default_workers));
    let results = match runner.run(&stop)? {
        BatchOutcome::Complete(results) => results,
        BatchOutcome::Cancelled { finished, total } => {
            bail!("batch cancelled after {finished}/{total} experiments; no archive written")
        }
    };

    log_summary(&summarize(&results, model.nrof_rates()));

    if let Some(path) = &args.output {
        ResultsArchive::new(source, &config, &results).write(path)?;
    }
    Ok(())
}
