//! # Experiment Driver
//!
//! One experiment = one seed. The driver generates a single channel trace,
//! pre-draws the ACK outcome of every MCS at every TTI, then replays that same
//! realization against OLLA and BayesLA independently. Whichever MCS a policy
//! picks, its outcome is read from the shared ACK table, so both policies see
//! the same channel and neither gets fresh luck per decision.
//!
//! Randomness comes from three streams derived from the seed (channel, ACK
//! draws, BayesLA sampling), so every log is a pure function of the seed and
//! the parameters.

use rand::Rng;
use rand::RngExt;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::channel::{ChannelParams, ChannelSimulator, ChannelTrace};
use crate::link::LinkModel;
use crate::metrics::LogSummary;
use crate::policy::{BayesLa, BayesLaConfig, LinkAdaptation, Olla, OllaConfig, PolicyKind};

/// Everything one experiment needs besides the seed and the link model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentParams {
    pub channel: ChannelParams,
    /// TTIs between a CQI measurement and the decision that uses it.
    pub cqi_delay_ttis: usize,
    pub olla: OllaConfig,
    pub bayesla: BayesLaConfig,
}

impl Default for ExperimentParams {
    fn default() -> Self {
        ExperimentParams {
            channel: ChannelParams::default(),
            cqi_delay_ttis: 0,
            olla: OllaConfig::default(),
            bayesla: BayesLaConfig::default(),
        }
    }
}

/// Outcome of one transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtiOutcome {
    pub mcs: usize,
    pub ack: bool,
    /// Bits delivered: the MCS packet size on ACK, zero on NACK.
    pub throughput: u32,
}

/// Ordered per-TTI log of one policy in one experiment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyLog {
    pub mcs: Vec<usize>,
    pub ack: Vec<bool>,
    pub throughput: Vec<u32>,
}

impl PolicyLog {
    pub fn with_capacity(n: usize) -> Self {
        PolicyLog {
            mcs: Vec::with_capacity(n),
            ack: Vec::with_capacity(n),
            throughput: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, outcome: TtiOutcome) {
        self.mcs.push(outcome.mcs);
        self.ack.push(outcome.ack);
        self.throughput.push(outcome.throughput);
    }

    pub fn len(&self) -> usize {
        self.mcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mcs.is_empty()
    }

    pub fn get(&self, tti: usize) -> Option<TtiOutcome> {
        Some(TtiOutcome {
            mcs: *self.mcs.get(tti)?,
            ack: *self.ack.get(tti)?,
            throughput: *self.throughput.get(tti)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = TtiOutcome> + '_ {
        (0..self.len()).filter_map(|tti| self.get(tti))
    }

    pub fn summary(&self, nrof_rates: usize) -> LogSummary {
        LogSummary::from_log(self, nrof_rates)
    }
}

/// Pre-drawn ACK outcome of every MCS at every TTI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckTable {
    nrof_rates: usize,
    /// `[tti * nrof_rates + mcs]`.
    acks: Vec<bool>,
}

impl AckTable {
    /// One independent Bernoulli draw per (TTI, MCS) with success
    /// probability `1 - packet_error_probability`.
    pub fn draw(trace: &ChannelTrace, rng: &mut impl Rng) -> Self {
        let nrof_rates = trace.nrof_rates();
        let mut acks = Vec::with_capacity(trace.len() * nrof_rates);
        for tti in 0..trace.len() {
            for &p in trace.packet_error_probabilities(tti) {
                acks.push(rng.random::<f64>() >= p);
            }
        }
        AckTable { nrof_rates, acks }
    }

    pub fn len(&self) -> usize {
        self.acks.len() / self.nrof_rates.max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.acks.is_empty()
    }

    /// Outcome of transmitting `mcs` at `tti`. Out-of-range MCS indices
    /// saturate to the last catalog entry.
    pub fn ack(&self, tti: usize, mcs: usize) -> bool {
        let mcs = mcs.min(self.nrof_rates - 1);
        self.acks[tti * self.nrof_rates + mcs]
    }
}

/// Independent generators derived from one experiment seed.
#[derive(Debug)]
pub struct RngStreams {
    pub channel: StdRng,
    pub acks: StdRng,
    /// Seed of the BayesLA sampling stream; each replay starts it afresh.
    pub policy_seed: u64,
}

impl RngStreams {
    pub fn from_seed(seed: u64) -> Self {
        let mut master = StdRng::seed_from_u64(seed);
        RngStreams {
            channel: StdRng::seed_from_u64(master.random()),
            acks: StdRng::seed_from_u64(master.random()),
            policy_seed: master.random(),
        }
    }
}

/// A prepared experiment: the channel realization both policies will face.
#[derive(Debug)]
pub struct Experiment<'a> {
    seed: u64,
    model: &'a LinkModel,
    params: ExperimentParams,
    trace: ChannelTrace,
    acks: AckTable,
    policy_seed: u64,
}

impl<'a> Experiment<'a> {
    /// Generate the channel trace and ACK table for `seed`.
    pub fn prepare(seed: u64, params: &ExperimentParams, model: &'a LinkModel) -> Self {
        let RngStreams {
            mut channel,
            acks: mut ack_rng,
            policy_seed,
        } = RngStreams::from_seed(seed);
        let trace = ChannelSimulator::new(model, params.channel.clone()).run(&mut channel);
        let acks = AckTable::draw(&trace, &mut ack_rng);
        Experiment {
            seed,
            model,
            params: params.clone(),
            trace,
            acks,
            policy_seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn trace(&self) -> &ChannelTrace {
        &self.trace
    }

    pub fn acks(&self) -> &AckTable {
        &self.acks
    }

    /// CQI available to the transmitter at `tti` after the feedback delay.
    pub fn reported_cqi(&self, tti: usize) -> u8 {
        self.trace
            .channel_quality_index(tti.saturating_sub(self.params.cqi_delay_ttis))
    }

    /// Drive one policy over the whole trace.
    pub fn replay(&self, policy: &mut dyn LinkAdaptation) -> PolicyLog {
        let catalog = self.model.catalog();
        let mut log = PolicyLog::with_capacity(self.trace.len());
        for tti in 0..self.trace.len() {
            let cqi = self.reported_cqi(tti);
            let mcs = policy.act(cqi);
            let ack = self.acks.ack(tti, mcs);
            policy.update(mcs, cqi, ack);
            log.push(TtiOutcome {
                mcs,
                ack,
                throughput: if ack { catalog.packet_size(mcs) } else { 0 },
            });
        }
        log
    }

    /// Fresh OLLA controller for this experiment.
    pub fn olla(&self) -> Olla<'a> {
        Olla::new(self.model, self.params.olla)
    }

    /// Fresh BayesLA controller with this experiment's sampling stream.
    pub fn bayesla(&self) -> BayesLa<'a> {
        BayesLa::new(
            self.model,
            self.params.bayesla,
            StdRng::seed_from_u64(self.policy_seed),
        )
    }

    /// Run OLLA and BayesLA over the prepared realization.
    pub fn run(self) -> ExperimentResult {
        let mut olla = self.olla();
        let olla_log = self.replay(&mut olla);

        let mut bayesla = self.bayesla();
        let bayesla_log = self.replay(&mut bayesla);

        let result = ExperimentResult {
            seed: self.seed,
            olla: olla_log,
            bayesla: bayesla_log,
        };
        let nrof_rates = self.model.nrof_rates();
        let (o, b) = (
            result.olla.summary(nrof_rates),
            result.bayesla.summary(nrof_rates),
        );
        debug!(
            seed = self.seed,
            olla_bler = o.bler,
            olla_tput = o.mean_throughput,
            olla_bias_db = olla.snr_bias(),
            bayesla_bler = b.bler,
            bayesla_tput = b.mean_throughput,
            "experiment finished"
        );
        result
    }
}

/// Logs of both policies for one seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentResult {
    pub seed: u64,
    pub olla: PolicyLog,
    pub bayesla: PolicyLog,
}

impl ExperimentResult {
    pub fn log(&self, kind: PolicyKind) -> &PolicyLog {
        match kind {
            PolicyKind::Olla => &self.olla,
            PolicyKind::BayesLa => &self.bayesla,
        }
    }
}

/// Prepare and run one experiment.
pub fn run_experiment(seed: u64, params: &ExperimentParams, model: &LinkModel) -> ExperimentResult {
    Experiment::prepare(seed, params, model).run()
}
