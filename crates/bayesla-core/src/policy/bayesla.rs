//! # BayesLA: Thompson Sampling Link Adaptation
//!
//! Keeps a Beta posterior over the success probability of every
//! (CQI, MCS) pair, seeded from the offline AWGN-derived BLER at that CQI
//! (informed prior). Each TTI it samples every MCS's posterior at the
//! reported CQI, discards samples whose BLER exceeds the target, and picks
//! the highest sampled throughput. Only the transmitted (CQI, MCS) arm is
//! updated with the outcome.
//!
//! The belief table is a dense `16 × nrof_rates` array fixed at construction.

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::cqi::{CQI_MAX, NUM_CQI};
use crate::link::LinkModel;
use crate::policy::{LinkAdaptation, PolicyKind, constrained_argmax};
use crate::sampling::BetaParams;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BayesLaConfig {
    /// Block error rate each selected MCS must (by its sample) meet.
    pub target_bler: f64,
    /// Pseudo-observations carried by the informed prior.
    pub prior_strength: f64,
    /// Prior BLER is clamped to `[prior_floor, 1 - prior_floor]`.
    pub prior_floor: f64,
}

impl Default for BayesLaConfig {
    fn default() -> Self {
        BayesLaConfig {
            target_bler: 0.1,
            prior_strength: 10.0,
            prior_floor: 1e-3,
        }
    }
}

/// Thompson Sampling controller over per-(CQI, MCS) Beta beliefs.
#[derive(Debug, Clone)]
pub struct BayesLa<'a, R: Rng = StdRng> {
    model: &'a LinkModel,
    config: BayesLaConfig,
    /// `[cqi * nrof_rates + mcs]`.
    beliefs: Vec<BetaParams>,
    rng: R,
}

impl<'a, R: Rng> BayesLa<'a, R> {
    /// Build the informed prior from `model` and take ownership of the
    /// generator used for posterior sampling.
    pub fn new(model: &'a LinkModel, config: BayesLaConfig, rng: R) -> Self {
        let beliefs = (0..NUM_CQI as u8)
            .flat_map(|cqi| {
                model.prior_bler(cqi).iter().map(move |&bler| {
                    BetaParams::from_bler(bler, config.prior_strength, config.prior_floor)
                })
            })
            .collect();
        BayesLa {
            model,
            config,
            beliefs,
            rng,
        }
    }

    pub fn config(&self) -> &BayesLaConfig {
        &self.config
    }

    fn index(&self, cqi: u8, mcs: usize) -> Option<usize> {
        let nrof_rates = self.model.nrof_rates();
        (mcs < nrof_rates).then(|| cqi.min(CQI_MAX) as usize * nrof_rates + mcs)
    }

    /// Current posterior of the (CQI, MCS) arm.
    pub fn posterior(&self, cqi: u8, mcs: usize) -> Option<&BetaParams> {
        self.index(cqi, mcs).map(|i| &self.beliefs[i])
    }

    /// Posterior mean success probability of the (CQI, MCS) arm.
    pub fn posterior_mean(&self, cqi: u8, mcs: usize) -> Option<f64> {
        self.posterior(cqi, mcs).map(BetaParams::mean)
    }

    /// Every posterior, `[cqi * nrof_rates + mcs]`.
    pub fn beliefs(&self) -> &[BetaParams] {
        &self.beliefs
    }
}

impl<R: Rng> LinkAdaptation for BayesLa<'_, R> {
    fn kind(&self) -> PolicyKind {
        PolicyKind::BayesLa
    }

    fn act(&mut self, cqi: u8) -> usize {
        let model = self.model;
        let nrof_rates = model.nrof_rates();
        let start = cqi.min(CQI_MAX) as usize * nrof_rates;
        let arms = &self.beliefs[start..start + nrof_rates];
        let rng = &mut self.rng;
        let samples = arms.iter().enumerate().map(|(mcs, belief)| {
            let success = belief.sample(rng);
            (
                mcs,
                1.0 - success,
                model.catalog().packet_size(mcs) as f64 * success,
            )
        });
        let mcs = constrained_argmax(samples, self.config.target_bler);
        trace!(cqi, mcs, "bayesla act");
        mcs
    }

    fn update(&mut self, mcs: usize, cqi: u8, ack: bool) {
        if let Some(i) = self.index(cqi, mcs) {
            self.beliefs[i].observe(ack);
        }
    }
}
