//! # Rayleigh Channel Simulator
//!
//! Turns a fading trace around a configured average SNR into what the link
//! adaptation loop sees each TTI:
//! - the per-MCS packet error probabilities (AWGN table at the true SNR)
//! - the reported CQI (CQI mapper at the measured SNR)
//!
//! The measured SNR equals the true one unless CQI estimation noise is
//! configured. A trace is immutable once generated and is a pure function of
//! its parameters and generator seed.

pub mod fading;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::link::LinkModel;
use crate::sampling::standard_normal;

pub use fading::RayleighFading;

/// Parameters of one synthetic channel realization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelParams {
    /// Number of transmission opportunities.
    pub nrof_ttis: usize,
    /// Mean SNR around which the fading fluctuates (dB).
    pub avg_snr_db: f64,
    /// Doppler spread normalized to the TTI duration.
    pub norm_doppler: f64,
    /// Standard deviation of the Gaussian SNR estimation error applied
    /// before CQI quantization (dB). Zero disables it.
    pub cqi_noise_std_db: f64,
}

impl Default for ChannelParams {
    fn default() -> Self {
        ChannelParams {
            nrof_ttis: 5_000,
            avg_snr_db: 15.0,
            norm_doppler: 0.01,
            cqi_noise_std_db: 0.0,
        }
    }
}

/// Per-TTI channel state for one experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelTrace {
    nrof_rates: usize,
    snr_db: Vec<f64>,
    /// Row-major `[tti * nrof_rates + mcs]`.
    error_probabilities: Vec<f64>,
    cqi: Vec<u8>,
    saturated_ttis: usize,
}

impl ChannelTrace {
    pub fn len(&self) -> usize {
        self.cqi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cqi.is_empty()
    }

    pub fn nrof_rates(&self) -> usize {
        self.nrof_rates
    }

    /// Instantaneous SNR per TTI (dB).
    pub fn snr_db(&self) -> &[f64] {
        &self.snr_db
    }

    /// Error probability of every MCS at `tti`.
    pub fn packet_error_probabilities(&self, tti: usize) -> &[f64] {
        let start = tti * self.nrof_rates;
        &self.error_probabilities[start..start + self.nrof_rates]
    }

    /// Reported CQI at `tti`.
    pub fn channel_quality_index(&self, tti: usize) -> u8 {
        self.cqi[tti]
    }

    pub fn channel_quality_indices(&self) -> &[u8] {
        &self.cqi
    }

    /// TTIs whose SNR fell outside the AWGN table and was clamped to its edge.
    pub fn saturated_ttis(&self) -> usize {
        self.saturated_ttis
    }
}

/// Generates [`ChannelTrace`]s against a shared [`LinkModel`].
#[derive(Debug, Clone)]
pub struct ChannelSimulator<'a> {
    model: &'a LinkModel,
    params: ChannelParams,
}

impl<'a> ChannelSimulator<'a> {
    pub fn new(model: &'a LinkModel, params: ChannelParams) -> Self {
        ChannelSimulator { model, params }
    }

    pub fn params(&self) -> &ChannelParams {
        &self.params
    }

    /// Generate a trace from a fresh generator seeded with `seed`.
    pub fn run_seeded(&self, seed: u64) -> ChannelTrace {
        self.run(&mut StdRng::seed_from_u64(seed))
    }

    /// Generate a trace drawing all randomness from `rng`.
    pub fn run(&self, rng: &mut impl Rng) -> ChannelTrace {
        let n = self.params.nrof_ttis;
        let nrof_rates = self.model.nrof_rates();
        let mut fading = RayleighFading::new(self.params.norm_doppler, rng);

        let mut snr_db = Vec::with_capacity(n);
        let mut error_probabilities = Vec::with_capacity(n * nrof_rates);
        let mut cqi = Vec::with_capacity(n);
        let mut saturated_ttis = 0;

        for _ in 0..n {
            let snr = self.params.avg_snr_db + fading.next_gain_db();
            let bler = self.model.determine_bler_at_sinr(snr);
            if bler.is_saturated() {
                saturated_ttis += 1;
            }
            error_probabilities.extend(bler.value.iter().map(|p| p.clamp(0.0, 1.0)));

            let measured = if self.params.cqi_noise_std_db > 0.0 {
                snr + self.params.cqi_noise_std_db * standard_normal(rng)
            } else {
                snr
            };
            cqi.push(self.model.cqi_from_snr(measured).value);
            snr_db.push(snr);
        }

        debug!(
            nrof_ttis = n,
            avg_snr_db = self.params.avg_snr_db,
            norm_doppler = self.params.norm_doppler,
            saturated_ttis,
            "generated channel trace"
        );

        ChannelTrace {
            nrof_rates,
            snr_db,
            error_probabilities,
            cqi,
            saturated_ttis,
        }
    }
}
