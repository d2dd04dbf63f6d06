//! # Simulation Configuration
//!
//! TOML input with every field optional, resolved into a validated
//! [`SimulationConfig`]. Degenerate parameters are rejected here, before any
//! simulation starts.
//!
//! ```toml
//! [simulation]
//! nrof_ttis = 5000
//! nrof_experiments = 10
//! first_seed = 0
//! avg_snr_db = 15.0
//! norm_doppler = 0.01
//! cqi_delay_ttis = 0
//! cqi_noise_std_db = 0.0
//!
//! [link_adaptation]
//! target_bler = 0.1
//! olla_step_size = 0.1
//! cqi_bler_threshold = 0.1
//! prior_strength = 10.0
//! prior_floor = 0.001
//!
//! [mcs]
//! packet_sizes = [156, 240, 386]
//! modorders = [2, 2, 2]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::channel::ChannelParams;
use crate::cqi::DEFAULT_CQI_BLER_THRESHOLD;
use crate::error::{ConfigError, Result};
use crate::experiment::ExperimentParams;
use crate::mcs::McsCatalog;
use crate::policy::{BayesLaConfig, OllaConfig};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SimulationConfigInput {
    pub simulation: SimulationInput,
    pub link_adaptation: LinkAdaptationInput,
    pub mcs: McsInput,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SimulationInput {
    pub nrof_ttis: Option<usize>,
    pub nrof_experiments: Option<usize>,
    pub first_seed: Option<u64>,
    pub avg_snr_db: Option<f64>,
    pub norm_doppler: Option<f64>,
    pub cqi_delay_ttis: Option<usize>,
    pub cqi_noise_std_db: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LinkAdaptationInput {
    pub target_bler: Option<f64>,
    pub olla_step_size: Option<f64>,
    pub cqi_bler_threshold: Option<f64>,
    pub prior_strength: Option<f64>,
    pub prior_floor: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct McsInput {
    pub packet_sizes: Option<Vec<u32>>,
    pub modorders: Option<Vec<u8>>,
}

/// Validated parameter bundle for a batch of experiments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationConfig {
    pub nrof_experiments: usize,
    pub first_seed: u64,
    pub cqi_bler_threshold: f64,
    pub experiment: ExperimentParams,
    pub catalog: McsCatalog,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            nrof_experiments: 10,
            first_seed: 0,
            cqi_bler_threshold: DEFAULT_CQI_BLER_THRESHOLD,
            experiment: ExperimentParams::default(),
            catalog: McsCatalog::default(),
        }
    }
}

fn finite(name: &'static str, value: f64) -> std::result::Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NotFinite { name, value })
    }
}

impl SimulationConfigInput {
    pub fn from_toml_str(input: &str) -> std::result::Result<Self, ConfigError> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        toml::from_str(input).map_err(|e| ConfigError::Toml(e.to_string()))
    }

    pub fn resolve(self) -> std::result::Result<SimulationConfig, ConfigError> {
        let defaults = SimulationConfig::default();
        let d_exp = &defaults.experiment;
        let sim = self.simulation;
        let la = self.link_adaptation;

        let nrof_ttis = sim.nrof_ttis.unwrap_or(d_exp.channel.nrof_ttis);
        if nrof_ttis == 0 {
            return Err(ConfigError::ZeroTtis);
        }
        let nrof_experiments = sim.nrof_experiments.unwrap_or(defaults.nrof_experiments);
        if nrof_experiments == 0 {
            return Err(ConfigError::ZeroExperiments);
        }

        let avg_snr_db = finite("avg_snr_db", sim.avg_snr_db.unwrap_or(d_exp.channel.avg_snr_db))?;
        let norm_doppler = sim.norm_doppler.unwrap_or(d_exp.channel.norm_doppler);
        if !(norm_doppler.is_finite() && norm_doppler >= 0.0) {
            return Err(ConfigError::InvalidDoppler(norm_doppler));
        }
        let cqi_noise_std_db = sim
            .cqi_noise_std_db
            .unwrap_or(d_exp.channel.cqi_noise_std_db);
        if !(cqi_noise_std_db.is_finite() && cqi_noise_std_db >= 0.0) {
            return Err(ConfigError::InvalidCqiNoise(cqi_noise_std_db));
        }

        let target_bler = la.target_bler.unwrap_or(d_exp.olla.target_bler);
        if !(target_bler > 0.0 && target_bler < 1.0) {
            return Err(ConfigError::InvalidTargetBler(target_bler));
        }
        let step_size = la.olla_step_size.unwrap_or(d_exp.olla.step_size);
        if !(step_size.is_finite() && step_size > 0.0) {
            return Err(ConfigError::InvalidStepSize(step_size));
        }
        let cqi_bler_threshold = la
            .cqi_bler_threshold
            .unwrap_or(defaults.cqi_bler_threshold);
        if !(cqi_bler_threshold > 0.0 && cqi_bler_threshold < 1.0) {
            return Err(ConfigError::InvalidCqiThreshold(cqi_bler_threshold));
        }
        let prior_strength = la.prior_strength.unwrap_or(d_exp.bayesla.prior_strength);
        if !(prior_strength.is_finite() && prior_strength > 0.0) {
            return Err(ConfigError::InvalidPriorStrength(prior_strength));
        }
        let prior_floor = la.prior_floor.unwrap_or(d_exp.bayesla.prior_floor);
        if !(prior_floor > 0.0 && prior_floor < 0.5) {
            return Err(ConfigError::InvalidPriorFloor(prior_floor));
        }

        let catalog = match (self.mcs.packet_sizes, self.mcs.modorders) {
            (None, None) => defaults.catalog,
            (sizes, orders) => McsCatalog::new(
                sizes.as_deref().unwrap_or_default(),
                orders.as_deref().unwrap_or_default(),
            )?,
        };

        Ok(SimulationConfig {
            nrof_experiments,
            first_seed: sim.first_seed.unwrap_or(defaults.first_seed),
            cqi_bler_threshold,
            experiment: ExperimentParams {
                channel: ChannelParams {
                    nrof_ttis,
                    avg_snr_db,
                    norm_doppler,
                    cqi_noise_std_db,
                },
                cqi_delay_ttis: sim.cqi_delay_ttis.unwrap_or(d_exp.cqi_delay_ttis),
                olla: OllaConfig {
                    target_bler,
                    step_size,
                },
                bayesla: BayesLaConfig {
                    target_bler,
                    prior_strength,
                    prior_floor,
                },
            },
            catalog,
        })
    }
}

impl SimulationConfig {
    pub fn from_toml_str(input: &str) -> std::result::Result<Self, ConfigError> {
        SimulationConfigInput::from_toml_str(input)?.resolve()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&raw)?)
    }

    pub fn target_bler(&self) -> f64 {
        self.experiment.olla.target_bler
    }

    pub fn nrof_ttis(&self) -> usize {
        self.experiment.channel.nrof_ttis
    }

    /// Experiment seeds in submission order.
    pub fn seeds(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.nrof_experiments as u64).map(|i| self.first_seed.wrapping_add(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_gives_defaults() {
        let cfg = SimulationConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, SimulationConfig::default());
        assert_eq!(cfg.nrof_ttis(), 5_000);
        assert_eq!(cfg.catalog.len(), 15);
        assert_eq!(cfg.seeds().collect::<Vec<_>>(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [simulation]
            nrof_ttis = 50
            nrof_experiments = 3
            first_seed = 100
            avg_snr_db = 12.5
            norm_doppler = 0.02
            cqi_delay_ttis = 2
            cqi_noise_std_db = 1.0

            [link_adaptation]
            target_bler = 0.05
            olla_step_size = 0.2
            prior_strength = 4.0

            [mcs]
            packet_sizes = [100, 200, 400]
            modorders = [2, 4, 6]
        "#;
        let cfg = SimulationConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.nrof_ttis(), 50);
        assert_eq!(cfg.seeds().collect::<Vec<_>>(), vec![100, 101, 102]);
        assert_eq!(cfg.experiment.channel.avg_snr_db, 12.5);
        assert_eq!(cfg.experiment.cqi_delay_ttis, 2);
        assert_eq!(cfg.target_bler(), 0.05);
        assert_eq!(cfg.experiment.bayesla.target_bler, 0.05);
        assert_eq!(cfg.experiment.olla.step_size, 0.2);
        assert_eq!(cfg.experiment.bayesla.prior_strength, 4.0);
        assert_eq!(cfg.catalog.packet_sizes(), vec![100, 200, 400]);
        assert_eq!(cfg.catalog.modorders(), vec![2, 4, 6]);
    }

    #[test]
    fn rejects_degenerate_parameters() {
        let cases = [
            ("[link_adaptation]\ntarget_bler = 0.0", ConfigError::InvalidTargetBler(0.0)),
            ("[link_adaptation]\ntarget_bler = 1.0", ConfigError::InvalidTargetBler(1.0)),
            ("[link_adaptation]\nolla_step_size = 0.0", ConfigError::InvalidStepSize(0.0)),
            ("[simulation]\nnrof_ttis = 0", ConfigError::ZeroTtis),
            ("[simulation]\nnrof_experiments = 0", ConfigError::ZeroExperiments),
            ("[simulation]\nnorm_doppler = -0.1", ConfigError::InvalidDoppler(-0.1)),
            ("[mcs]\npacket_sizes = []\nmodorders = []", ConfigError::EmptyCatalog),
        ];
        for (input, expected) in cases {
            assert_eq!(SimulationConfig::from_toml_str(input), Err(expected), "{input}");
        }
    }

    #[test]
    fn half_specified_catalog_is_rejected() {
        let err = SimulationConfig::from_toml_str("[mcs]\npacket_sizes = [1, 2]").unwrap_err();
        assert_eq!(
            err,
            ConfigError::CatalogLengthMismatch {
                packet_sizes: 2,
                modorders: 0
            }
        );
    }

    #[test]
    fn malformed_toml_is_reported() {
        let err = SimulationConfig::from_toml_str("[simulation\nnrof_ttis = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn resolved_config_serializes() {
        let json = serde_json::to_value(SimulationConfig::default()).unwrap();
        assert_eq!(json["experiment"]["channel"]["nrof_ttis"], 5000);
        assert_eq!(json["catalog"][0]["packet_size"], 156);
    }
}
