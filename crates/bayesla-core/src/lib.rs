//! Link adaptation over a simulated Rayleigh fading channel.
//!
//! This crate contains:
//! - **AWGN table**: validated SNR-vs-BLER lookup per MCS
//! - **CQI mapper**: SNR ↔ CQI correspondence and the informed BLER prior
//! - **Channel simulator**: Doppler-correlated Rayleigh fading turned into
//!   per-TTI error probabilities and reported CQI
//! - **Policies**: OLLA and Thompson-sampling BayesLA behind one trait
//! - **Experiment driver**: one seed, one channel, both policies, per-TTI logs

pub mod awgn;
pub mod channel;
pub mod config;
pub mod cqi;
pub mod error;
pub mod experiment;
pub mod link;
pub mod mcs;
pub mod metrics;
pub mod policy;
pub mod sampling;

pub use awgn::{AwgnTable, Clamped, Saturation};
pub use config::SimulationConfig;
pub use error::{ConfigError, DatasetError, Error, Result};
pub use experiment::{Experiment, ExperimentParams, ExperimentResult, PolicyLog, run_experiment};
pub use link::LinkModel;
pub use mcs::McsCatalog;
pub use policy::{LinkAdaptation, PolicyKind};
