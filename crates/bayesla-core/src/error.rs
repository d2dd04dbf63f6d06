//! Error types for dataset loading and configuration.
//!
//! Everything here is raised at construction time. Once an [`AwgnTable`]
//! and a [`SimulationConfig`] exist, the simulation itself is infallible.
//!
//! [`AwgnTable`]: crate::awgn::AwgnTable
//! [`SimulationConfig`]: crate::config::SimulationConfig

use thiserror::Error;

// ── Dataset ─────────────────────────────────────────────────────────

/// Structural defects in an AWGN SNR-vs-BLER dataset.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DatasetError {
    #[error("SNR axis is empty")]
    EmptyAxis,
    #[error("dataset has no MCS columns")]
    NoMcs,
    #[error("SNR axis has {axis} bins but the BLER table has {rows} rows")]
    ShapeMismatch { axis: usize, rows: usize },
    #[error("BLER row {row} has {got} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        got: usize,
        expected: usize,
    },
    #[error("dataset has {got} MCS columns but the catalog has {expected} entries")]
    CatalogMismatch { got: usize, expected: usize },
    #[error("SNR axis is not strictly increasing at index {index}")]
    AxisNotIncreasing { index: usize },
    #[error("BLER {value} at snr index {snr_index}, mcs {mcs} is not a probability")]
    ProbabilityOutOfRange {
        snr_index: usize,
        mcs: usize,
        value: f64,
    },
    #[error("BLER for mcs {mcs} increases with SNR at snr index {snr_index}")]
    NonMonotoneBler { mcs: usize, snr_index: usize },
}

// ── Configuration ───────────────────────────────────────────────────

/// Degenerate simulation parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid config TOML: {0}")]
    Toml(String),
    #[error("target BLER must lie in (0, 1), got {0}")]
    InvalidTargetBler(f64),
    #[error("CQI BLER threshold must lie in (0, 1), got {0}")]
    InvalidCqiThreshold(f64),
    #[error("OLLA step size must be positive, got {0}")]
    InvalidStepSize(f64),
    #[error("normalized Doppler must be finite and non-negative, got {0}")]
    InvalidDoppler(f64),
    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },
    #[error("prior strength must be positive, got {0}")]
    InvalidPriorStrength(f64),
    #[error("prior floor must lie in (0, 0.5), got {0}")]
    InvalidPriorFloor(f64),
    #[error("CQI noise standard deviation must be non-negative, got {0}")]
    InvalidCqiNoise(f64),
    #[error("MCS catalog is empty")]
    EmptyCatalog,
    #[error("MCS catalog has {packet_sizes} packet sizes but {modorders} modulation orders")]
    CatalogLengthMismatch {
        packet_sizes: usize,
        modorders: usize,
    },
    #[error("number of TTIs must be at least 1")]
    ZeroTtis,
    #[error("number of experiments must be at least 1")]
    ZeroExperiments,
}

// ── Top level ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed dataset: {0}")]
    Dataset(#[from] DatasetError),
    #[error("bad configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
