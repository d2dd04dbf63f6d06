//! Link-adaptation policies.
//!
//! Both controllers implement [`LinkAdaptation`]: pick an MCS for the
//! reported CQI, then learn from the ACK/NACK of that transmission. The
//! experiment driver runs them through the trait and never sees their state.
//!
//! - [`olla::Olla`]: outer-loop SNR bias over the static AWGN lookup
//! - [`bayesla::BayesLa`]: Thompson Sampling over Beta posteriors per (CQI, MCS)

pub mod bayesla;
pub mod olla;

use serde::{Deserialize, Serialize};

pub use bayesla::{BayesLa, BayesLaConfig};
pub use olla::{Olla, OllaConfig};

/// Index of the most robust MCS, used whenever nothing meets the target.
pub const FALLBACK_MCS: usize = 0;

/// Per-TTI decide/learn interface shared by every controller.
pub trait LinkAdaptation {
    /// Which controller this is.
    fn kind(&self) -> PolicyKind;

    /// Choose an MCS index for a transmission at reported `cqi`.
    fn act(&mut self, cqi: u8) -> usize;

    /// Feed back the outcome of transmitting `mcs` at reported `cqi`.
    fn update(&mut self, mcs: usize, cqi: u8, ack: bool);
}

/// Controller identity, also the key used in results archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    Olla,
    #[serde(rename = "bayesla")]
    BayesLa,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 2] = [PolicyKind::Olla, PolicyKind::BayesLa];

    pub fn name(&self) -> &'static str {
        match self {
            PolicyKind::Olla => "olla",
            PolicyKind::BayesLa => "bayesla",
        }
    }
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Highest expected throughput among the MCSs whose BLER meets `target_bler`.
///
/// `candidates` yields `(mcs, bler, expected_throughput)` in ascending MCS
/// order. Ties keep the lowest index; an empty feasible set returns
/// [`FALLBACK_MCS`].
pub(crate) fn constrained_argmax(
    candidates: impl Iterator<Item = (usize, f64, f64)>,
    target_bler: f64,
) -> usize {
    let mut best: Option<(usize, f64)> = None;
    for (mcs, bler, throughput) in candidates {
        if !(bler <= target_bler) || throughput.is_nan() {
            continue;
        }
        match best {
            Some((_, best_tp)) if !(throughput > best_tp) => {}
            _ => best = Some((mcs, throughput)),
        }
    }
    best.map_or(FALLBACK_MCS, |(mcs, _)| mcs)
}
