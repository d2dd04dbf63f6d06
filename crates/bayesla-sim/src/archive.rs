//! JSON results document.
//!
//! ```json
//! {
//!   "dataset": "synthetic",
//!   "seeds": [0, 1],
//!   "config": { ... },
//!   "olla":    { "mcs": [[..], [..]], "ack": [[..], [..]], "throughput": [[..], [..]] },
//!   "bayesla": { "mcs": [[..], [..]], "ack": [[..], [..]], "throughput": [[..], [..]] }
//! }
//! ```
//!
//! Outer arrays hold one entry per experiment in submission order; inner
//! arrays hold one entry per TTI.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use bayesla_core::{ExperimentResult, PolicyKind, PolicyLog, SimulationConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Per-experiment logs of one controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyArchive {
    pub mcs: Vec<Vec<usize>>,
    pub ack: Vec<Vec<bool>>,
    pub throughput: Vec<Vec<u32>>,
}

impl PolicyArchive {
    fn push(&mut self, log: &PolicyLog) {
        self.mcs.push(log.mcs.clone());
        self.ack.push(log.ack.clone());
        self.throughput.push(log.throughput.clone());
    }

    /// Number of experiments stored.
    pub fn len(&self) -> usize {
        self.mcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mcs.is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct ResultsArchive<'a> {
    /// Where the AWGN table came from: a dataset path or `"synthetic"`.
    pub dataset: String,
    pub seeds: Vec<u64>,
    pub config: &'a SimulationConfig,
    pub olla: PolicyArchive,
    pub bayesla: PolicyArchive,
}

impl<'a> ResultsArchive<'a> {
    pub fn new(
        dataset: impl Into<String>,
        config: &'a SimulationConfig,
        results: &[ExperimentResult],
    ) -> Self {
        let mut archive = ResultsArchive {
            dataset: dataset.into(),
            seeds: Vec::with_capacity(results.len()),
            config,
            olla: PolicyArchive::default(),
            bayesla: PolicyArchive::default(),
        };
        for result in results {
            archive.seeds.push(result.seed);
            archive.olla.push(&result.olla);
            archive.bayesla.push(&result.bayesla);
        }
        archive
    }

    pub fn policy(&self, kind: PolicyKind) -> &PolicyArchive {
        match kind {
            PolicyKind::Olla => &self.olla,
            PolicyKind::BayesLa => &self.bayesla,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serialize to `path`, replacing any existing file.
    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut out = BufWriter::new(file);
        serde_json::to_writer(&mut out, self)
            .with_context(|| format!("failed to encode results to {}", path.display()))?;
        out.flush()
            .with_context(|| format!("failed to flush {}", path.display()))?;
        info!(
            path = %path.display(),
            experiments = self.seeds.len(),
            "results archive written"
        );
        Ok(())
    }
}
