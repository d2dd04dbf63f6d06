//! # AWGN BLER Table
//!
//! Static SNR-vs-BLER lookup: for each tabulated SNR bin and each MCS, the
//! block error probability over an AWGN channel. Loaded once, validated,
//! then shared read-only by every experiment.
//!
//! Lookups use the nearest tabulated bin. An exact tie between two bins
//! resolves to the lower one. Queries outside the axis saturate at the edge
//! bin and say so through [`Saturation`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{DatasetError, Result};
use crate::mcs::McsCatalog;

/// Slack allowed when checking that BLER never increases with SNR.
const MONOTONE_TOLERANCE: f64 = 1e-9;

/// Gap to Shannon capacity used by the synthetic table (dB).
pub const IMPLEMENTATION_GAP_DB: f64 = 2.0;

/// Default steepness of the synthetic BLER waterfall (per dB).
pub const DEFAULT_LOGISTIC_SLOPE: f64 = 1.5;

/// Whether a lookup hit the edge of the tabulated range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Saturation {
    /// The query fell inside the table.
    None,
    /// The query was below the table and was clamped to its first entry.
    Low,
    /// The query was above the table and was clamped to its last entry.
    High,
}

/// A lookup result together with its saturation marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clamped<T> {
    pub value: T,
    pub saturation: Saturation,
}

impl<T> Clamped<T> {
    pub fn exact(value: T) -> Self {
        Clamped {
            value,
            saturation: Saturation::None,
        }
    }

    pub fn is_saturated(&self) -> bool {
        self.saturation != Saturation::None
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Clamped<U> {
        Clamped {
            value: f(self.value),
            saturation: self.saturation,
        }
    }
}

/// On-disk layout of the offline dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwgnDataset {
    /// `snr_vs_per[snr_index][mcs_index]`.
    #[serde(alias = "snr_vs_bler")]
    pub snr_vs_per: Vec<Vec<f64>>,
    /// Ascending SNR bin centres in dB.
    #[serde(rename = "snr_range_dB", alias = "snr_range_db")]
    pub snr_range_db: Vec<f64>,
}

/// Validated, immutable SNR-vs-BLER table.
#[derive(Debug, Clone, PartialEq)]
pub struct AwgnTable {
    snr_axis: Vec<f64>,
    /// Row-major `[snr_index * nrof_rates + mcs]`.
    bler: Vec<f64>,
    nrof_rates: usize,
}

impl AwgnTable {
    /// Validate and build a table. Rejects ragged or mismatched shapes, an
    /// axis that is not strictly increasing, values outside `[0, 1]`, and
    /// BLER curves that rise with SNR.
    pub fn new(snr_axis: Vec<f64>, rows: Vec<Vec<f64>>) -> std::result::Result<Self, DatasetError> {
        if snr_axis.is_empty() {
            return Err(DatasetError::EmptyAxis);
        }
        if rows.len() != snr_axis.len() {
            return Err(DatasetError::ShapeMismatch {
                axis: snr_axis.len(),
                rows: rows.len(),
            });
        }
        let nrof_rates = rows[0].len();
        if nrof_rates == 0 {
            return Err(DatasetError::NoMcs);
        }

        for (index, pair) in snr_axis.windows(2).enumerate() {
            // Written as a negation so NaN is rejected too.
            if !(pair[1] > pair[0]) {
                return Err(DatasetError::AxisNotIncreasing { index: index + 1 });
            }
        }
        if !snr_axis[0].is_finite() || !snr_axis[snr_axis.len() - 1].is_finite() {
            return Err(DatasetError::AxisNotIncreasing { index: 0 });
        }

        let mut bler = Vec::with_capacity(rows.len() * nrof_rates);
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != nrof_rates {
                return Err(DatasetError::RaggedRow {
                    row: row_idx,
                    got: row.len(),
                    expected: nrof_rates,
                });
            }
            for (mcs, &value) in row.iter().enumerate() {
                if !(0.0..=1.0).contains(&value) {
                    return Err(DatasetError::ProbabilityOutOfRange {
                        snr_index: row_idx,
                        mcs,
                        value,
                    });
                }
                if row_idx > 0 && value > rows[row_idx - 1][mcs] + MONOTONE_TOLERANCE {
                    return Err(DatasetError::NonMonotoneBler {
                        mcs,
                        snr_index: row_idx,
                    });
                }
            }
            bler.extend_from_slice(row);
        }

        Ok(AwgnTable {
            snr_axis,
            bler,
            nrof_rates,
        })
    }

    pub fn from_dataset(dataset: AwgnDataset) -> std::result::Result<Self, DatasetError> {
        Self::new(dataset.snr_range_db, dataset.snr_vs_per)
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        let dataset: AwgnDataset = serde_json::from_str(input)?;
        Ok(Self::from_dataset(dataset)?)
    }

    /// Load a JSON dataset from disk. Any structural defect is fatal.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let table = Self::from_json_str(&raw)?;
        info!(
            path = %path.display(),
            snr_bins = table.nrof_bins(),
            nrof_rates = table.nrof_rates(),
            "loaded AWGN BLER table"
        );
        Ok(table)
    }

    /// Synthetic stand-in for the offline dataset: one logistic waterfall per
    /// MCS, centred on the Shannon SNR of its spectral efficiency plus
    /// [`IMPLEMENTATION_GAP_DB`].
    pub fn logistic(
        catalog: &McsCatalog,
        snr_axis: Vec<f64>,
        slope_per_db: f64,
    ) -> std::result::Result<Self, DatasetError> {
        let centres: Vec<f64> = catalog
            .iter()
            .map(|mcs| {
                10.0 * (2f64.powf(mcs.spectral_efficiency()) - 1.0).log10() + IMPLEMENTATION_GAP_DB
            })
            .collect();
        let rows = snr_axis
            .iter()
            .map(|&snr| {
                centres
                    .iter()
                    .map(|&c| 1.0 / (1.0 + (slope_per_db * (snr - c)).exp()))
                    .collect()
            })
            .collect();
        Self::new(snr_axis, rows)
    }

    /// Synthetic table over [`default_snr_axis`] with the default slope.
    pub fn logistic_default(catalog: &McsCatalog) -> std::result::Result<Self, DatasetError> {
        Self::logistic(catalog, default_snr_axis(), DEFAULT_LOGISTIC_SLOPE)
    }

    /// Check that the table has one column per catalog entry.
    pub fn check_catalog(&self, catalog: &McsCatalog) -> std::result::Result<(), DatasetError> {
        if self.nrof_rates != catalog.len() {
            return Err(DatasetError::CatalogMismatch {
                got: self.nrof_rates,
                expected: catalog.len(),
            });
        }
        Ok(())
    }

    pub fn snr_axis(&self) -> &[f64] {
        &self.snr_axis
    }

    pub fn nrof_bins(&self) -> usize {
        self.snr_axis.len()
    }

    pub fn nrof_rates(&self) -> usize {
        self.nrof_rates
    }

    pub fn min_snr(&self) -> f64 {
        self.snr_axis[0]
    }

    pub fn max_snr(&self) -> f64 {
        self.snr_axis[self.snr_axis.len() - 1]
    }

    /// BLER row for a tabulated bin.
    pub fn row(&self, snr_index: usize) -> &[f64] {
        let start = snr_index * self.nrof_rates;
        &self.bler[start..start + self.nrof_rates]
    }

    /// Nearest tabulated bin for `snr_db`. An exact tie picks the lower bin.
    pub fn snr_index(&self, snr_db: f64) -> Clamped<usize> {
        let last = self.snr_axis.len() - 1;
        if snr_db.is_nan() || snr_db < self.snr_axis[0] {
            return Clamped {
                value: 0,
                saturation: Saturation::Low,
            };
        }
        if snr_db > self.snr_axis[last] {
            return Clamped {
                value: last,
                saturation: Saturation::High,
            };
        }

        let upper = self.snr_axis.partition_point(|&s| s < snr_db);
        if upper == 0 {
            return Clamped::exact(0);
        }
        let below = snr_db - self.snr_axis[upper - 1];
        let above = self.snr_axis[upper] - snr_db;
        Clamped::exact(if below <= above { upper - 1 } else { upper })
    }

    /// Per-MCS BLER vector at `snr_db`, looked up from the nearest bin.
    pub fn determine_bler_at_sinr(&self, snr_db: f64) -> Clamped<&[f64]> {
        self.snr_index(snr_db).map(|idx| self.row(idx))
    }

    /// Serializable copy in the on-disk dataset layout. Inverse of
    /// [`AwgnTable::from_dataset`].
    pub fn to_dataset(&self) -> AwgnDataset {
        AwgnDataset {
            snr_vs_per: (0..self.nrof_bins()).map(|i| self.row(i).to_vec()).collect(),
            snr_range_db: self.snr_axis.clone(),
        }
    }
}

/// -10 dB to 35 dB in 0.1 dB steps.
pub fn default_snr_axis() -> Vec<f64> {
    (0..=450).map(|i| -10.0 + 0.1 * i as f64).collect()
}
