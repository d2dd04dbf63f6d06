//! # CQI Mapper
//!
//! Maps SNR to the 4-bit channel quality indicator and back.
//!
//! CQI `k` in `1..=15` names a reference MCS. The CQI reported at an SNR is
//! the highest `k` whose reference MCS meets the CQI BLER threshold there;
//! CQI 0 means no reference MCS does. The inverse, the representative SNR
//! of CQI `k`, is the lowest tabulated SNR at which the reference MCS of
//! every CQI up to `k` meets the threshold. Where no MCS curves cross this is
//! simply the first SNR where the reference of `k` does.
//!
//! Everything is precomputed per SNR bin at construction, so lookups are a
//! nearest-bin search plus an array index.

use crate::awgn::{AwgnTable, Clamped, Saturation};

/// Highest CQI index.
pub const CQI_MAX: u8 = 15;

/// Number of CQI values, including CQI 0.
pub const NUM_CQI: usize = CQI_MAX as usize + 1;

/// BLER the reference MCS must meet for a CQI to be reported.
pub const DEFAULT_CQI_BLER_THRESHOLD: f64 = 0.1;

/// Reference MCS of CQI `k` in a catalog of `nrof_rates` entries. CQI
/// `1..=15` spreads evenly over the catalog; with 15 entries this is `k - 1`.
pub fn reference_mcs(cqi: u8, nrof_rates: usize) -> Option<usize> {
    if cqi == 0 || nrof_rates == 0 {
        return None;
    }
    let k = cqi.min(CQI_MAX) as usize - 1;
    let span = CQI_MAX as usize - 1;
    Some((k * (nrof_rates - 1) + span / 2) / span)
}

/// Precomputed SNR/CQI correspondence for one AWGN table.
#[derive(Debug, Clone)]
pub struct CqiMapper {
    threshold: f64,
    /// Reported CQI for each SNR bin of the table.
    bin_cqi: Vec<u8>,
    /// Representative SNR of each CQI.
    representative: [Clamped<f64>; NUM_CQI],
    /// Informed prior BLER, `[cqi * nrof_rates + mcs]`.
    prior: Vec<f64>,
    nrof_rates: usize,
}

impl CqiMapper {
    pub fn new(table: &AwgnTable, threshold: f64) -> Self {
        let nrof_rates = table.nrof_rates();
        let references: Vec<usize> = (1..=CQI_MAX)
            .filter_map(|cqi| reference_mcs(cqi, nrof_rates))
            .collect();

        let bin_cqi: Vec<u8> = (0..table.nrof_bins())
            .map(|bin| {
                let row = table.row(bin);
                references
                    .iter()
                    .enumerate()
                    .filter(|&(_, &mcs)| row[mcs] <= threshold)
                    .map(|(k, _)| k as u8 + 1)
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        // First bin where each reference MCS meets the threshold. Curves are
        // non-increasing in SNR, so the reference keeps meeting it above there.
        let first_feasible: Vec<Option<usize>> = references
            .iter()
            .map(|&mcs| (0..table.nrof_bins()).position(|bin| table.row(bin)[mcs] <= threshold))
            .collect();

        let axis = table.snr_axis();
        let mut representative = [Clamped {
            value: table.min_snr(),
            saturation: Saturation::Low,
        }; NUM_CQI];
        // The running max over CQIs 1..=k keeps the result monotone in k.
        let mut floor = Some(0usize);
        for cqi in 1..NUM_CQI {
            floor = match (floor, first_feasible.get(cqi - 1).copied().flatten()) {
                (Some(lo), Some(bin)) => Some(lo.max(bin)),
                _ => None,
            };
            representative[cqi] = match floor {
                Some(bin) => Clamped::exact(axis[bin]),
                None => Clamped {
                    value: table.max_snr(),
                    saturation: Saturation::High,
                },
            };
        }

        let mut prior = Vec::with_capacity(NUM_CQI * nrof_rates);
        for (cqi, rep) in representative.iter().enumerate() {
            let mut sum = vec![0.0; nrof_rates];
            let mut bins = 0usize;
            for (bin, _) in bin_cqi.iter().enumerate().filter(|&(_, &c)| c as usize == cqi) {
                for (acc, &b) in sum.iter_mut().zip(table.row(bin)) {
                    *acc += b;
                }
                bins += 1;
            }
            if bins > 0 {
                prior.extend(sum.iter().map(|s| s / bins as f64));
            } else {
                prior.extend_from_slice(table.determine_bler_at_sinr(rep.value).value);
            }
        }

        CqiMapper {
            threshold,
            bin_cqi,
            representative,
            prior,
            nrof_rates,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// CQI reported in tabulated bin `snr_index`.
    pub fn cqi_at_bin(&self, snr_index: usize) -> u8 {
        self.bin_cqi[snr_index.min(self.bin_cqi.len() - 1)]
    }

    /// CQI reported at `snr_db`. Saturation is inherited from the SNR lookup.
    pub fn cqi_from_snr(&self, table: &AwgnTable, snr_db: f64) -> Clamped<u8> {
        table.snr_index(snr_db).map(|bin| self.cqi_at_bin(bin))
    }

    /// Representative SNR of `cqi`: the lowest tabulated SNR at which the
    /// reference MCS of `cqi` and of every lower CQI meets the threshold.
    /// Non-decreasing in `cqi`.
    ///
    /// CQI 0 maps to the bottom of the table (`Saturation::Low`). A CQI no
    /// tabulated SNR reaches, or one above 15, maps to the top
    /// (`Saturation::High`).
    pub fn estimate_sinr_from_cqi(&self, cqi: u8) -> Clamped<f64> {
        if cqi > CQI_MAX {
            return Clamped {
                value: self.representative[CQI_MAX as usize].value,
                saturation: Saturation::High,
            };
        }
        self.representative[cqi as usize]
    }

    /// Offline AWGN-derived BLER estimate per MCS for `cqi`. This is the mean
    /// BLER over all bins that report `cqi`, or the BLER at the
    /// representative SNR when no bin does.
    pub fn prior_bler(&self, cqi: u8) -> &[f64] {
        let start = cqi.min(CQI_MAX) as usize * self.nrof_rates;
        &self.prior[start..start + self.nrof_rates]
    }
}
