//! Summary statistics over per-TTI policy logs.

use serde::{Deserialize, Serialize};

use crate::experiment::PolicyLog;

/// Aggregate view of one or more policy logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSummary {
    /// Transmissions covered.
    pub nrof_ttis: usize,
    /// Transmissions that were not acknowledged.
    pub nacks: usize,
    /// Empirical block error rate, `nacks / nrof_ttis`.
    pub bler: f64,
    /// Delivered bits per TTI.
    pub mean_throughput: f64,
    /// Selections per MCS index.
    pub mcs_histogram: Vec<usize>,
}

impl LogSummary {
    pub fn empty(nrof_rates: usize) -> Self {
        LogSummary {
            nrof_ttis: 0,
            nacks: 0,
            bler: 0.0,
            mean_throughput: 0.0,
            mcs_histogram: vec![0; nrof_rates],
        }
    }

    pub fn from_log(log: &PolicyLog, nrof_rates: usize) -> Self {
        let mut summary = Self::empty(nrof_rates);
        let mut delivered = 0u64;
        for outcome in log.iter() {
            summary.nrof_ttis += 1;
            if !outcome.ack {
                summary.nacks += 1;
            }
            delivered += u64::from(outcome.throughput);
            if let Some(slot) = summary.mcs_histogram.get_mut(outcome.mcs) {
                *slot += 1;
            }
        }
        summary.finish(delivered as f64);
        summary
    }

    /// Pool several summaries as if their logs were concatenated.
    pub fn merge<'a>(nrof_rates: usize, parts: impl IntoIterator<Item = &'a LogSummary>) -> Self {
        let mut summary = Self::empty(nrof_rates);
        let mut delivered = 0.0;
        for part in parts {
            summary.nrof_ttis += part.nrof_ttis;
            summary.nacks += part.nacks;
            delivered += part.mean_throughput * part.nrof_ttis as f64;
            for (acc, n) in summary.mcs_histogram.iter_mut().zip(&part.mcs_histogram) {
                *acc += n;
            }
        }
        summary.finish(delivered);
        summary
    }

    fn finish(&mut self, delivered_bits: f64) {
        if self.nrof_ttis > 0 {
            self.bler = self.nacks as f64 / self.nrof_ttis as f64;
            self.mean_throughput = delivered_bits / self.nrof_ttis as f64;
        }
    }

    /// Most frequently selected MCS (lowest index on ties).
    pub fn modal_mcs(&self) -> Option<usize> {
        let max = *self.mcs_histogram.iter().max()?;
        if max == 0 {
            return None;
        }
        self.mcs_histogram.iter().position(|&n| n == max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::TtiOutcome;

    fn log(outcomes: &[(usize, bool, u32)]) -> PolicyLog {
        let mut log = PolicyLog::default();
        for &(mcs, ack, throughput) in outcomes {
            log.push(TtiOutcome {
                mcs,
                ack,
                throughput,
            });
        }
        log
    }

    #[test]
    fn summarizes_a_log() {
        let s = log(&[(1, true, 200), (1, false, 0), (2, true, 400), (0, true, 100)])
            .summary(3);
        assert_eq!(s.nrof_ttis, 4);
        assert_eq!(s.nacks, 1);
        assert!((s.bler - 0.25).abs() < 1e-12);
        assert!((s.mean_throughput - 175.0).abs() < 1e-12);
        assert_eq!(s.mcs_histogram, vec![1, 2, 1]);
        assert_eq!(s.modal_mcs(), Some(1));
    }

    #[test]
    fn empty_log_is_all_zero() {
        let s = PolicyLog::default().summary(2);
        assert_eq!(s, LogSummary::empty(2));
        assert_eq!(s.modal_mcs(), None);
    }

    #[test]
    fn merge_pools_weighted_by_length() {
        let a = log(&[(0, false, 0), (0, false, 0)]).summary(2);
        let b = log(&[(1, true, 300), (1, true, 300), (1, true, 300), (1, false, 0)]).summary(2);
        let m = LogSummary::merge(2, [&a, &b]);
        assert_eq!(m.nrof_ttis, 6);
        assert_eq!(m.nacks, 3);
        assert!((m.bler - 0.5).abs() < 1e-12);
        assert!((m.mean_throughput - 150.0).abs() < 1e-12);
        assert_eq!(m.mcs_histogram, vec![2, 4]);
    }
}
