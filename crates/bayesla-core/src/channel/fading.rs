//! # Rayleigh Fading Process
//!
//! Time-correlated complex Gaussian channel gain, one sample per TTI, built as
//! a Gaussian-weighted sum of sinusoids:
//!
//!   h(t) = (1/√2N) Σ A_n · exp(j(2π f_n t + φ_n))
//!
//! with complex Gaussian weights `A_n`, Clarke angles of arrival
//! (`f_n = f_d · cos θ_n`) and uniform phases. The envelope is Rayleigh, the
//! power is exponential with unit mean, and the autocorrelation follows
//! `J0(2π f_d τ)` where `f_d` is the Doppler spread normalized to the TTI.
//!
//! A zero Doppler spread degenerates to block fading: one coefficient held
//! for the whole trace.

use std::f64::consts::PI;

use rand::Rng;
use rand::RngExt;

use crate::sampling::{complex_normal, standard_normal};

/// Number of oscillators in the sum.
pub const NUM_SINUSOIDS: usize = 64;

/// Smallest power reported, to keep the dB conversion finite.
const POWER_FLOOR: f64 = 1e-12;

#[derive(Debug, Clone)]
enum Process {
    /// Held coefficient (`norm_doppler == 0`).
    Static { re: f64, im: f64 },
    Sinusoids {
        amp_re: [f64; NUM_SINUSOIDS],
        amp_im: [f64; NUM_SINUSOIDS],
        freq: [f64; NUM_SINUSOIDS],
        phase: [f64; NUM_SINUSOIDS],
    },
}

/// Rayleigh fading generator for one link.
#[derive(Debug, Clone)]
pub struct RayleighFading {
    process: Process,
    tti: u64,
}

impl RayleighFading {
    /// `norm_doppler` is the maximum Doppler shift times the TTI duration.
    pub fn new(norm_doppler: f64, rng: &mut impl Rng) -> Self {
        if norm_doppler <= 0.0 {
            let (re, im) = complex_normal(rng);
            return RayleighFading {
                process: Process::Static { re, im },
                tti: 0,
            };
        }

        let mut amp_re = [0.0; NUM_SINUSOIDS];
        let mut amp_im = [0.0; NUM_SINUSOIDS];
        let mut freq = [0.0; NUM_SINUSOIDS];
        let mut phase = [0.0; NUM_SINUSOIDS];
        for n in 0..NUM_SINUSOIDS {
            amp_re[n] = standard_normal(rng);
            amp_im[n] = standard_normal(rng);
            let theta = rng.random::<f64>() * 2.0 * PI - PI;
            freq[n] = norm_doppler * theta.cos();
            phase[n] = rng.random::<f64>() * 2.0 * PI;
        }

        RayleighFading {
            process: Process::Sinusoids {
                amp_re,
                amp_im,
                freq,
                phase,
            },
            tti: 0,
        }
    }

    /// Complex gain at the next TTI, as `(re, im)`.
    pub fn next_coefficient(&mut self) -> (f64, f64) {
        let t = self.tti as f64;
        self.tti += 1;

        match &self.process {
            Process::Static { re, im } => (*re, *im),
            Process::Sinusoids {
                amp_re,
                amp_im,
                freq,
                phase,
            } => {
                let mut x = 0.0;
                let mut y = 0.0;
                for n in 0..NUM_SINUSOIDS {
                    let psi = 2.0 * PI * freq[n] * t + phase[n];
                    let (sin_psi, cos_psi) = psi.sin_cos();
                    x += amp_re[n] * cos_psi - amp_im[n] * sin_psi;
                    y += amp_re[n] * sin_psi + amp_im[n] * cos_psi;
                }
                // E[|A_n|²] = 2, so 1/√(2N) gives unit power.
                let scale = (1.0 / (2.0 * NUM_SINUSOIDS as f64)).sqrt();
                (x * scale, y * scale)
            }
        }
    }

    /// Instantaneous power gain |h|² at the next TTI.
    pub fn next_power(&mut self) -> f64 {
        let (re, im) = self.next_coefficient();
        (re * re + im * im).max(POWER_FLOOR)
    }

    /// Instantaneous power gain in dB at the next TTI.
    pub fn next_gain_db(&mut self) -> f64 {
        10.0 * self.next_power().log10()
    }
}

impl Iterator for RayleighFading {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_power())
    }
}
