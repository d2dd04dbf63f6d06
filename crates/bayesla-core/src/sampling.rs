//! # Sampling Utilities
//!
//! Beta posteriors for Thompson Sampling plus the Gaussian and Gamma draws
//! behind them. Every sampler takes an explicit generator so experiments stay
//! reproducible and independent.

use rand::Rng;
use rand::RngExt;
use serde::{Deserialize, Serialize};

/// Parameters of a Beta distribution over a success probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaParams {
    /// Success pseudo-count (α).
    pub alpha: f64,
    /// Failure pseudo-count (β).
    pub beta: f64,
}

impl BetaParams {
    /// Informed prior whose mean success probability is `1 - bler`, carrying
    /// `strength` pseudo-observations. `bler` is clamped to
    /// `[floor, 1 - floor]` so both parameters stay positive.
    pub fn from_bler(bler: f64, strength: f64, floor: f64) -> Self {
        let p = bler.clamp(floor, 1.0 - floor);
        BetaParams {
            alpha: strength * (1.0 - p),
            beta: strength * p,
        }
    }

    /// Expected value E[X] = α / (α + β).
    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    /// Total pseudo-count α + β. Grows by one per observation.
    pub fn precision(&self) -> f64 {
        self.alpha + self.beta
    }

    /// Conjugate Beta-Bernoulli update.
    pub fn observe(&mut self, success: bool) {
        if success {
            self.alpha += 1.0;
        } else {
            self.beta += 1.0;
        }
    }

    /// Draw a success probability: Beta(a,b) = Ga/(Ga+Gb) with
    /// Ga ~ Gamma(a,1), Gb ~ Gamma(b,1).
    pub fn sample(&self, rng: &mut impl Rng) -> f64 {
        let ga = gamma_sample(self.alpha, rng);
        let gb = gamma_sample(self.beta, rng);
        if ga + gb == 0.0 {
            0.5
        } else {
            ga / (ga + gb)
        }
    }
}

/// Gamma(shape, 1) sampler using Marsaglia and Tsang's method.
pub fn gamma_sample(shape: f64, rng: &mut impl Rng) -> f64 {
    if shape < 1.0 {
        // Boost: Gamma(a) = Gamma(a+1) * U^(1/a)
        let u: f64 = rng.random();
        return gamma_sample(shape + 1.0, rng) * u.powf(1.0 / shape);
    }

    let d = shape - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();

    loop {
        let x = standard_normal(rng);
        let v = (1.0 + c * x).powi(3);
        if v <= 0.0 {
            continue;
        }
        let u: f64 = rng.random();
        if u < 1.0 - 0.0331 * x.powi(4) {
            return d * v;
        }
        if u.ln() < 0.5 * x * x + d * (1.0 - v + v.ln()) {
            return d * v;
        }
    }
}

/// Box-Muller standard normal.
pub fn standard_normal(rng: &mut impl Rng) -> f64 {
    let u1: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.random();
    (-2.0_f64 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Circularly-symmetric complex Gaussian with unit mean power, as `(re, im)`.
pub fn complex_normal(rng: &mut impl Rng) -> (f64, f64) {
    let scale = std::f64::consts::FRAC_1_SQRT_2;
    (standard_normal(rng) * scale, standard_normal(rng) * scale)
}
