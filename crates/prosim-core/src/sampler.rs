//! Sampling collaborator for interarrival and service times.
//!
//! The discipline and orchestration logic never sample directly: they go
//! through [`Sampler`], so the distribution family can be swapped (or made
//! deterministic in tests) without touching the engine.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Normal};

use crate::task::Color;

/// Floor for sampled service requirements. A non-positive draw from the
/// truncated normal is lifted here instead of producing an already-complete
/// task.
const MIN_SERVICE_TIME: f64 = 1e-6;

/// Source of the random draws consumed by the generator.
pub trait Sampler: Send {
    /// One interarrival interval in seconds, drawn at the given rate
    /// (already scaled by the time coefficient).
    fn interarrival(&mut self, rate: f64) -> f64;

    /// One service requirement in seconds, parameterized by service rate
    /// `mu` and dispersion `sigma`. Always strictly positive.
    fn service_time(&mut self, mu: f64, sigma: f64) -> f64;

    /// Classification tag for a fresh arrival.
    fn color(&mut self) -> Color;
}

/// Default sampler: exponential interarrivals, normal service times around
/// `1/mu` with dispersion `sigma`, truncated below at [`MIN_SERVICE_TIME`].
pub struct StochasticSampler {
    rng: StdRng,
}

impl StochasticSampler {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for StochasticSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for StochasticSampler {
    fn interarrival(&mut self, rate: f64) -> f64 {
        // Rates are validated positive at the orchestrator boundary, so a
        // construction failure can only mean NaN; fall back to no wait.
        Exp::new(rate)
            .map(|dist| dist.sample(&mut self.rng))
            .unwrap_or(0.0)
    }

    fn service_time(&mut self, mu: f64, sigma: f64) -> f64 {
        let mean = 1.0 / mu;
        Normal::new(mean, sigma)
            .map(|dist| dist.sample(&mut self.rng))
            .unwrap_or(mean)
            .max(MIN_SERVICE_TIME)
    }

    fn color(&mut self) -> Color {
        Color(self.rng.gen_range(0.0..1.0))
    }
}

/// Deterministic sampler for tests: fixed interarrival and service time.
#[cfg(test)]
pub(crate) struct FixedSampler {
    pub interarrival: f64,
    pub service_time: f64,
}

#[cfg(test)]
impl Sampler for FixedSampler {
    fn interarrival(&mut self, _rate: f64) -> f64 {
        self.interarrival
    }

    fn service_time(&mut self, _mu: f64, _sigma: f64) -> f64 {
        self.service_time
    }

    fn color(&mut self) -> Color {
        Color(0.5)
    }
}
