//! Tunable simulation parameters, shared between the control plane and the
//! generator/processor activities.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::SimError;

/// The five tunables of the engine.
///
/// Each field is an `f64` stored as its bit pattern in an `AtomicU64`, so a
/// parameter change is a single atomic store visible to the next read by
/// either activity. No stronger ordering is needed: parameters only scale
/// future scheduling draws, never one already in progress.
#[derive(Debug)]
pub struct SimParams {
    /// Global scalar applied to all simulated intervals.
    time_coefficient: AtomicU64,
    /// Arrival rate (λ) of the generator.
    lambda: AtomicU64,
    /// Service rate (μ); larger μ means shorter total requirements.
    mu: AtomicU64,
    /// Service-time dispersion (σ).
    sigma: AtomicU64,
    /// Preemption quantum (τ), in seconds.
    tau: AtomicU64,
}

fn cell(value: f64) -> AtomicU64 {
    AtomicU64::new(value.to_bits())
}

fn load(cell: &AtomicU64) -> f64 {
    f64::from_bits(cell.load(Ordering::Relaxed))
}

fn store(cell: &AtomicU64, name: &'static str, value: f64) -> Result<(), SimError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SimError::InvalidParameter { name, value });
    }
    cell.store(value.to_bits(), Ordering::Relaxed);
    Ok(())
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            time_coefficient: cell(1.0),
            lambda: cell(1.0),
            mu: cell(1.0),
            sigma: cell(0.1),
            tau: cell(0.5),
        }
    }
}

impl SimParams {
    pub fn time_coefficient(&self) -> f64 {
        load(&self.time_coefficient)
    }

    pub fn lambda(&self) -> f64 {
        load(&self.lambda)
    }

    pub fn mu(&self) -> f64 {
        load(&self.mu)
    }

    pub fn sigma(&self) -> f64 {
        load(&self.sigma)
    }

    pub fn tau(&self) -> f64 {
        load(&self.tau)
    }

    pub fn set_time_coefficient(&self, value: f64) -> Result<(), SimError> {
        store(&self.time_coefficient, "time_coefficient", value)
    }

    pub fn set_lambda(&self, value: f64) -> Result<(), SimError> {
        store(&self.lambda, "lambda", value)
    }

    pub fn set_mu(&self, value: f64) -> Result<(), SimError> {
        store(&self.mu, "mu", value)
    }

    pub fn set_sigma(&self, value: f64) -> Result<(), SimError> {
        store(&self.sigma, "sigma", value)
    }

    pub fn set_tau(&self, value: f64) -> Result<(), SimError> {
        store(&self.tau, "tau", value)
    }
}
