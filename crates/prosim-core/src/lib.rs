//! prosim-core
//!
//! A single-server queueing simulator: one stochastic task generator, one
//! discipline-specific task storage, one task processor, orchestrated by
//! [`ProcessorSimulator`].
//!
//! # Modules
//! - **task**: the unit of work (color tag, remaining requirement, attempt count)
//! - **storage**: the shared store and its two disciplines (LIFO, PER)
//! - **sampler**: the replaceable random-draw collaborator
//! - **params**: the five live tunables (time coefficient, λ, μ, σ, τ)
//! - **generator** / **processor**: the two concurrent activities
//! - **simulator**: lifecycle control (initialize / start / pause / stop)
//! - **status**: snapshot views for a polling observer
//! - **error**: the error taxonomy
//!
//! Data flow: generator → `TaskStorage::push` → processor `pop` →
//! (complete | `repush`).

pub mod error;
pub mod generator;
pub mod params;
pub mod processor;
pub mod sampler;
pub mod simulator;
pub mod status;
pub mod storage;
pub mod task;

pub use error::SimError;
pub use generator::TaskGenerator;
pub use params::SimParams;
pub use processor::TaskProcessor;
pub use sampler::{Sampler, StochasticSampler};
pub use simulator::ProcessorSimulator;
pub use status::{LifecycleState, SimulatorStatus};
pub use storage::{StorageCounts, StorageKind, TaskStorage};
pub use task::{Color, Task};
