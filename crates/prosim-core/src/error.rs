//! Error types for the queueing engine.

use thiserror::Error;

/// Errors raised by the engine.
///
/// None of these is fatal: `EmptyStorage` is expected control flow for an
/// idle processor, the rest are caller-correctable state errors.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    /// `pop` found no resident task. The processor treats this as "idle",
    /// not as a failure.
    #[error("storage is empty")]
    EmptyStorage,

    /// `initialize` was called while the simulator is Running or Paused.
    /// Switching discipline requires a stopped engine.
    #[error("simulator is already running")]
    AlreadyRunning,

    /// `start` was called before any `initialize`.
    #[error("simulator has not been initialized")]
    NotInitialized,

    /// A tunable was set to a non-positive or non-finite value. The engine
    /// state is unchanged.
    #[error("parameter {name} must be a positive finite number, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}
