//! Status views for external observers.

use serde::{Deserialize, Serialize};

use crate::storage::{StorageCounts, StorageKind};

/// Lifecycle state of the simulator.
///
/// Transitions: `Uninitialized → Stopped → Running ⇄ Paused → Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Uninitialized,
    Stopped,
    Running,
    Paused,
}

/// Point-in-time snapshot of the engine, polled by the external observer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorStatus {
    pub state: LifecycleState,
    pub kind: Option<StorageKind>,
    pub counts: StorageCounts,
    /// Tasks pushed by the generator since the last reset.
    pub generated: u64,
    /// Tasks fully served and discarded since the last reset.
    pub completed: u64,
}
