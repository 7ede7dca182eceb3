//! ProcessorSimulator: the orchestrator and sole external entry point.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use crate::error::SimError;
use crate::generator::TaskGenerator;
use crate::params::SimParams;
use crate::processor::TaskProcessor;
use crate::sampler::{Sampler, StochasticSampler};
use crate::status::{LifecycleState, SimulatorStatus};
use crate::storage::{StorageKind, TaskStorage};

/// Live generator/processor activities plus the channel that stops them.
struct Activities {
    shutdown_tx: watch::Sender<bool>,
    generator: JoinHandle<TaskGenerator>,
    processor: JoinHandle<TaskProcessor>,
}

/// Control-plane state, guarded by one mutex so concurrent lifecycle calls
/// serialize against each other.
struct Inner {
    state: LifecycleState,
    storage: Option<Arc<TaskStorage>>,
    /// Parked while not Running; taken by `start`, returned by suspension.
    generator: Option<TaskGenerator>,
    processor: Option<TaskProcessor>,
    activities: Option<Activities>,
}

/// Orchestrator owning one generator, one storage, and one processor.
///
/// Lifecycle: `initialize` selects the discipline (only while stopped),
/// `start` spawns both activities, `pause` suspends them keeping queue
/// contents and in-flight progress, `stop` terminates them and clears the
/// storage. Parameter changes are legal in any state and apply to the next
/// scheduling decision.
pub struct ProcessorSimulator {
    inner: Mutex<Inner>,
    params: Arc<SimParams>,
    generated: Arc<AtomicU64>,
    completed: Arc<AtomicU64>,
    // Lock-free mirrors for the pure observers.
    running: AtomicBool,
    kind_cell: AtomicU8,
}

const KIND_NONE: u8 = 0;
const KIND_LIFO: u8 = 1;
const KIND_PER: u8 = 2;

fn encode_kind(kind: StorageKind) -> u8 {
    match kind {
        StorageKind::Lifo => KIND_LIFO,
        StorageKind::Per => KIND_PER,
    }
}

fn decode_kind(raw: u8) -> Option<StorageKind> {
    match raw {
        KIND_LIFO => Some(StorageKind::Lifo),
        KIND_PER => Some(StorageKind::Per),
        _ => None,
    }
}

impl ProcessorSimulator {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: LifecycleState::Uninitialized,
                storage: None,
                generator: None,
                processor: None,
                activities: None,
            }),
            params: Arc::new(SimParams::default()),
            generated: Arc::new(AtomicU64::new(0)),
            completed: Arc::new(AtomicU64::new(0)),
            running: AtomicBool::new(false),
            kind_cell: AtomicU8::new(KIND_NONE),
        }
    }

    /// Construct (or replace) the storage of the requested discipline along
    /// with fresh generator and processor instances. Legal only while the
    /// engine is not running.
    pub async fn initialize(&self, kind: StorageKind) -> Result<(), SimError> {
        self.initialize_with_sampler(kind, Box::new(StochasticSampler::new()))
            .await
    }

    /// Like [`initialize`](Self::initialize) but with a caller-supplied
    /// sampling collaborator.
    pub async fn initialize_with_sampler(
        &self,
        kind: StorageKind,
        sampler: Box<dyn Sampler>,
    ) -> Result<(), SimError> {
        let mut inner = self.inner.lock().await;
        match inner.state {
            LifecycleState::Running | LifecycleState::Paused => Err(SimError::AlreadyRunning),
            LifecycleState::Uninitialized | LifecycleState::Stopped => {
                let storage = Arc::new(TaskStorage::new(kind));
                inner.generator = Some(TaskGenerator::new(
                    Arc::clone(&storage),
                    Arc::clone(&self.params),
                    sampler,
                    Arc::clone(&self.generated),
                ));
                inner.processor = Some(TaskProcessor::new(
                    Arc::clone(&storage),
                    Arc::clone(&self.params),
                    Arc::clone(&self.completed),
                ));
                inner.storage = Some(storage);
                inner.state = LifecycleState::Stopped;
                self.generated.store(0, Ordering::Relaxed);
                self.completed.store(0, Ordering::Relaxed);
                self.kind_cell.store(encode_kind(kind), Ordering::Relaxed);
                log::info!("initialized with {kind:?} storage");
                Ok(())
            }
        }
    }

    /// Spin up the generator and processor activities. After `stop` the run
    /// begins with an empty storage; after `pause` it resumes with storage
    /// intact. No-op when already running.
    pub async fn start(&self) -> Result<(), SimError> {
        let mut inner = self.inner.lock().await;
        match inner.state {
            LifecycleState::Running => Ok(()),
            LifecycleState::Uninitialized => Err(SimError::NotInitialized),
            LifecycleState::Stopped | LifecycleState::Paused => {
                let Some(generator) = inner.generator.take() else {
                    return Err(SimError::NotInitialized);
                };
                let Some(processor) = inner.processor.take() else {
                    return Err(SimError::NotInitialized);
                };

                let (shutdown_tx, shutdown_rx) = watch::channel(false);
                let generator = tokio::spawn(generator.run(shutdown_rx.clone()));
                let processor = tokio::spawn(processor.run(shutdown_rx));
                inner.activities = Some(Activities {
                    shutdown_tx,
                    generator,
                    processor,
                });
                inner.state = LifecycleState::Running;
                self.running.store(true, Ordering::Relaxed);
                log::info!("started");
                Ok(())
            }
        }
    }

    /// Suspend both activities, keeping queue contents and in-flight task
    /// progress. Blocks until both have reached their safe suspension point.
    /// Idle when not running.
    pub async fn pause(&self) -> Result<(), SimError> {
        let mut inner = self.inner.lock().await;
        if inner.state != LifecycleState::Running {
            return Ok(());
        }
        self.suspend(&mut inner).await;
        inner.state = LifecycleState::Paused;
        log::info!("paused");
        Ok(())
    }

    /// Terminate both activities and discard all queue contents. A fresh
    /// `start` afterwards begins empty. No-op when already stopped.
    pub async fn stop(&self) -> Result<(), SimError> {
        let mut inner = self.inner.lock().await;
        match inner.state {
            LifecycleState::Uninitialized | LifecycleState::Stopped => Ok(()),
            LifecycleState::Running | LifecycleState::Paused => {
                // Both activities must be fully terminated before the clear:
                // a late push or pop against a cleared storage would violate
                // the reset semantics.
                self.suspend(&mut inner).await;
                if let Some(storage) = &inner.storage {
                    storage.clear().await;
                }
                self.generated.store(0, Ordering::Relaxed);
                self.completed.store(0, Ordering::Relaxed);
                inner.state = LifecycleState::Stopped;
                log::info!("stopped");
                Ok(())
            }
        }
    }

    /// Signal shutdown and wait for both activities to exit, parking them
    /// for a later `start`.
    async fn suspend(&self, inner: &mut Inner) {
        let Some(activities) = inner.activities.take() else {
            return;
        };
        let _ = activities.shutdown_tx.send(true);

        match activities.generator.await {
            Ok(generator) => inner.generator = Some(generator),
            Err(err) => {
                log::error!("generator activity failed: {err}");
                if let Some(storage) = &inner.storage {
                    inner.generator = Some(TaskGenerator::new(
                        Arc::clone(storage),
                        Arc::clone(&self.params),
                        Box::new(StochasticSampler::new()),
                        Arc::clone(&self.generated),
                    ));
                }
            }
        }
        match activities.processor.await {
            Ok(processor) => inner.processor = Some(processor),
            Err(err) => {
                log::error!("processor activity failed: {err}");
                if let Some(storage) = &inner.storage {
                    inner.processor = Some(TaskProcessor::new(
                        Arc::clone(storage),
                        Arc::clone(&self.params),
                        Arc::clone(&self.completed),
                    ));
                }
            }
        }
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn change_time_coefficient(&self, value: f64) -> Result<(), SimError> {
        self.params.set_time_coefficient(value)
    }

    pub fn change_lambda(&self, value: f64) -> Result<(), SimError> {
        self.params.set_lambda(value)
    }

    pub fn change_mu(&self, value: f64) -> Result<(), SimError> {
        self.params.set_mu(value)
    }

    pub fn change_sigma(&self, value: f64) -> Result<(), SimError> {
        self.params.set_sigma(value)
    }

    pub fn change_tau(&self, value: f64) -> Result<(), SimError> {
        self.params.set_tau(value)
    }

    /// True only while in the Running state.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Discipline selected at the last `initialize`, if any.
    pub fn kind(&self) -> Option<StorageKind> {
        decode_kind(self.kind_cell.load(Ordering::Relaxed))
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn generated(&self) -> u64 {
        self.generated.load(Ordering::Relaxed)
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// The live storage, for the visualization collaborator's `for_each`.
    pub async fn storage(&self) -> Option<Arc<TaskStorage>> {
        self.inner.lock().await.storage.clone()
    }

    pub async fn state(&self) -> LifecycleState {
        self.inner.lock().await.state
    }

    /// Snapshot for the polling observer.
    pub async fn status(&self) -> SimulatorStatus {
        let inner = self.inner.lock().await;
        let counts = match &inner.storage {
            Some(storage) => storage.counts().await,
            None => Default::default(),
        };
        SimulatorStatus {
            state: inner.state,
            kind: self.kind(),
            counts,
            generated: self.generated(),
            completed: self.completed(),
        }
    }
}

impl Default for ProcessorSimulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::FixedSampler;
    use std::time::Duration;
    use tokio::time::timeout;

    /// Sampler producing a steady trickle of long-running tasks, so paused
    /// snapshots reliably have resident work.
    fn busy_sampler() -> Box<dyn Sampler> {
        Box::new(FixedSampler {
            interarrival: 0.005,
            service_time: 30.0,
        })
    }

    #[tokio::test]
    async fn start_before_initialize_is_rejected() {
        let sim = ProcessorSimulator::new();
        assert_eq!(sim.start().await.unwrap_err(), SimError::NotInitialized);
    }

    #[tokio::test]
    async fn initialize_while_running_is_rejected() {
        let sim = ProcessorSimulator::new();
        sim.initialize_with_sampler(StorageKind::Per, busy_sampler())
            .await
            .unwrap();
        sim.start().await.unwrap();
        assert_eq!(
            sim.initialize(StorageKind::Lifo).await.unwrap_err(),
            SimError::AlreadyRunning
        );

        sim.pause().await.unwrap();
        assert_eq!(
            sim.initialize(StorageKind::Lifo).await.unwrap_err(),
            SimError::AlreadyRunning
        );

        sim.stop().await.unwrap();
        sim.initialize(StorageKind::Lifo).await.unwrap();
        assert_eq!(sim.kind(), Some(StorageKind::Lifo));
    }

    #[tokio::test]
    async fn start_pause_stop_does_not_deadlock() {
        let sim = ProcessorSimulator::new();
        sim.initialize_with_sampler(StorageKind::Lifo, busy_sampler())
            .await
            .unwrap();

        timeout(Duration::from_secs(5), async {
            sim.start().await.unwrap();
            sim.pause().await.unwrap();
            sim.stop().await.unwrap();
        })
        .await
        .expect("lifecycle sequence deadlocked");

        assert!(!sim.is_running());
        let status = sim.status().await;
        assert_eq!(status.state, LifecycleState::Stopped);
        assert_eq!(status.counts.total(), 0);
    }

    #[tokio::test]
    async fn lifecycle_calls_are_idempotent() {
        let sim = ProcessorSimulator::new();
        sim.initialize_with_sampler(StorageKind::Per, busy_sampler())
            .await
            .unwrap();

        sim.start().await.unwrap();
        sim.start().await.unwrap();
        assert!(sim.is_running());

        sim.pause().await.unwrap();
        sim.pause().await.unwrap();
        assert_eq!(sim.state().await, LifecycleState::Paused);

        sim.stop().await.unwrap();
        sim.stop().await.unwrap();
        assert_eq!(sim.state().await, LifecycleState::Stopped);
    }

    #[tokio::test]
    async fn pause_preserves_storage_and_stop_clears_it() {
        let sim = ProcessorSimulator::new();
        sim.initialize_with_sampler(StorageKind::Per, busy_sampler())
            .await
            .unwrap();
        sim.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        sim.pause().await.unwrap();

        let paused = sim.status().await;
        assert!(paused.generated > 0, "nothing arrived while running");
        assert!(paused.counts.total() > 0, "pause discarded the queue");

        // Resume keeps accumulating on the same storage.
        sim.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        sim.pause().await.unwrap();
        let resumed = sim.status().await;
        assert!(resumed.generated >= paused.generated);

        sim.stop().await.unwrap();
        let stopped = sim.status().await;
        assert_eq!(stopped.counts.total(), 0);
        assert_eq!(stopped.generated, 0);
    }

    #[tokio::test]
    async fn conservation_holds_at_every_paused_point() {
        let sim = ProcessorSimulator::new();
        // Short tasks so some actually complete during the window.
        sim.initialize_with_sampler(
            StorageKind::Per,
            Box::new(FixedSampler {
                interarrival: 0.002,
                service_time: 0.01,
            }),
        )
        .await
        .unwrap();

        for _ in 0..3 {
            sim.start().await.unwrap();
            tokio::time::sleep(Duration::from_millis(80)).await;
            sim.pause().await.unwrap();

            let status = sim.status().await;
            assert_eq!(
                status.generated,
                status.completed + status.counts.total() as u64,
                "task lost or duplicated: {status:?}"
            );
        }
        sim.stop().await.unwrap();
    }

    #[tokio::test]
    async fn parameter_changes_are_legal_in_any_state() {
        let sim = ProcessorSimulator::new();
        sim.change_lambda(3.0).unwrap();

        sim.initialize_with_sampler(StorageKind::Lifo, busy_sampler())
            .await
            .unwrap();
        sim.start().await.unwrap();
        sim.change_tau(0.125).unwrap();
        sim.change_time_coefficient(2.0).unwrap();
        sim.pause().await.unwrap();
        sim.change_mu(4.0).unwrap();
        sim.stop().await.unwrap();

        assert_eq!(sim.params().tau(), 0.125);
        assert_eq!(sim.params().mu(), 4.0);
    }

    #[tokio::test]
    async fn invalid_parameters_leave_state_unchanged() {
        let sim = ProcessorSimulator::new();
        sim.change_sigma(0.2).unwrap();
        let err = sim.change_sigma(-1.0).unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter { name: "sigma", .. }));
        assert_eq!(sim.params().sigma(), 0.2);
    }

    #[tokio::test]
    async fn observers_track_the_lifecycle() {
        let sim = ProcessorSimulator::new();
        assert!(!sim.is_running());
        assert_eq!(sim.kind(), None);
        assert_eq!(sim.state().await, LifecycleState::Uninitialized);

        sim.initialize_with_sampler(StorageKind::Per, busy_sampler())
            .await
            .unwrap();
        assert_eq!(sim.kind(), Some(StorageKind::Per));
        assert_eq!(sim.state().await, LifecycleState::Stopped);

        sim.start().await.unwrap();
        assert!(sim.is_running());
        sim.pause().await.unwrap();
        assert!(!sim.is_running());
        sim.stop().await.unwrap();
        assert!(!sim.is_running());
    }

    #[tokio::test]
    async fn status_snapshot_serializes() {
        let sim = ProcessorSimulator::new();
        sim.initialize_with_sampler(StorageKind::Per, busy_sampler())
            .await
            .unwrap();
        let json = serde_json::to_value(sim.status().await).unwrap();
        assert_eq!(json["state"], "stopped");
        assert_eq!(json["kind"], "per");
    }
}
