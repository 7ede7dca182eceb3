//! Task processor: the service side of the queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::watch;

use crate::params::SimParams;
use crate::storage::TaskStorage;

/// Upper bound on how long the processor stays parked when the storage is
/// empty. The admission notification normally wakes it much sooner.
const IDLE_RETRY: Duration = Duration::from_millis(50);

/// Withdraws tasks from storage, serves them in bounded quanta, and either
/// completes or repushes them.
///
/// Runs as one independent activity in lock-step with the generator. An
/// empty storage is idle time, not an error. A shutdown observed mid-slice
/// still credits the elapsed progress and repushes the survivor before the
/// loop exits, so pause never loses in-flight state.
#[derive(Clone)]
pub struct TaskProcessor {
    storage: Arc<TaskStorage>,
    params: Arc<SimParams>,
    completed: Arc<AtomicU64>,
}

impl TaskProcessor {
    pub fn new(
        storage: Arc<TaskStorage>,
        params: Arc<SimParams>,
        completed: Arc<AtomicU64>,
    ) -> Self {
        Self {
            storage,
            params,
            completed,
        }
    }

    /// Service loop. Returns `self` on exit so the orchestrator can park it
    /// across a pause.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Self {
        loop {
            if *shutdown.borrow() {
                break;
            }

            let mut task = match self.storage.pop().await {
                Ok(task) => task,
                Err(_) => {
                    // Idle: park until something is admitted, bounded by the
                    // retry tick, and interruptible by shutdown.
                    tokio::select! {
                        changed = shutdown.changed() => {
                            if changed.is_err() {
                                break;
                            }
                        }
                        _ = self.storage.admitted() => {}
                        _ = tokio::time::sleep(IDLE_RETRY) => {}
                    }
                    continue;
                }
            };

            // Quantum is read per attempt, never mid-slice.
            let quantum = self.params.tau() * self.params.time_coefficient();
            let remaining = f64::from(task.processing_left());
            let slice = quantum.min(remaining);

            let started = Instant::now();
            let mut interrupted = false;
            let mut closed = false;
            tokio::select! {
                changed = shutdown.changed() => {
                    interrupted = true;
                    closed = changed.is_err();
                }
                _ = tokio::time::sleep(Duration::from_secs_f64(slice)) => {}
            }

            let elapsed = if interrupted {
                started.elapsed().as_secs_f64().min(slice)
            } else {
                slice
            };
            task.set_processing_left((remaining - elapsed) as f32);

            if task.is_complete() {
                self.completed.fetch_add(1, Ordering::Relaxed);
                log::trace!(
                    "completed: color={:.3} attempts={}",
                    task.color().0,
                    task.was_processed() + 1
                );
            } else {
                task.process();
                self.storage.repush(task).await;
            }

            // Control plane gone: nothing will ever flip the flag.
            if closed {
                break;
            }
        }
        self
    }
}
