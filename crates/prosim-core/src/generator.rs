//! Task generator: the arrival side of the queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;

use crate::params::SimParams;
use crate::sampler::Sampler;
use crate::storage::TaskStorage;
use crate::task::Task;

/// Produces new tasks at a stochastic rate and pushes them into storage.
///
/// Runs as one independent activity while the simulator is running. The
/// interarrival sleep is raced against the shutdown watch channel, so a
/// pause or stop interrupts the wait instead of letting it elapse.
pub struct TaskGenerator {
    storage: Arc<TaskStorage>,
    params: Arc<SimParams>,
    sampler: Box<dyn Sampler>,
    generated: Arc<AtomicU64>,
}

impl TaskGenerator {
    pub fn new(
        storage: Arc<TaskStorage>,
        params: Arc<SimParams>,
        sampler: Box<dyn Sampler>,
        generated: Arc<AtomicU64>,
    ) -> Self {
        Self {
            storage,
            params,
            sampler,
            generated,
        }
    }

    /// Arrival loop. Returns `self` on exit so the orchestrator can park the
    /// generator across a pause and resume it with the same sampler state.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Self {
        loop {
            if *shutdown.borrow() {
                break;
            }

            // Parameter changes take effect here, on the next draw.
            let rate = self.params.lambda() * self.params.time_coefficient();
            let wait = Duration::from_secs_f64(self.sampler.interarrival(rate));

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        // Control plane went away; treat as stop.
                        break;
                    }
                    continue;
                }
                _ = tokio::time::sleep(wait) => {}
            }

            let service = self.sampler.service_time(self.params.mu(), self.params.sigma());
            let task = Task::new(self.sampler.color(), service as f32);
            log::trace!(
                "arrival: color={:.3} requirement={:.4}s",
                task.color().0,
                task.processing_left()
            );
            self.storage.push(task).await;
            self.generated.fetch_add(1, Ordering::Relaxed);
        }
        self
    }
}
