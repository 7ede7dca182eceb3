//! Shared task storage: one discipline instance behind one lock.

mod discipline;

pub use discipline::{StorageCounts, StorageKind};

use tokio::sync::{Mutex, Notify};

use crate::error::SimError;
use crate::task::Task;
use discipline::Discipline;

/// The one queue between the generator and the processor.
///
/// Every operation takes the same mutex, so concurrent push/repush/pop and
/// traversal never observe a torn state. `notify` wakes an idle processor
/// when a task is admitted; a missed notification is harmless because the
/// processor's idle wait is also bounded by a retry tick.
#[derive(Debug)]
pub struct TaskStorage {
    state: Mutex<Discipline>,
    notify: Notify,
}

impl TaskStorage {
    pub fn new(kind: StorageKind) -> Self {
        Self {
            state: Mutex::new(Discipline::new(kind)),
            notify: Notify::new(),
        }
    }

    pub async fn kind(&self) -> StorageKind {
        self.state.lock().await.kind()
    }

    /// Admit a brand-new arrival. Always succeeds.
    pub async fn push(&self, task: Task) {
        debug_assert!(!task.is_complete(), "complete task pushed");
        let mut state = self.state.lock().await;
        state.push(task);
        drop(state);
        self.notify.notify_one();
    }

    /// Admit a task returned from an interrupted service attempt.
    pub async fn repush(&self, task: Task) {
        debug_assert!(!task.is_complete(), "complete task repushed");
        let mut state = self.state.lock().await;
        state.repush(task);
        drop(state);
        self.notify.notify_one();
    }

    /// Remove and return the next eligible task per discipline order.
    pub async fn pop(&self) -> Result<Task, SimError> {
        let mut state = self.state.lock().await;
        state.pop().ok_or(SimError::EmptyStorage)
    }

    /// Resolves when a task has been admitted since this call started.
    /// Used by the processor to park between empty-pop retries.
    pub async fn admitted(&self) {
        self.notify.notified().await;
    }

    /// Visit every resident task in display order without removing any.
    /// Takes the same lock as `pop`, so a traversal is never torn.
    pub async fn for_each(&self, visitor: impl FnMut(&Task)) {
        let state = self.state.lock().await;
        state.for_each(visitor);
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.is_empty()
    }

    pub async fn counts(&self) -> StorageCounts {
        self.state.lock().await.counts()
    }

    /// Discard all resident tasks. Only the orchestrator calls this, after
    /// both activities have terminated.
    pub async fn clear(&self) {
        self.state.lock().await.clear();
    }
}
