//! Discipline logic: admission and selection order, free of any locking.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Which discipline a storage was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Single stack; preempted tasks re-contend like fresh arrivals.
    Lifo,
    /// Fresh arrivals take strict priority over resumed work.
    Per,
}

/// Resident-task counts by admission path, for the external observer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageCounts {
    /// Tasks admitted via `push` and not yet popped.
    pub arrivals: usize,
    /// Tasks admitted via `repush` and not yet popped.
    pub returns: usize,
}

impl StorageCounts {
    pub fn total(&self) -> usize {
        self.arrivals + self.returns
    }
}

/// Closed tagged variant over the two disciplines.
///
/// One shared operation table instead of virtual dispatch; switching
/// discipline is a reconstruct-and-replace at `initialize` time.
///
/// LIFO keeps one stack where `push` and `repush` are identical and `pop`
/// takes the most recently admitted task. PER keeps two FIFO sub-queues:
/// `push` feeds arrivals, `repush` feeds returns, and `pop` drains arrivals
/// before it ever touches returns. Collapsing the two sub-queues would make
/// PER behave exactly like LIFO, which is the known-defective form.
#[derive(Debug)]
pub(crate) enum Discipline {
    Lifo {
        stack: VecDeque<Task>,
    },
    Per {
        arrivals: VecDeque<Task>,
        returns: VecDeque<Task>,
    },
}

impl Discipline {
    pub(crate) fn new(kind: StorageKind) -> Self {
        match kind {
            StorageKind::Lifo => Discipline::Lifo {
                stack: VecDeque::new(),
            },
            StorageKind::Per => Discipline::Per {
                arrivals: VecDeque::new(),
                returns: VecDeque::new(),
            },
        }
    }

    pub(crate) fn kind(&self) -> StorageKind {
        match self {
            Discipline::Lifo { .. } => StorageKind::Lifo,
            Discipline::Per { .. } => StorageKind::Per,
        }
    }

    /// Admit a brand-new arrival.
    pub(crate) fn push(&mut self, task: Task) {
        match self {
            Discipline::Lifo { stack } => stack.push_back(task),
            Discipline::Per { arrivals, .. } => arrivals.push_back(task),
        }
    }

    /// Admit a task returned from an interrupted service attempt.
    pub(crate) fn repush(&mut self, task: Task) {
        match self {
            Discipline::Lifo { stack } => stack.push_back(task),
            Discipline::Per { returns, .. } => returns.push_back(task),
        }
    }

    /// Remove and return the next eligible task, or `None` when empty.
    pub(crate) fn pop(&mut self) -> Option<Task> {
        match self {
            Discipline::Lifo { stack } => stack.pop_back(),
            Discipline::Per { arrivals, returns } => {
                arrivals.pop_front().or_else(|| returns.pop_front())
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Discipline::Lifo { stack } => stack.len(),
            Discipline::Per { arrivals, returns } => arrivals.len() + returns.len(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn counts(&self) -> StorageCounts {
        match self {
            // One stack cannot tell the two admission paths apart.
            Discipline::Lifo { stack } => StorageCounts {
                arrivals: stack.len(),
                returns: 0,
            },
            Discipline::Per { arrivals, returns } => StorageCounts {
                arrivals: arrivals.len(),
                returns: returns.len(),
            },
        }
    }

    /// Visit every resident task in display order: the same order `pop`
    /// would drain them.
    pub(crate) fn for_each(&self, mut visitor: impl FnMut(&Task)) {
        match self {
            Discipline::Lifo { stack } => {
                for task in stack.iter().rev() {
                    visitor(task);
                }
            }
            Discipline::Per { arrivals, returns } => {
                for task in arrivals.iter().chain(returns.iter()) {
                    visitor(task);
                }
            }
        }
    }

    /// Discard all resident tasks.
    pub(crate) fn clear(&mut self) {
        match self {
            Discipline::Lifo { stack } => stack.clear(),
            Discipline::Per { arrivals, returns } => {
                arrivals.clear();
                returns.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Color;
    use rstest::rstest;

    fn task(tag: f32) -> Task {
        Task::new(Color(tag), 1.0)
    }

    fn tag(task: &Task) -> f32 {
        task.color().0
    }

    #[test]
    fn lifo_pops_most_recent_regardless_of_admission_path() {
        let mut d = Discipline::new(StorageKind::Lifo);
        d.push(task(1.0));
        d.repush(task(2.0));
        d.push(task(3.0));
        assert_eq!(tag(&d.pop().unwrap()), 3.0);
        assert_eq!(tag(&d.pop().unwrap()), 2.0);
        assert_eq!(tag(&d.pop().unwrap()), 1.0);
        assert!(d.pop().is_none());
    }

    #[test]
    fn lifo_scenario_push_a_b_pops_b_a() {
        let mut d = Discipline::new(StorageKind::Lifo);
        d.push(task(0.1)); // A
        d.push(task(0.2)); // B
        assert_eq!(tag(&d.pop().unwrap()), 0.2);
        assert_eq!(tag(&d.pop().unwrap()), 0.1);
    }

    #[test]
    fn per_scenario_arrivals_drain_before_returns() {
        let mut d = Discipline::new(StorageKind::Per);
        d.push(task(0.1)); // A
        d.push(task(0.2)); // B
        d.repush(task(0.3)); // C
        assert_eq!(tag(&d.pop().unwrap()), 0.1);
        assert_eq!(tag(&d.pop().unwrap()), 0.2);
        assert_eq!(tag(&d.pop().unwrap()), 0.3);
        assert!(d.pop().is_none());
    }

    #[test]
    fn per_never_returns_repushed_while_arrival_resident() {
        let mut d = Discipline::new(StorageKind::Per);
        d.repush(task(9.0));
        d.repush(task(8.0));
        d.push(task(1.0));
        // The lone arrival wins over both older returns.
        assert_eq!(tag(&d.pop().unwrap()), 1.0);
        // Then the returns drain FIFO.
        assert_eq!(tag(&d.pop().unwrap()), 9.0);
        assert_eq!(tag(&d.pop().unwrap()), 8.0);
    }

    #[test]
    fn per_is_fifo_within_each_sub_queue() {
        let mut d = Discipline::new(StorageKind::Per);
        for i in 0..4 {
            d.push(task(i as f32));
        }
        for i in 0..4 {
            assert_eq!(tag(&d.pop().unwrap()), i as f32);
        }
    }

    #[rstest]
    #[case(StorageKind::Lifo)]
    #[case(StorageKind::Per)]
    fn for_each_visits_every_admitted_task_once(#[case] kind: StorageKind) {
        let mut d = Discipline::new(kind);
        d.push(task(1.0));
        d.repush(task(2.0));
        d.push(task(3.0));

        let mut seen = Vec::new();
        d.for_each(|t| seen.push(tag(t)));
        seen.sort_by(f32::total_cmp);
        assert_eq!(seen, vec![1.0, 2.0, 3.0]);
        // Traversal does not remove anything.
        assert_eq!(d.len(), 3);
    }

    #[test]
    fn per_display_order_matches_pop_priority() {
        let mut d = Discipline::new(StorageKind::Per);
        d.repush(task(3.0));
        d.push(task(1.0));
        d.push(task(2.0));
        d.repush(task(4.0));

        let mut order = Vec::new();
        d.for_each(|t| order.push(tag(t)));
        assert_eq!(order, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn lifo_display_order_is_most_recent_first() {
        let mut d = Discipline::new(StorageKind::Lifo);
        d.push(task(1.0));
        d.push(task(2.0));

        let mut order = Vec::new();
        d.for_each(|t| order.push(tag(t)));
        assert_eq!(order, vec![2.0, 1.0]);
    }

    #[rstest]
    #[case(StorageKind::Lifo)]
    #[case(StorageKind::Per)]
    fn clear_empties_the_store(#[case] kind: StorageKind) {
        let mut d = Discipline::new(kind);
        d.push(task(1.0));
        d.repush(task(2.0));
        d.clear();
        assert!(d.is_empty());
        assert_eq!(d.counts().total(), 0);
    }

    #[test]
    fn per_counts_split_by_admission_path() {
        let mut d = Discipline::new(StorageKind::Per);
        d.push(task(1.0));
        d.push(task(2.0));
        d.repush(task(3.0));
        let counts = d.counts();
        assert_eq!(counts.arrivals, 2);
        assert_eq!(counts.returns, 1);
        assert_eq!(counts.total(), 3);
    }
}
