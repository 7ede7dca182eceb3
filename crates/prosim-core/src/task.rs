//! Task: the unit of work flowing through the system.

use serde::{Deserialize, Serialize};

/// Classification tag assigned at creation, e.g. to tell arrival batches
/// apart in a display. Negative means "not assigned yet".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color(pub f32);

impl Color {
    pub const UNSET: Color = Color(-1.0);

    pub fn is_set(self) -> bool {
        self.0 >= 0.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::UNSET
    }
}

/// A unit of work: immutable identity, mutable progress.
///
/// Created by the generator with its full service requirement, mutated only
/// while held by the processor, dropped on completion. Copies are full
/// field-wise copies; there is no shared ownership between copies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Task {
    color: Color,
    processing_left: f32,
    was_processed: u32,
}

impl Task {
    pub fn new(color: Color, processing_left: f32) -> Self {
        Self {
            color,
            processing_left: processing_left.max(0.0),
            was_processed: 0,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Remaining service time. Never negative.
    pub fn processing_left(&self) -> f32 {
        self.processing_left
    }

    /// Set the remaining service time, clamping at zero.
    pub fn set_processing_left(&mut self, value: f32) {
        self.processing_left = value.max(0.0);
    }

    /// Number of times this task has been handed to the processor,
    /// counting attempts that ended in preemption.
    pub fn was_processed(&self) -> u32 {
        self.was_processed
    }

    /// Record one service attempt.
    pub fn process(&mut self) {
        self.was_processed += 1;
    }

    /// A task with no remaining requirement is complete and must never be
    /// admitted to storage again.
    pub fn is_complete(&self) -> bool {
        self.processing_left == 0.0
    }
}
