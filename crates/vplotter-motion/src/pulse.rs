//! Pulse planning for one segment
//!
//! Both motors step together for as many ticks as the shorter axis needs,
//! then the longer axis finishes alone. This keeps the two independently
//! geared axes roughly in step without a full line-drawing interpolation.

use crate::steps::SegmentSteps;
use crate::timing;
use std::time::Duration;
use vplotter_core::Axis;

/// Direction signals and pulse counts for one segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulsePlan {
    /// Left direction output level
    pub left_direction: bool,
    /// Right direction output level (inverted, the anchor is mirrored)
    pub right_direction: bool,
    /// Ticks stepping both axes
    pub combined: u64,
    /// Ticks stepping only `extra_axis`
    pub extra: u64,
    pub extra_axis: Axis,
}

impl PulsePlan {
    pub fn from_steps(steps: SegmentSteps) -> Self {
        let left = steps.left.unsigned_abs();
        let right = steps.right.unsigned_abs();
        let combined = left.min(right);

        Self {
            left_direction: steps.left > 0,
            right_direction: steps.right < 0,
            combined,
            extra: left.max(right) - combined,
            extra_axis: if left > right { Axis::Left } else { Axis::Right },
        }
    }

    /// Total pulse ticks, equal to the larger axis step count
    pub fn ticks(&self) -> u64 {
        self.combined + self.extra
    }

    /// Time the plan occupies at the given half-period
    pub fn duration(&self, half_period: Duration) -> Duration {
        timing::pulse_train_duration(self.ticks(), half_period)
    }
}
