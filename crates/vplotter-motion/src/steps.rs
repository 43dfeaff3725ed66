//! Integer step resolution with fractional carry
//!
//! Each segment asks for a fractional number of steps per axis. Only the
//! integer part can be emitted; the fractional remainder is carried into
//! the next segment so rounding never accumulates. After every segment
//! `|carry| < 1` on both axes.

use serde::{Deserialize, Serialize};

/// Signed integer steps for one segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SegmentSteps {
    pub left: i64,
    pub right: i64,
}

impl SegmentSteps {
    pub fn new(left: i64, right: i64) -> Self {
        Self { left, right }
    }

    /// Steps on the busier axis; this is what the segment's duration scales with.
    pub fn max_magnitude(&self) -> u64 {
        self.left.unsigned_abs().max(self.right.unsigned_abs())
    }

    pub fn is_zero(&self) -> bool {
        self.left == 0 && self.right == 0
    }
}

/// Per-axis fractional step accumulator
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StepCarry {
    left: f64,
    right: f64,
}

impl StepCarry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn right(&self) -> f64 {
        self.right
    }

    /// Turn fractional step requests into integer steps, updating the carry.
    pub fn resolve(&mut self, left: f64, right: f64) -> SegmentSteps {
        SegmentSteps {
            left: resolve_axis(&mut self.left, left),
            right: resolve_axis(&mut self.right, right),
        }
    }
}

fn resolve_axis(carry: &mut f64, requested: f64) -> i64 {
    let whole = requested.trunc();
    *carry += requested - whole;
    let mut steps = whole as i64;

    if carry.abs() >= 1.0 {
        let unit = carry.signum();
        steps += unit as i64;
        *carry -= unit;
    }

    steps
}

/// Cumulative signed steps since the start of the job
///
/// A diagnostic reconstruction path; the driver's position stays the
/// authoritative pen location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepCounters {
    pub left: i64,
    pub right: i64,
}

impl StepCounters {
    pub fn record(&mut self, steps: SegmentSteps) {
        self.left = self.left.saturating_add(steps.left);
        self.right = self.right.saturating_add(steps.right);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
