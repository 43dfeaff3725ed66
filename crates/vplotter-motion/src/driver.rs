//! Synchronized dual-axis step driver
//!
//! For every waypoint of a move the driver:
//! 1. computes the cable length change from the current position
//! 2. converts it to fractional steps and resolves them through the carry
//! 3. sets both direction outputs
//! 4. pulses both axes together for the shorter count, then the longer
//!    axis alone for the remainder
//! 5. waits for the pulses to finish and moves the position to the exact
//!    waypoint
//!
//! The position is never derived from the rounded steps, so rounding error
//! stays bounded by the carry instead of accumulating.

use crate::actuator::Actuator;
use crate::kinematics::MachineGeometry;
use crate::pulse::PulsePlan;
use crate::segmenter::{self, MoveMode};
use crate::steps::{SegmentSteps, StepCarry, StepCounters};
use std::time::Duration;
use vplotter_core::{Axis, AxisSet, Position, Result};
use vplotter_settings::Config;

/// Totals for one completed move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveSummary {
    pub segments: usize,
    pub left_steps: i64,
    pub right_steps: i64,
}

impl MoveSummary {
    fn add(&mut self, steps: SegmentSteps) {
        self.segments += 1;
        self.left_steps = self.left_steps.saturating_add(steps.left);
        self.right_steps = self.right_steps.saturating_add(steps.right);
    }
}

#[derive(Debug, Clone)]
pub struct StepDriver {
    geometry: MachineGeometry,
    carry: StepCarry,
    counters: StepCounters,
    position: Position,
    draw_half_period: Duration,
    travel_half_period: Duration,
    max_segment_length: f64,
}

impl StepDriver {
    pub fn new(
        geometry: MachineGeometry,
        max_segment_length: f64,
        draw_half_period: Duration,
        travel_half_period: Duration,
    ) -> Self {
        Self {
            geometry,
            carry: StepCarry::new(),
            counters: StepCounters::default(),
            position: Position::ORIGIN,
            draw_half_period,
            travel_half_period,
            max_segment_length,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let geometry = MachineGeometry::from_settings(&config.geometry)?;
        Ok(Self::new(
            geometry,
            config.drawing.max_segment_length,
            config.pen_down_half_period(),
            config.pen_up_half_period(),
        ))
    }

    /// Clear the carry and step counters at the start of a job.
    ///
    /// The position is kept; a job starts wherever the carriage is.
    pub fn reset(&mut self) {
        self.carry.reset();
        self.counters.reset();
    }

    pub fn geometry(&self) -> &MachineGeometry {
        &self.geometry
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn carry(&self) -> &StepCarry {
        &self.carry
    }

    pub fn counters(&self) -> &StepCounters {
        &self.counters
    }

    pub fn half_period(&self, mode: MoveMode) -> Duration {
        match mode {
            MoveMode::Draw => self.draw_half_period,
            MoveMode::Travel => self.travel_half_period,
        }
    }

    /// Move to `target`, blocking until every pulse has been played.
    pub fn move_to<A: Actuator + ?Sized>(
        &mut self,
        target: Position,
        mode: MoveMode,
        actuator: &mut A,
    ) -> Result<MoveSummary> {
        self.geometry.reachable_cable_lengths(target)?;

        let half_period = self.half_period(mode);
        let mut summary = MoveSummary::default();

        for waypoint in segmenter::plan(self.position, target, self.max_segment_length, mode) {
            let (d_left, d_right) = self.geometry.cable_delta(self.position, waypoint);
            let (s_left, s_right) = self.geometry.steps_from_delta(d_left, d_right);
            let steps = self.carry.resolve(s_left, s_right);
            self.counters.record(steps);

            let plan = PulsePlan::from_steps(steps);
            actuator.set_direction(Axis::Left, plan.left_direction)?;
            actuator.set_direction(Axis::Right, plan.right_direction)?;
            if plan.combined > 0 {
                actuator.pulse(AxisSet::Both, plan.combined, half_period)?;
            }
            if plan.extra > 0 {
                actuator.pulse(plan.extra_axis.into(), plan.extra, half_period)?;
            }
            actuator.await_completion()?;

            tracing::trace!(
                left = steps.left,
                right = steps.right,
                "Segment to {}",
                waypoint
            );
            self.position = waypoint;
            summary.add(steps);
        }

        tracing::debug!(
            ?mode,
            segments = summary.segments,
            left = summary.left_steps,
            right = summary.right_steps,
            "Moved to {}",
            target
        );
        Ok(summary)
    }
}
