//! Plot time estimation
//!
//! Replays a program without touching any hardware. Parsing, offsets,
//! segmentation, kinematics and step rounding are the same as a real run,
//! using a carry of its own, so the estimate follows the pulse counts the
//! driver would emit:
//! - every segment costs `max(|left|, |right|)` full step periods at the
//!   speed of its move
//! - every pen transition costs its ramp duration
//! - the final pen raise and park travel are included

use crate::parser::{Command, Program};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead};
use std::time::Duration;
use vplotter_core::{PenState, Position, Result};
use vplotter_motion::{
    segmenter, timing, MachineGeometry, MoveMode, PenController, StepCarry,
};
use vplotter_settings::Config;

/// Predicted duration of a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeEstimate {
    pub total: Duration,
    /// Segments the driver would execute
    pub segments: usize,
    /// Pen raises and lowers
    pub pen_transitions: usize,
}

impl TimeEstimate {
    pub fn minutes(&self) -> f64 {
        timing::as_minutes(self.total)
    }
}

pub struct TimeEstimator {
    geometry: MachineGeometry,
    pen: PenController,
    offset_x: f64,
    offset_y: f64,
    max_segment_length: f64,
    draw_half_period: Duration,
    travel_half_period: Duration,
}

/// Replay state for one estimate
struct Replay<'e> {
    estimator: &'e TimeEstimator,
    carry: StepCarry,
    position: Position,
    pen: PenState,
    estimate: TimeEstimate,
}

impl TimeEstimator {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            geometry: MachineGeometry::from_settings(&config.geometry)?,
            pen: PenController::new(&config.pen),
            offset_x: config.drawing.offset_x,
            offset_y: config.drawing.offset_y,
            max_segment_length: config.drawing.max_segment_length,
            draw_half_period: config.pen_down_half_period(),
            travel_half_period: config.pen_up_half_period(),
        })
    }

    pub fn estimate<R: BufRead>(&self, reader: R) -> Result<TimeEstimate> {
        self.estimate_lines(reader.lines())
    }

    pub fn estimate_lines<I>(&self, lines: I) -> Result<TimeEstimate>
    where
        I: IntoIterator<Item = io::Result<String>>,
    {
        let mut replay = Replay {
            estimator: self,
            carry: StepCarry::new(),
            position: Position::ORIGIN,
            pen: PenState::Up,
            estimate: TimeEstimate::default(),
        };

        for entry in Program::new(lines.into_iter()) {
            let (_, command) = entry?;
            match command {
                Command::Travel(target) => {
                    replay.raise();
                    replay.travel(self.offset(target), MoveMode::Travel)?;
                }
                Command::Draw(target) => {
                    replay.lower();
                    replay.travel(self.offset(target), MoveMode::Draw)?;
                }
                Command::End => break,
                Command::Millimetres | Command::Absolute | Command::Unknown(_) => {}
            }
        }

        replay.raise();
        replay.travel(Position::ORIGIN, MoveMode::Travel)?;

        let estimate = replay.estimate;
        tracing::debug!(
            minutes = estimate.minutes(),
            segments = estimate.segments,
            pen_transitions = estimate.pen_transitions,
            "Estimated plot time"
        );
        Ok(estimate)
    }

    fn offset(&self, target: Position) -> Position {
        target.offset(self.offset_x, self.offset_y)
    }

    fn half_period(&self, mode: MoveMode) -> Duration {
        match mode {
            MoveMode::Draw => self.draw_half_period,
            MoveMode::Travel => self.travel_half_period,
        }
    }
}

impl Replay<'_> {
    fn raise(&mut self) {
        if self.pen == PenState::Down {
            self.pen = PenState::Up;
            let ramp = self.estimator.pen.raise_duration();
            self.estimate.total = self.estimate.total.saturating_add(ramp);
            self.estimate.pen_transitions += 1;
        }
    }

    fn lower(&mut self) {
        if self.pen == PenState::Up {
            self.pen = PenState::Down;
            let ramp = self.estimator.pen.lower_duration();
            self.estimate.total = self.estimate.total.saturating_add(ramp);
            self.estimate.pen_transitions += 1;
        }
    }

    fn travel(&mut self, target: Position, mode: MoveMode) -> Result<()> {
        let geometry = &self.estimator.geometry;
        geometry.reachable_cable_lengths(target)?;
        let half_period = self.estimator.half_period(mode);

        for waypoint in segmenter::plan(
            self.position,
            target,
            self.estimator.max_segment_length,
            mode,
        ) {
            let (d_left, d_right) = geometry.cable_delta(self.position, waypoint);
            let (s_left, s_right) = geometry.steps_from_delta(d_left, d_right);
            let steps = self.carry.resolve(s_left, s_right);

            let pulses = timing::pulse_train_duration(steps.max_magnitude(), half_period);
            self.estimate.total = self.estimate.total.saturating_add(pulses);
            self.estimate.segments += 1;
            self.position = waypoint;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> TimeEstimator {
        TimeEstimator::new(&Config::default()).unwrap()
    }

    #[test]
    fn test_empty_program_costs_nothing() {
        let estimate = estimator().estimate("".as_bytes()).unwrap();
        assert_eq!(estimate.total, Duration::ZERO);
        // The park travel from home to home is one empty segment.
        assert_eq!(estimate.segments, 1);
        assert_eq!(estimate.pen_transitions, 0);
    }

    #[test]
    fn test_ramp_only_program() {
        let config = Config::default();
        let estimate = estimator().estimate("G1 X0 Y0\n".as_bytes()).unwrap();

        let expected = Duration::from_micros(
            config.pen.down_ramp_delay_us * u64::from(config.pen.down_ramp_steps)
                + config.pen.up_ramp_delay_us * u64::from(config.pen.up_ramp_steps),
        );
        assert_eq!(estimate.total, expected);
        assert_eq!(estimate.pen_transitions, 2);
    }

    #[test]
    fn test_lines_after_end_are_ignored() {
        let with_tail = estimator()
            .estimate("G1 X10 Y0\nM2\nG1 X500 Y0\n".as_bytes())
            .unwrap();
        let without = estimator().estimate("G1 X10 Y0\n".as_bytes()).unwrap();
        assert_eq!(with_tail, without);
    }

    #[test]
    fn test_estimates_are_deterministic() {
        let program = "G21\nG90\nG0 X10 Y0\nG1 X10 Y10\nG1 X-20 Y15.5\nM2\n";
        let first = estimator().estimate(program.as_bytes()).unwrap();
        let second = estimator().estimate(program.as_bytes()).unwrap();
        assert_eq!(first, second);
        assert!(first.minutes() > 0.0);
    }

    #[test]
    fn test_malformed_program_is_an_error() {
        let err = estimator().estimate("G0 X1\n".as_bytes()).unwrap_err();
        assert!(err.is_gcode_error());
    }

    #[test]
    fn test_target_out_of_step_range_is_an_error() {
        let err = estimator()
            .estimate("G0 X0 Y-1e300\n".as_bytes())
            .unwrap_err();
        assert!(err.is_geometry_error());
    }

    #[test]
    fn test_long_ramps_saturate() {
        let mut config = Config::default();
        config.pen.down_ramp_steps = u32::MAX;
        config.pen.down_ramp_delay_us = u64::MAX;
        let estimate = TimeEstimator::new(&config)
            .unwrap()
            .estimate("G1 X0 Y0\n".as_bytes())
            .unwrap();
        assert_eq!(estimate.total, Duration::MAX);
    }
}
