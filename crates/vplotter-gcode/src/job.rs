//! Job runner
//!
//! Streams a program through a [`Plotter`] one line at a time.
//!
//! ```text
//! Idle -> Running -> Completed   (end of input or M2)
//!                 -> Cancelled   (token set, seen at a line boundary)
//!                 -> Failed      (malformed line, geometry or actuator error)
//! ```
//!
//! Completed and cancelled jobs always finish with the pen raised and a
//! travel back to the origin. A failed job stops where it is.

use crate::parser::{Command, Program};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead};
use vplotter_core::{CancellationToken, Position, Result, RunState};
use vplotter_motion::{Actuator, MoveMode, Plotter};
use vplotter_settings::DrawingSettings;

/// Outcome of one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobReport {
    pub outcome: RunState,
    /// Lines consumed from the input, blank ones included
    pub lines_read: usize,
    /// Recognized commands carried out
    pub commands_executed: usize,
    /// Commands skipped as unknown
    pub unknown_commands: usize,
    pub final_position: Position,
}

pub struct JobRunner<'p, A: Actuator> {
    plotter: &'p mut Plotter<A>,
    offset_x: f64,
    offset_y: f64,
    state: RunState,
}

impl<'p, A: Actuator> JobRunner<'p, A> {
    pub fn new(plotter: &'p mut Plotter<A>, drawing: &DrawingSettings) -> Self {
        Self {
            plotter,
            offset_x: drawing.offset_x,
            offset_y: drawing.offset_y,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run a program read from `reader` until it ends, is cancelled or fails.
    pub fn run<R: BufRead>(
        &mut self,
        reader: R,
        cancel: &CancellationToken,
    ) -> Result<JobReport> {
        self.run_lines(reader.lines(), cancel)
    }

    /// Run a program from any line source.
    pub fn run_lines<I>(&mut self, lines: I, cancel: &CancellationToken) -> Result<JobReport>
    where
        I: IntoIterator<Item = io::Result<String>>,
    {
        self.state = RunState::Running;
        self.plotter.begin_job();
        tracing::info!("Job started");

        let mut program = Program::new(lines.into_iter());
        let mut report = JobReport {
            outcome: RunState::Running,
            lines_read: 0,
            commands_executed: 0,
            unknown_commands: 0,
            final_position: self.plotter.position(),
        };

        let result = self
            .execute(&mut program, cancel, &mut report)
            .and_then(|outcome| {
                self.plotter.park()?;
                Ok(outcome)
            });
        report.lines_read = program.lines_read();
        report.final_position = self.plotter.position();

        match result {
            Ok(outcome) => {
                self.state = outcome;
                report.outcome = outcome;
                tracing::info!(
                    outcome = %outcome,
                    lines = report.lines_read,
                    commands = report.commands_executed,
                    "Job finished"
                );
                Ok(report)
            }
            Err(e) => {
                self.state = RunState::Failed;
                tracing::error!(lines = report.lines_read, "Job failed: {}", e);
                Err(e)
            }
        }
    }

    fn execute<I>(
        &mut self,
        program: &mut Program<I>,
        cancel: &CancellationToken,
        report: &mut JobReport,
    ) -> Result<RunState>
    where
        I: Iterator<Item = io::Result<String>>,
    {
        while let Some(entry) = program.next() {
            if cancel.is_cancelled() {
                tracing::info!(line = program.lines_read(), "Job cancelled");
                return Ok(RunState::Cancelled);
            }

            let (line_number, command) = entry?;
            tracing::debug!(line = line_number, ?command, "Executing");

            match command {
                Command::Millimetres | Command::Absolute => {}
                Command::Travel(target) => {
                    let target = self.offset(target);
                    self.plotter.raise_pen()?;
                    self.plotter.move_to(target, MoveMode::Travel)?;
                }
                Command::Draw(target) => {
                    let target = self.offset(target);
                    self.plotter.lower_pen()?;
                    self.plotter.move_to(target, MoveMode::Draw)?;
                }
                Command::End => {
                    report.commands_executed += 1;
                    return Ok(RunState::Completed);
                }
                Command::Unknown(word) => {
                    tracing::warn!(line = line_number, "Skipping unknown command {}", word);
                    report.unknown_commands += 1;
                    continue;
                }
            }
            report.commands_executed += 1;
        }

        if cancel.is_cancelled() {
            return Ok(RunState::Cancelled);
        }
        Ok(RunState::Completed)
    }

    fn offset(&self, target: Position) -> Position {
        target.offset(self.offset_x, self.offset_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use vplotter_core::{ActuatorError, Axis, AxisSet, PenState};
    use vplotter_settings::Config;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Pen(u32),
        Steps(u64),
    }

    #[derive(Clone, Default)]
    struct MockActuator {
        events: Arc<Mutex<Vec<Event>>>,
    }

    impl Actuator for MockActuator {
        fn set_direction(&mut self, _: Axis, _: bool) -> std::result::Result<(), ActuatorError> {
            Ok(())
        }

        fn pulse(
            &mut self,
            _: AxisSet,
            count: u64,
            _: Duration,
        ) -> std::result::Result<(), ActuatorError> {
            self.events.lock().unwrap().push(Event::Steps(count));
            Ok(())
        }

        fn set_pen_command(&mut self, value: u32) -> std::result::Result<(), ActuatorError> {
            self.events.lock().unwrap().push(Event::Pen(value));
            Ok(())
        }

        fn dwell(&mut self, _: Duration) {}

        fn await_completion(&mut self) -> std::result::Result<(), ActuatorError> {
            Ok(())
        }
    }

    fn plotter() -> Plotter<MockActuator> {
        Plotter::new(&Config::default(), MockActuator::default()).unwrap()
    }

    #[test]
    fn test_state_transitions() {
        let mut plotter = plotter();
        let mut runner = JobRunner::new(&mut plotter, &DrawingSettings::default());
        assert_eq!(runner.state(), RunState::Idle);

        let report = runner
            .run("G1 X1 Y1\n".as_bytes(), &CancellationToken::new())
            .unwrap();
        assert_eq!(report.outcome, RunState::Completed);
        assert_eq!(runner.state(), RunState::Completed);
    }

    #[test]
    fn test_offsets_are_applied() {
        let mut plotter = plotter();
        let drawing = DrawingSettings {
            offset_x: 100.0,
            offset_y: -50.0,
            ..Default::default()
        };
        let mut runner = JobRunner::new(&mut plotter, &drawing);
        // The failing second line keeps the carriage where the first one left it.
        runner
            .run("G0 X1 Y2\nG0 X\n".as_bytes(), &CancellationToken::new())
            .unwrap_err();
        drop(runner);

        assert_eq!(plotter.position(), Position::new(101.0, -48.0));
    }

    #[test]
    fn test_unknown_commands_are_skipped() {
        let mut plotter = plotter();
        let mut runner = JobRunner::new(&mut plotter, &DrawingSettings::default());
        let report = runner
            .run(
                "M3 S100\nG0 X5 Y5\nT1\n".as_bytes(),
                &CancellationToken::new(),
            )
            .unwrap();

        assert_eq!(report.outcome, RunState::Completed);
        assert_eq!(report.unknown_commands, 2);
        assert_eq!(report.commands_executed, 1);
        assert_eq!(report.lines_read, 3);
    }

    #[test]
    fn test_malformed_line_fails_without_parking() {
        let mut plotter = plotter();
        let mut runner = JobRunner::new(&mut plotter, &DrawingSettings::default());
        let err = runner
            .run(
                "G1 X10 Y0\nG1 Xoops Y0\n".as_bytes(),
                &CancellationToken::new(),
            )
            .unwrap_err();

        assert!(err.is_gcode_error());
        assert_eq!(runner.state(), RunState::Failed);
        drop(runner);
        assert_eq!(plotter.position(), Position::new(10.0, 0.0));
        assert_eq!(plotter.pen_state(), PenState::Down);
    }

    #[test]
    fn test_unreachable_target_fails() {
        let mut plotter = plotter();
        let mut runner = JobRunner::new(&mut plotter, &DrawingSettings::default());
        let err = runner
            .run("G0 X0 Y5000\n".as_bytes(), &CancellationToken::new())
            .unwrap_err();
        assert!(err.is_geometry_error());
        assert_eq!(runner.state(), RunState::Failed);
    }

    #[test]
    fn test_target_out_of_step_range_fails_before_pulsing() {
        let mut plotter = plotter();
        let events = plotter.actuator().events.clone();
        let mut runner = JobRunner::new(&mut plotter, &DrawingSettings::default());
        let err = runner
            .run(
                "G0 X0 Y-1e300\nG0 X0 Y-1e301\n".as_bytes(),
                &CancellationToken::new(),
            )
            .unwrap_err();

        assert!(err.is_geometry_error());
        assert_eq!(runner.state(), RunState::Failed);
        drop(runner);
        assert!(!events
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, Event::Steps(_))));
        assert_eq!(plotter.step_counters().left, 0);
        assert_eq!(plotter.position(), Position::ORIGIN);
    }

    #[test]
    fn test_pen_is_raised_before_travel() {
        let mut plotter = plotter();
        let events = plotter.actuator().events.clone();
        let mut runner = JobRunner::new(&mut plotter, &DrawingSettings::default());
        runner
            .run(
                "G1 X0 Y3\nG0 X10 Y10\n".as_bytes(),
                &CancellationToken::new(),
            )
            .unwrap();

        let events = events.lock().unwrap();
        let pen = Config::default().pen;
        let pen_commands: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, Event::Pen(_)))
            .map(|(i, _)| i)
            .collect();
        // One lowering and one raising ramp; the park finds the pen already up.
        assert_eq!(pen_commands.len(), 2 * (pen.down_ramp_steps as usize + 1));

        let last_pen = *pen_commands.last().unwrap();
        assert_eq!(events[last_pen], Event::Pen(pen.up_pulse_us));
        assert!(events[last_pen..]
            .iter()
            .any(|e| matches!(e, Event::Steps(_))));
    }
}
