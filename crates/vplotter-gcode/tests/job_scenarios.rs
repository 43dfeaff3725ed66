use std::fs::File;
use std::io::{BufReader, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use vplotter_core::{ActuatorError, Axis, AxisSet, CancellationToken, PenState, Position, RunState};
use vplotter_gcode::{JobRunner, TimeEstimator};
use vplotter_motion::{Actuator, Plotter};
use vplotter_settings::Config;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Pulse(AxisSet, u64, Duration),
    Pen(u32),
    Await,
}

/// Records every call and the time a real machine would have spent
#[derive(Clone, Default)]
struct SimulatedActuator {
    calls: Arc<Mutex<Vec<Call>>>,
    elapsed: Arc<Mutex<Duration>>,
}

impl SimulatedActuator {
    fn awaits(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == Call::Await)
            .count()
    }

    fn pulses_at(&self, half_period: Duration) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, Call::Pulse(_, _, hp) if *hp == half_period))
            .count()
    }
}

impl Actuator for SimulatedActuator {
    fn set_direction(&mut self, _axis: Axis, _level: bool) -> Result<(), ActuatorError> {
        Ok(())
    }

    fn pulse(
        &mut self,
        axes: AxisSet,
        count: u64,
        half_period: Duration,
    ) -> Result<(), ActuatorError> {
        *self.elapsed.lock().unwrap() += half_period * 2 * count as u32;
        self.calls
            .lock()
            .unwrap()
            .push(Call::Pulse(axes, count, half_period));
        Ok(())
    }

    fn set_pen_command(&mut self, value: u32) -> Result<(), ActuatorError> {
        self.calls.lock().unwrap().push(Call::Pen(value));
        Ok(())
    }

    fn dwell(&mut self, duration: Duration) {
        *self.elapsed.lock().unwrap() += duration;
    }

    fn await_completion(&mut self) -> Result<(), ActuatorError> {
        self.calls.lock().unwrap().push(Call::Await);
        Ok(())
    }
}

const SCENARIO: &str = "G21\nG90\nG0 X10 Y0\nG1 X10 Y10\nM2\n";

#[test]
fn scenario_travel_draw_and_park() {
    let config = Config::default();
    let actuator = SimulatedActuator::default();
    let mut plotter = Plotter::new(&config, actuator.clone()).unwrap();

    let report = JobRunner::new(&mut plotter, &config.drawing)
        .run(SCENARIO.as_bytes(), &CancellationToken::new())
        .unwrap();

    assert_eq!(report.outcome, RunState::Completed);
    assert_eq!(report.lines_read, 5);
    assert_eq!(report.commands_executed, 5);
    assert_eq!(report.unknown_commands, 0);
    assert_eq!(report.final_position, Position::ORIGIN);
    assert_eq!(plotter.pen_state(), PenState::Up);

    // Travel (1 segment), 10 mm draw at 1 mm per segment, park travel (1).
    assert_eq!(actuator.awaits(), 12);
    assert!(actuator.pulses_at(config.pen_down_half_period()) > 0);
    assert!(actuator.pulses_at(config.pen_up_half_period()) > 0);
}

#[test]
fn cancel_is_seen_at_the_next_line() {
    let config = Config::default();
    let actuator = SimulatedActuator::default();
    let mut plotter = Plotter::new(&config, actuator.clone()).unwrap();
    let cancel = CancellationToken::new();

    let lines = SCENARIO.lines().enumerate().map(|(index, line)| {
        if index == 2 {
            cancel.cancel();
        }
        Ok::<_, std::io::Error>(line.to_string())
    });
    let report = JobRunner::new(&mut plotter, &config.drawing)
        .run_lines(lines, &cancel)
        .unwrap();

    assert_eq!(report.outcome, RunState::Cancelled);
    assert_eq!(report.lines_read, 3);
    assert_eq!(report.commands_executed, 2);
    assert_eq!(report.final_position, Position::ORIGIN);

    // Only the park ran: a single segment with nothing to step.
    assert_eq!(actuator.awaits(), 1);
    assert_eq!(actuator.pulses_at(config.pen_up_half_period()), 0);
}

#[test]
fn cancel_before_start_only_parks() {
    let config = Config::default();
    let mut plotter = Plotter::new(&config, SimulatedActuator::default()).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = JobRunner::new(&mut plotter, &config.drawing)
        .run(SCENARIO.as_bytes(), &cancel)
        .unwrap();
    assert_eq!(report.outcome, RunState::Cancelled);
    assert_eq!(report.commands_executed, 0);
}

#[test]
fn estimate_matches_simulated_run_time() {
    let mut config = Config::default();
    config.drawing.offset_x = -30.0;
    config.drawing.offset_y = 12.5;
    let program = "G21\nG90\n; outline\nG0 X10 Y0\nG1 X10 Y10\nG1 X43.7 Y-12.2\nM5\nG0 X0 Y40\nG1 X-25 Y40\nM2\n";

    let estimate = TimeEstimator::new(&config)
        .unwrap()
        .estimate(program.as_bytes())
        .unwrap();

    let actuator = SimulatedActuator::default();
    let mut plotter = Plotter::new(&config, actuator.clone()).unwrap();
    let report = JobRunner::new(&mut plotter, &config.drawing)
        .run(program.as_bytes(), &CancellationToken::new())
        .unwrap();

    assert_eq!(report.unknown_commands, 1);
    assert_eq!(estimate.segments, actuator.awaits());
    assert_eq!(estimate.pen_transitions, 4);
    assert_eq!(estimate.total, *actuator.elapsed.lock().unwrap());
}

#[test]
fn runs_a_program_from_disk() {
    let mut file = tempfile::Builder::new().suffix(".gcode").tempfile().unwrap();
    file.write_all(SCENARIO.as_bytes()).unwrap();

    let config = Config::default();
    let mut plotter = Plotter::new(&config, SimulatedActuator::default()).unwrap();
    let reader = BufReader::new(File::open(file.path()).unwrap());

    let report = JobRunner::new(&mut plotter, &config.drawing)
        .run(reader, &CancellationToken::new())
        .unwrap();
    assert_eq!(report.outcome, RunState::Completed);
}
