//! Plotter facade
//!
//! Bundles the step driver, the pen controller and the actuator they
//! share, so callers deal with one object per machine.

use crate::actuator::Actuator;
use crate::driver::{MoveSummary, StepDriver};
use crate::kinematics::MachineGeometry;
use crate::pen::PenController;
use crate::segmenter::MoveMode;
use crate::steps::StepCounters;
use vplotter_core::{PenState, Position, Result};
use vplotter_settings::Config;

pub struct Plotter<A: Actuator> {
    driver: StepDriver,
    pen: PenController,
    actuator: A,
}

impl<A: Actuator> Plotter<A> {
    pub fn new(config: &Config, actuator: A) -> Result<Self> {
        let driver = StepDriver::from_config(config)?;
        tracing::info!(
            width = config.geometry.width,
            left0 = config.geometry.left0,
            right0 = config.geometry.right0,
            "Plotter ready"
        );
        Ok(Self {
            driver,
            pen: PenController::new(&config.pen),
            actuator,
        })
    }

    /// Prepare for a new job: clears the step carry and counters.
    pub fn begin_job(&mut self) {
        self.driver.reset();
    }

    pub fn move_to(&mut self, target: Position, mode: MoveMode) -> Result<MoveSummary> {
        self.driver.move_to(target, mode, &mut self.actuator)
    }

    /// Move by an offset from the current position.
    pub fn relative_move(&mut self, dx: f64, dy: f64, mode: MoveMode) -> Result<MoveSummary> {
        let target = self.driver.position().offset(dx, dy);
        self.move_to(target, mode)
    }

    /// Returns whether the pen actually moved.
    pub fn raise_pen(&mut self) -> Result<bool> {
        Ok(self.pen.raise(&mut self.actuator)?)
    }

    /// Returns whether the pen actually moved.
    pub fn lower_pen(&mut self) -> Result<bool> {
        Ok(self.pen.lower(&mut self.actuator)?)
    }

    /// Raise the pen and travel back to the origin.
    pub fn park(&mut self) -> Result<MoveSummary> {
        self.raise_pen()?;
        self.move_to(Position::ORIGIN, MoveMode::Travel)
    }

    pub fn pen_state(&self) -> PenState {
        self.pen.state()
    }

    pub fn position(&self) -> Position {
        self.driver.position()
    }

    pub fn step_counters(&self) -> StepCounters {
        *self.driver.counters()
    }

    /// Position reconstructed from the step counters
    ///
    /// Diagnostic only; differs from [`Plotter::position`] by the
    /// outstanding carry.
    pub fn position_from_counters(&self) -> Result<Position> {
        let counters = self.driver.counters();
        Ok(self
            .driver
            .geometry()
            .position_from_steps(counters.left, counters.right)?)
    }

    pub fn geometry(&self) -> &MachineGeometry {
        self.driver.geometry()
    }

    pub fn pen(&self) -> &PenController {
        &self.pen
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    pub fn into_actuator(self) -> A {
        self.actuator
    }
}
