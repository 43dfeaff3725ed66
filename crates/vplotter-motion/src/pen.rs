//! Pen lift controller
//!
//! The pen servo is never jumped between extremes. Each transition walks
//! the command linearly from one extreme to the other with a dwell after
//! every increment. Transitions are idempotent: asking for the state the
//! pen is already in does nothing.

use crate::actuator::Actuator;
use crate::timing;
use std::time::Duration;
use vplotter_core::{ActuatorError, PenState};
use vplotter_settings::PenSettings;

/// Linear ramp of servo commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenRamp {
    pub from: u32,
    pub to: u32,
    pub steps: u32,
    pub delay: Duration,
}

impl PenRamp {
    /// Commands issued by the ramp, `steps + 1` values from `from` to `to` inclusive
    pub fn values(&self) -> impl Iterator<Item = u32> {
        let from = i64::from(self.from);
        let span = i64::from(self.to) - from;
        let steps = i64::from(self.steps.max(1));
        (0..=steps).map(move |i| (from + span * i / steps) as u32)
    }

    /// Time spent dwelling between commands
    pub fn duration(&self) -> Duration {
        timing::ramp_duration(self.steps, self.delay)
    }

    fn run<A: Actuator + ?Sized>(&self, actuator: &mut A) -> Result<(), ActuatorError> {
        let mut values = self.values();
        if let Some(first) = values.next() {
            actuator.set_pen_command(first)?;
        }
        for value in values {
            actuator.dwell(self.delay);
            actuator.set_pen_command(value)?;
        }
        Ok(())
    }
}

/// Tracks the pen state and ramps the servo on transitions
#[derive(Debug, Clone)]
pub struct PenController {
    state: PenState,
    lower_ramp: PenRamp,
    raise_ramp: PenRamp,
}

impl PenController {
    /// New controller; the pen is assumed up.
    pub fn new(settings: &PenSettings) -> Self {
        Self {
            state: PenState::Up,
            lower_ramp: PenRamp {
                from: settings.up_pulse_us,
                to: settings.down_pulse_us,
                steps: settings.down_ramp_steps,
                delay: Duration::from_micros(settings.down_ramp_delay_us),
            },
            raise_ramp: PenRamp {
                from: settings.down_pulse_us,
                to: settings.up_pulse_us,
                steps: settings.up_ramp_steps,
                delay: Duration::from_micros(settings.up_ramp_delay_us),
            },
        }
    }

    pub fn state(&self) -> PenState {
        self.state
    }

    pub fn lower_ramp(&self) -> &PenRamp {
        &self.lower_ramp
    }

    pub fn raise_ramp(&self) -> &PenRamp {
        &self.raise_ramp
    }

    /// Lower the pen. Returns whether a ramp was performed.
    pub fn lower<A: Actuator + ?Sized>(&mut self, actuator: &mut A) -> Result<bool, ActuatorError> {
        if self.state == PenState::Down {
            return Ok(false);
        }
        tracing::debug!("Lowering pen");
        self.lower_ramp.run(actuator)?;
        self.state = PenState::Down;
        Ok(true)
    }

    /// Raise the pen. Returns whether a ramp was performed.
    pub fn raise<A: Actuator + ?Sized>(&mut self, actuator: &mut A) -> Result<bool, ActuatorError> {
        if self.state == PenState::Up {
            return Ok(false);
        }
        tracing::debug!("Raising pen");
        self.raise_ramp.run(actuator)?;
        self.state = PenState::Up;
        Ok(true)
    }

    pub fn lower_duration(&self) -> Duration {
        self.lower_ramp.duration()
    }

    pub fn raise_duration(&self) -> Duration {
        self.raise_ramp.duration()
    }
}
