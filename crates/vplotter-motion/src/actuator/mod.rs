//! Actuator interface
//!
//! The step driver and pen controller only talk to an [`Actuator`]. How the
//! pulses reach the pins is up to the realization:
//! - [`ToggleActuator`]: software-timed toggle-and-sleep
//! - [`WaveformActuator`]: precomputed waveform played by the output
//!
//! Both sit on top of a raw [`DigitalOutput`], the hardware collaborator.

mod toggle;
mod tracing_output;
mod waveform;

pub use toggle::ToggleActuator;
pub use tracing_output::TracingOutput;
pub use waveform::WaveformActuator;

use std::time::Duration;
use vplotter_core::{ActuatorError, Axis, AxisSet};
use vplotter_settings::PinSettings;

/// Motion and pen commands issued by the driver
///
/// Calls block until the hardware has accepted them; `pulse` may return
/// before a waveform finishes playing, so callers finish every segment
/// with `await_completion`.
pub trait Actuator {
    /// Set the direction output of one axis
    fn set_direction(&mut self, axis: Axis, level: bool) -> Result<(), ActuatorError>;

    /// Emit `count` step pulses on every axis in `axes`
    fn pulse(
        &mut self,
        axes: AxisSet,
        count: u64,
        half_period: Duration,
    ) -> Result<(), ActuatorError>;

    /// Drive the pen lift servo to a ramp value
    fn set_pen_command(&mut self, value: u32) -> Result<(), ActuatorError>;

    /// Hold the current outputs for `duration`
    fn dwell(&mut self, duration: Duration);

    /// Block until all emitted pulses have been played
    fn await_completion(&mut self) -> Result<(), ActuatorError>;
}

impl<A: Actuator + ?Sized> Actuator for Box<A> {
    fn set_direction(&mut self, axis: Axis, level: bool) -> Result<(), ActuatorError> {
        (**self).set_direction(axis, level)
    }

    fn pulse(
        &mut self,
        axes: AxisSet,
        count: u64,
        half_period: Duration,
    ) -> Result<(), ActuatorError> {
        (**self).pulse(axes, count, half_period)
    }

    fn set_pen_command(&mut self, value: u32) -> Result<(), ActuatorError> {
        (**self).set_pen_command(value)
    }

    fn dwell(&mut self, duration: Duration) {
        (**self).dwell(duration)
    }

    fn await_completion(&mut self) -> Result<(), ActuatorError> {
        (**self).await_completion()
    }
}

/// Raw digital output access
pub trait DigitalOutput {
    /// Configure a pin as an output
    fn set_output_mode(&mut self, pin: u8) -> Result<(), ActuatorError>;

    /// Drive a pin high or low
    fn write(&mut self, pin: u8, high: bool) -> Result<(), ActuatorError>;

    /// Set the servo pulse width on a pin; 0 stops the servo signal
    fn set_servo_pulse_width(&mut self, pin: u8, width_us: u32) -> Result<(), ActuatorError>;
}

/// One entry of a precomputed waveform
///
/// Pins in `on` go high and pins in `off` go low, then the output holds
/// for `delay` before the next entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavePulse {
    pub on: u64,
    pub off: u64,
    pub delay: Duration,
}

/// Digital output that can play a precomputed waveform
pub trait WaveformOutput: DigitalOutput {
    /// Start playing a waveform. Returns once playback has started.
    fn transmit(&mut self, wave: &[WavePulse]) -> Result<(), ActuatorError>;

    /// Whether a waveform is still playing
    fn is_busy(&mut self) -> Result<bool, ActuatorError>;
}

pub(crate) fn direction_pin(pins: &PinSettings, axis: Axis) -> u8 {
    match axis {
        Axis::Left => pins.left_direction,
        Axis::Right => pins.right_direction,
    }
}

pub(crate) fn step_pins(pins: &PinSettings, axes: AxisSet) -> impl Iterator<Item = u8> {
    let left = axes.contains(Axis::Left).then_some(pins.left_step);
    let right = axes.contains(Axis::Right).then_some(pins.right_step);
    left.into_iter().chain(right)
}

/// Configure every pin as an output and enable both stepper drivers.
pub(crate) fn acquire_pins<O: DigitalOutput>(
    output: &mut O,
    pins: &PinSettings,
) -> Result<(), ActuatorError> {
    for pin in [
        pins.left_direction,
        pins.left_step,
        pins.left_enable,
        pins.right_direction,
        pins.right_step,
        pins.right_enable,
        pins.servo,
    ] {
        output.set_output_mode(pin)?;
    }
    // Driver enables are active low.
    output.write(pins.left_enable, false)?;
    output.write(pins.right_enable, false)?;
    tracing::debug!("Acquired plotter outputs");
    Ok(())
}

/// Stop the servo signal. The stepper drivers stay enabled so the
/// carriage keeps its holding torque.
pub(crate) fn release_pins<O: DigitalOutput>(output: &mut O, pins: &PinSettings) {
    if let Err(e) = output.set_servo_pulse_width(pins.servo, 0) {
        tracing::warn!("Failed to stop servo signal on release: {}", e);
    }
    tracing::debug!("Released plotter outputs");
}
