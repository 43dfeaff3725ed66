//! Hardware-timed pulse generation
//!
//! Step trains are built as a list of [`WavePulse`] entries and handed to
//! the output, which plays them while the caller carries on. Long trains
//! are split into chunks so a single transmission stays bounded.

use super::{
    acquire_pins, direction_pin, release_pins, step_pins, Actuator, WaveformOutput, WavePulse,
};
use crate::pacer::Pacer;
use std::time::Duration;
use vplotter_core::{ActuatorError, Axis, AxisSet};
use vplotter_settings::PinSettings;

/// Maximum number of step pulses sent in one waveform
const MAX_PULSES_PER_WAVE: u64 = 2048;

const BUSY_POLL_INTERVAL: Duration = Duration::from_millis(1);

pub struct WaveformActuator<O: WaveformOutput, P: Pacer> {
    output: O,
    pacer: P,
    pins: PinSettings,
}

impl<O: WaveformOutput, P: Pacer> WaveformActuator<O, P> {
    pub fn acquire(mut output: O, pins: PinSettings, pacer: P) -> Result<Self, ActuatorError> {
        for pin in [pins.left_step, pins.right_step] {
            pin_mask(pin)?;
        }
        acquire_pins(&mut output, &pins)?;
        Ok(Self {
            output,
            pacer,
            pins,
        })
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    fn step_mask(&self, axes: AxisSet) -> Result<u64, ActuatorError> {
        step_pins(&self.pins, axes).try_fold(0u64, |mask, pin| Ok(mask | pin_mask(pin)?))
    }
}

fn pin_mask(pin: u8) -> Result<u64, ActuatorError> {
    if pin >= 64 {
        return Err(ActuatorError::InvalidPin { pin });
    }
    Ok(1u64 << pin)
}

/// Build the waveform for `count` pulses on the pins in `mask`.
fn build_wave(mask: u64, count: u64, half_period: Duration) -> Vec<WavePulse> {
    let mut wave = Vec::with_capacity(usize::try_from(count * 2).unwrap_or(0));
    for _ in 0..count {
        wave.push(WavePulse {
            on: mask,
            off: 0,
            delay: half_period,
        });
        wave.push(WavePulse {
            on: 0,
            off: mask,
            delay: half_period,
        });
    }
    wave
}

impl<O: WaveformOutput, P: Pacer> Actuator for WaveformActuator<O, P> {
    fn set_direction(&mut self, axis: Axis, level: bool) -> Result<(), ActuatorError> {
        // Direction must not change under a playing wave.
        self.await_completion()?;
        self.output.write(direction_pin(&self.pins, axis), level)
    }

    fn pulse(
        &mut self,
        axes: AxisSet,
        count: u64,
        half_period: Duration,
    ) -> Result<(), ActuatorError> {
        let mask = self.step_mask(axes)?;
        let mut remaining = count;
        while remaining > 0 {
            let chunk = remaining.min(MAX_PULSES_PER_WAVE);
            let wave = build_wave(mask, chunk, half_period);
            self.await_completion()?;
            self.output.transmit(&wave)?;
            tracing::trace!("Transmitted wave of {} pulses", chunk);
            remaining -= chunk;
        }
        Ok(())
    }

    fn set_pen_command(&mut self, value: u32) -> Result<(), ActuatorError> {
        self.output.set_servo_pulse_width(self.pins.servo, value)
    }

    fn dwell(&mut self, duration: Duration) {
        self.pacer.wait(duration);
    }

    fn await_completion(&mut self) -> Result<(), ActuatorError> {
        while self.output.is_busy()? {
            self.pacer.wait(BUSY_POLL_INTERVAL);
        }
        Ok(())
    }
}

impl<O: WaveformOutput, P: Pacer> Drop for WaveformActuator<O, P> {
    fn drop(&mut self) {
        if let Err(e) = self.await_completion() {
            tracing::warn!("Waveform still playing on release: {}", e);
        }
        release_pins(&mut self.output, &self.pins);
    }
}
