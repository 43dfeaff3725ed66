//! Output that only logs
//!
//! Stands in for the pin hardware on dry runs and on hosts without GPIO.

use super::{DigitalOutput, WaveformOutput, WavePulse};
use vplotter_core::ActuatorError;

/// Logs every output operation at trace level
#[derive(Debug, Clone, Default)]
pub struct TracingOutput {
    writes: u64,
    waves: u64,
}

impl TracingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pin writes seen so far
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Number of waveforms transmitted so far
    pub fn waves(&self) -> u64 {
        self.waves
    }
}

impl DigitalOutput for TracingOutput {
    fn set_output_mode(&mut self, pin: u8) -> Result<(), ActuatorError> {
        tracing::trace!(pin, "set output mode");
        Ok(())
    }

    fn write(&mut self, pin: u8, high: bool) -> Result<(), ActuatorError> {
        self.writes += 1;
        tracing::trace!(pin, high, "write");
        Ok(())
    }

    fn set_servo_pulse_width(&mut self, pin: u8, width_us: u32) -> Result<(), ActuatorError> {
        tracing::trace!(pin, width_us, "servo pulse width");
        Ok(())
    }
}

impl WaveformOutput for TracingOutput {
    fn transmit(&mut self, wave: &[WavePulse]) -> Result<(), ActuatorError> {
        self.waves += 1;
        tracing::trace!(entries = wave.len(), "transmit wave");
        Ok(())
    }

    fn is_busy(&mut self) -> Result<bool, ActuatorError> {
        Ok(false)
    }
}
