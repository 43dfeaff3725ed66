//! Software-timed pulse generation

use super::{acquire_pins, direction_pin, release_pins, step_pins, Actuator, DigitalOutput};
use crate::pacer::Pacer;
use std::time::Duration;
use vplotter_core::{ActuatorError, Axis, AxisSet};
use vplotter_settings::PinSettings;

/// Toggles step pins directly, sleeping one half-period between edges
///
/// Outputs are acquired on construction and released when dropped.
pub struct ToggleActuator<O: DigitalOutput, P: Pacer> {
    output: O,
    pacer: P,
    pins: PinSettings,
}

impl<O: DigitalOutput, P: Pacer> ToggleActuator<O, P> {
    pub fn acquire(mut output: O, pins: PinSettings, pacer: P) -> Result<Self, ActuatorError> {
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
}

impl<O: DigitalOutput, P: Pacer> Actuator for ToggleActuator<O, P> {
    fn set_direction(&mut self, axis: Axis, level: bool) -> Result<(), ActuatorError> {
        self.output.write(direction_pin(&self.pins, axis), level)
    }

    fn pulse(
        &mut self,
        axes: AxisSet,
        count: u64,
        half_period: Duration,
    ) -> Result<(), ActuatorError> {
        for _ in 0..count {
            for pin in step_pins(&self.pins, axes) {
                self.output.write(pin, true)?;
            }
            self.pacer.wait(half_period);
            for pin in step_pins(&self.pins, axes) {
                self.output.write(pin, false)?;
            }
            self.pacer.wait(half_period);
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
        Ok(())
    }
}

impl<O: DigitalOutput, P: Pacer> Drop for ToggleActuator<O, P> {
    fn drop(&mut self) {
        release_pins(&mut self.output, &self.pins);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacer::NoopPacer;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Mode(u8),
        Write(u8, bool),
        Servo(u8, u32),
    }

    #[derive(Clone, Default)]
    struct RecordingOutput {
        events: Arc<Mutex<Vec<Event>>>,
    }

    impl DigitalOutput for RecordingOutput {
        fn set_output_mode(&mut self, pin: u8) -> Result<(), ActuatorError> {
            self.events.lock().unwrap().push(Event::Mode(pin));
            Ok(())
        }

        fn write(&mut self, pin: u8, high: bool) -> Result<(), ActuatorError> {
            self.events.lock().unwrap().push(Event::Write(pin, high));
            Ok(())
        }

        fn set_servo_pulse_width(&mut self, pin: u8, width_us: u32) -> Result<(), ActuatorError> {
            self.events.lock().unwrap().push(Event::Servo(pin, width_us));
            Ok(())
        }
    }

    #[test]
    fn test_acquire_configures_and_enables() {
        let output = RecordingOutput::default();
        let events = output.events.clone();
        let pins = PinSettings::default();
        let _actuator = ToggleActuator::acquire(output, pins.clone(), NoopPacer).unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.iter().filter(|e| matches!(e, Event::Mode(_))).count(), 7);
        assert!(events.contains(&Event::Write(pins.left_enable, false)));
        assert!(events.contains(&Event::Write(pins.right_enable, false)));
    }

    #[test]
    fn test_pulse_toggles_both_pins() {
        let output = RecordingOutput::default();
        let events = output.events.clone();
        let pins = PinSettings::default();
        let mut actuator = ToggleActuator::acquire(output, pins.clone(), NoopPacer).unwrap();
        events.lock().unwrap().clear();

        actuator
            .pulse(AxisSet::Both, 2, Duration::from_micros(100))
            .unwrap();

        let expected = vec![
            Event::Write(pins.left_step, true),
            Event::Write(pins.right_step, true),
            Event::Write(pins.left_step, false),
            Event::Write(pins.right_step, false),
            Event::Write(pins.left_step, true),
            Event::Write(pins.right_step, true),
            Event::Write(pins.left_step, false),
            Event::Write(pins.right_step, false),
        ];
        assert_eq!(*events.lock().unwrap(), expected);
    }

    #[test]
    fn test_direction_and_pen_commands() {
        let output = RecordingOutput::default();
        let events = output.events.clone();
        let pins = PinSettings::default();
        let mut actuator = ToggleActuator::acquire(output, pins.clone(), NoopPacer).unwrap();
        events.lock().unwrap().clear();

        actuator.set_direction(Axis::Right, true).unwrap();
        actuator.set_pen_command(1400).unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                Event::Write(pins.right_direction, true),
                Event::Servo(pins.servo, 1400),
            ]
        );
    }

    #[test]
    fn test_drop_stops_servo() {
        let output = RecordingOutput::default();
        let events = output.events.clone();
        let pins = PinSettings::default();
        drop(ToggleActuator::acquire(output, pins.clone(), NoopPacer).unwrap());

        assert_eq!(
            events.lock().unwrap().last(),
            Some(&Event::Servo(pins.servo, 0))
        );
    }
}
